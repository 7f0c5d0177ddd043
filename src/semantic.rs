//! Semantic analysis module.
//!
//! One recursive traversal drives two cooperating passes over the tree:
//! - the scope resolver, which defines and resolves names and decorates nodes
//!   with their declaring block and attributes;
//! - the type checker, which validates each construct once its children are
//!   fully decorated.
//!
//! The traversal also fills the declaration queues the emitter replays.

pub mod output;
pub mod resolver;
pub mod symbol_table;
pub mod type_checker;
pub mod types;

use log::debug;

use crate::ast::{Ast, NodeRef};
use crate::diagnostic::{DiagnosticEngine, SemanticError};

pub use output::{DeclQueues, SemaOutput};
pub use symbol_table::{BlockId, ScopeTable, Symbol, SymbolId, SymbolTable};
pub use types::{Attributes, BaseType, Roles, Type};

/// State threaded through the resolve and check passes of one compilation.
pub struct SemaCtx<'a> {
    pub ast: &'a mut Ast,
    pub diag: &'a mut DiagnosticEngine,
    pub symbols: &'a mut SymbolTable,
    pub queues: &'a mut DeclQueues,
}

impl<'a> SemaCtx<'a> {
    pub fn new(
        ast: &'a mut Ast,
        diag: &'a mut DiagnosticEngine,
        symbols: &'a mut SymbolTable,
        queues: &'a mut DeclQueues,
    ) -> Self {
        Self {
            ast,
            diag,
            symbols,
            queues,
        }
    }

    pub fn report_error(&mut self, error: SemanticError) {
        self.diag.report_error(error);
    }

    /// Resolve the subtree rooted at `node`, then check it, children first.
    pub fn visit(&mut self, node: NodeRef) {
        let opened = resolver::enter(self, node);
        let children = self.ast.children(node).to_vec();
        for child in children {
            self.visit(child);
        }
        resolver::leave(self, node, opened);
        type_checker::check(self, node);
    }
}

/// Run scope resolution and type checking over the whole tree.
///
/// Errors are reported to `diag`; analysis always runs to completion.
pub fn analyze(ast: &mut Ast, diag: &mut DiagnosticEngine) -> SemaOutput {
    let mut symbols = SymbolTable::new();
    let mut queues = DeclQueues::default();
    let root = ast.root();
    {
        let mut ctx = SemaCtx::new(ast, diag, &mut symbols, &mut queues);
        ctx.visit(root);
    }
    debug!(
        "analysis done: {} symbols, {} structs, {} strings, {} globals, {} functions, {} errors",
        symbols.len(),
        queues.structs.len(),
        queues.strings.len(),
        queues.globals.len(),
        queues.functions.len(),
        diag.error_count()
    );
    SemaOutput { symbols, queues }
}
