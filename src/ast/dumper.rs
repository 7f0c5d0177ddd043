//! AST Dumper module
//!
//! Renders the tree depth-first, one node per line, with `|  ` per nesting
//! level. After analysis each line also carries the node's block and
//! attributes, and identifiers show where their declaration lives.

use std::fmt::Write;

use crate::ast::{Ast, NodeRef, NodeSymbol};
use crate::semantic::symbol_table::SymbolTable;

/// Dumper for AST
pub struct AstDumper<'a> {
    ast: &'a Ast,
    symbols: Option<&'a SymbolTable>,
}

impl<'a> AstDumper<'a> {
    /// Without a symbol table the dump shows the raw parser tree.
    pub fn new(ast: &'a Ast, symbols: Option<&'a SymbolTable>) -> Self {
        Self { ast, symbols }
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(&mut out, self.ast.root(), 0);
        out
    }

    fn dump_node(&self, out: &mut String, node: NodeRef, depth: usize) {
        if self.ast.symbol(node) == NodeSymbol::Released {
            return;
        }
        out.push_str(&"|  ".repeat(depth));
        self.write_line(out, node);
        out.push('\n');
        for child in self.ast.children(node) {
            self.dump_node(out, *child, depth + 1);
        }
    }

    fn write_line(&self, out: &mut String, node: NodeRef) {
        let n = self.ast.node(node);
        let _ = write!(out, "{} \"{}\" ({})", n.symbol, n.lexeme, n.loc);
        let Some(symbols) = self.symbols else {
            return;
        };
        let _ = write!(out, " {{{}}}", n.decoration.block);
        if !n.decoration.attrs.is_empty() {
            let _ = write!(out, " {}", n.decoration.attrs);
        }
        if n.symbol == NodeSymbol::Ident {
            match n.decoration.symbol {
                Some(id) => {
                    let _ = write!(out, " ({})", symbols.get(id).loc);
                }
                None => out.push_str(" (not declared)"),
            }
        }
    }
}
