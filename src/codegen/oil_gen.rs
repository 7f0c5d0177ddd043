use std::fmt::Write;

use hashbrown::HashMap;
use itertools::Itertools;
use log::{debug, trace};

use crate::ast::{Ast, NameId, NodeRef, NodeSymbol};
use crate::semantic::output::{DeclQueues, SemaOutput};
use crate::semantic::symbol_table::BlockId;
use crate::semantic::types::{BaseType, Type};

/// Name of the synthetic function holding top-level statements.
pub const ENTRY_FUNCTION: &str = "__ocmain";

const INDENT: &str = "        ";

/// Emits oil for one analyzed program.
///
/// Registers and labels share one counter that is never reset, so emitting
/// the same tree twice from the same start value yields identical text.
pub struct OilGen<'a> {
    pub(crate) ast: &'a Ast,
    queues: &'a DeclQueues,
    counter: u32,
    /// String constant lexeme to its global slot.
    pub(crate) strings: HashMap<NameId, String>,
    out: String,
}

impl<'a> OilGen<'a> {
    pub fn new(ast: &'a Ast, sema: &'a SemaOutput) -> Self {
        Self {
            ast,
            queues: &sema.queues,
            counter: 1,
            strings: HashMap::new(),
            out: String::new(),
        }
    }

    /// Start numbering registers at `start` instead of 1.
    pub fn with_counter(mut self, start: u32) -> Self {
        self.counter = start;
        self
    }

    /// Next value the register counter will hand out.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Emit the whole module: structs, string constants, globals, functions
    /// and finally the entry function.
    pub fn emit_module(&mut self) -> String {
        self.out.clear();
        self.strings.clear();
        let queues = self.queues;
        debug!(
            "oil: {} structs, {} strings, {} globals, {} functions",
            queues.structs.len(),
            queues.strings.len(),
            queues.globals.len(),
            queues.functions.len()
        );

        for node in &queues.structs {
            self.emit_struct(*node);
        }
        for node in &queues.strings {
            self.emit_string_constant(*node);
        }
        for node in &queues.globals {
            self.emit_global(*node);
        }
        for node in &queues.functions {
            self.emit_function(*node);
        }
        self.emit_entry();
        std::mem::take(&mut self.out)
    }

    fn emit_struct(&mut self, node: NodeRef) {
        let ast = self.ast;
        let name = ast.lexeme(ast.child(node, 0));
        let _ = writeln!(self.out, "struct s_{} {{", name);
        for decl in &ast.children(node)[1..] {
            let (_, field, _) = ast.declaration_parts(*decl);
            let ty = self.value_type(field);
            let _ = writeln!(self.out, "{}{} {};", INDENT, ctype(ty), field_name(name, ast.lexeme(field)));
        }
        self.out.push_str("};\n");
    }

    fn emit_string_constant(&mut self, node: NodeRef) {
        let lexeme = self.ast.lexeme(node);
        if self.strings.contains_key(&lexeme) {
            return;
        }
        let slot = self.new_register('s');
        let _ = writeln!(self.out, "char* {} = {};", slot, lexeme);
        self.strings.insert(lexeme, slot);
    }

    fn emit_global(&mut self, node: NodeRef) {
        let (_, ident, _) = self.ast.declaration_parts(self.ast.child(node, 0));
        let ty = self.value_type(ident);
        let _ = writeln!(self.out, "{} __{};", ctype(ty), self.ast.lexeme(ident));
    }

    fn emit_function(&mut self, node: NodeRef) {
        let (_, ident, _) = self.ast.declaration_parts(self.ast.child(node, 0));
        let params = self.ast.child(node, 1);
        let body = self.ast.child(node, 2);
        let return_type = self.value_type(ident);

        let param_list = self
            .ast
            .children(params)
            .iter()
            .map(|decl| {
                let (_, param, _) = self.ast.declaration_parts(*decl);
                let block = self.ast.decoration(param).block;
                format!(
                    "{}{} {}",
                    INDENT,
                    ctype(self.value_type(param)),
                    variable_name(self.ast.lexeme(param), block)
                )
            })
            .join(",\n");

        let name = self.ast.lexeme(ident);
        if param_list.is_empty() {
            let _ = writeln!(self.out, "{} __{} (void)", ctype(return_type), name);
        } else {
            let _ = writeln!(self.out, "{} __{} (\n{})", ctype(return_type), name, param_list);
        }
        self.out.push_str("{\n");
        for statement in self.ast.children(body).to_vec() {
            self.emit_statement(statement);
        }
        self.out.push_str("}\n");
        debug!("oil: emitted function '{}'", name);
    }

    fn emit_entry(&mut self) {
        let _ = writeln!(self.out, "void {} (void)", ENTRY_FUNCTION);
        self.out.push_str("{\n");
        let root = self.ast.root();
        for item in self.ast.children(root).to_vec() {
            if !matches!(
                self.ast.symbol(item),
                NodeSymbol::Struct | NodeSymbol::Function | NodeSymbol::Prototype
            ) {
                self.emit_statement(item);
            }
        }
        self.out.push_str("}\n");
    }

    /// Hand out the next register of the given kind: `i` int, `c` char or
    /// bool, `p` pointer, `a` address, `s` string constant.
    pub(crate) fn new_register(&mut self, kind: char) -> String {
        let register = format!("{}{}", kind, self.counter);
        self.counter += 1;
        trace!("oil: register {}", register);
        register
    }

    /// Suffix shared by the labels of one construct, taken from its location.
    pub(crate) fn label_suffix(&self, node: NodeRef) -> String {
        self.ast.loc(node).label_suffix()
    }

    /// One indented instruction.
    pub(crate) fn line(&mut self, text: &str) {
        self.out.push_str(INDENT);
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub(crate) fn label(&mut self, label: &str) {
        let _ = writeln!(self.out, "{}:;", label);
    }

    /// Type the checker settled on for `node`.
    pub(crate) fn value_type(&self, node: NodeRef) -> Type {
        match self.ast.decoration(node).attrs.value_type() {
            Some(ty) => ty,
            None => panic!(
                "ICE: {} \"{}\" ({}) reached emission without a type",
                self.ast.symbol(node),
                self.ast.lexeme(node),
                self.ast.loc(node)
            ),
        }
    }
}

/// Emit oil for an analyzed program with a fresh register counter.
pub fn emit_program(ast: &Ast, sema: &SemaOutput) -> String {
    OilGen::new(ast, sema).emit_module()
}

/// C rendering of an oc type. Strings, structs and arrays are pointers.
pub fn ctype(ty: Type) -> String {
    match ty {
        Type::Base(base) => base_ctype(base),
        Type::Array(base) => format!("{}*", base_ctype(base)),
        Type::Null => "void*".to_string(),
    }
}

fn base_ctype(base: BaseType) -> String {
    match base {
        BaseType::Void => "void".to_string(),
        BaseType::Bool | BaseType::Char => "char".to_string(),
        BaseType::Int => "int".to_string(),
        BaseType::String => "char*".to_string(),
        BaseType::Struct(name) => format!("struct s_{}*", name),
    }
}

/// Register kind holding a value of `ty`.
pub fn register_kind(ty: Type) -> char {
    match ty {
        Type::Base(BaseType::Int) => 'i',
        Type::Base(BaseType::Bool | BaseType::Char) => 'c',
        _ => 'p',
    }
}

/// `__name` for globals, `_<block>_name` for everything block scoped.
pub fn variable_name(name: NameId, block: BlockId) -> String {
    if block.is_global() {
        format!("__{}", name)
    } else {
        format!("_{}_{}", block, name)
    }
}

pub fn field_name(structure: NameId, field: NameId) -> String {
    format!("f_{}_{}", structure, field)
}
