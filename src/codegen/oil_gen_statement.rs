use log::trace;

use crate::ast::{NodeRef, NodeSymbol};
use crate::codegen::oil_gen::{OilGen, ctype, variable_name};

impl<'a> OilGen<'a> {
    pub(crate) fn emit_statement(&mut self, node: NodeRef) {
        trace!("oil: statement {} at {}", self.ast.symbol(node), self.ast.loc(node));
        match self.ast.symbol(node) {
            NodeSymbol::Block => {
                for statement in self.ast.children(node).to_vec() {
                    self.emit_statement(statement);
                }
            }
            NodeSymbol::VarDecl => self.emit_vardecl(node),
            NodeSymbol::While => self.emit_while(node),
            NodeSymbol::If => self.emit_if(node),
            NodeSymbol::IfElse => self.emit_if_else(node),
            NodeSymbol::Return => {
                let value = self.emit_expression(self.ast.child(node, 0));
                self.line(&format!("return {};", value));
            }
            NodeSymbol::ReturnVoid => self.line("return;"),
            NodeSymbol::Semicolon | NodeSymbol::Struct | NodeSymbol::Function | NodeSymbol::Prototype => {}
            _ => {
                self.emit_expression(node);
            }
        }
    }

    /// Locals are declared where they are initialized. Globals already have
    /// their slot and are only assigned.
    fn emit_vardecl(&mut self, node: NodeRef) {
        let (_, ident, _) = self.ast.declaration_parts(self.ast.child(node, 0));
        let value = self.emit_expression(self.ast.child(node, 1));
        let block = self.ast.decoration(ident).block;
        let name = variable_name(self.ast.lexeme(ident), block);
        if block.is_global() {
            self.line(&format!("{} = {};", name, value));
        } else {
            let ty = self.value_type(ident);
            self.line(&format!("{} {} = {};", ctype(ty), name, value));
        }
    }

    /// Evaluate a condition and jump to `target` when it is false.
    fn emit_branch_unless(&mut self, condition: NodeRef, target: &str) {
        let value = self.emit_expression(condition);
        self.line(&format!("if (!{}) goto {};", value, target));
    }

    fn emit_while(&mut self, node: NodeRef) {
        let suffix = self.label_suffix(node);
        let top = format!("while_{}", suffix);
        let exit = format!("break_{}", suffix);
        self.label(&top);
        self.emit_branch_unless(self.ast.child(node, 0), &exit);
        self.emit_statement(self.ast.child(node, 1));
        self.line(&format!("goto {};", top));
        self.label(&exit);
    }

    fn emit_if(&mut self, node: NodeRef) {
        let fi = format!("fi_{}", self.label_suffix(node));
        self.emit_branch_unless(self.ast.child(node, 0), &fi);
        self.emit_statement(self.ast.child(node, 1));
        self.label(&fi);
    }

    fn emit_if_else(&mut self, node: NodeRef) {
        let suffix = self.label_suffix(node);
        let otherwise = format!("else_{}", suffix);
        let fi = format!("fi_{}", suffix);
        self.emit_branch_unless(self.ast.child(node, 0), &otherwise);
        self.emit_statement(self.ast.child(node, 1));
        self.line(&format!("goto {};", fi));
        self.label(&otherwise);
        self.emit_statement(self.ast.child(node, 2));
        self.label(&fi);
    }
}
