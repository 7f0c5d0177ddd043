//! Expression lowering.
//!
//! Each `emit_*` returns the operand text standing for the computed value:
//! a register, a literal, a variable name or a dereferenced address.

use itertools::Itertools;

use crate::ast::{NodeRef, NodeSymbol};
use crate::codegen::oil_gen::{OilGen, ctype, field_name, register_kind, variable_name};
use crate::semantic::types::Type;

impl<'a> OilGen<'a> {
    pub(crate) fn emit_expression(&mut self, node: NodeRef) -> String {
        match self.ast.symbol(node) {
            NodeSymbol::IntCon => {
                let digits = self.ast.lexeme(node).as_str().trim_start_matches('0');
                if digits.is_empty() { "0".to_string() } else { digits.to_string() }
            }
            NodeSymbol::CharCon => self.ast.lexeme(node).to_string(),
            NodeSymbol::True => "1".to_string(),
            NodeSymbol::False | NodeSymbol::Null => "0".to_string(),
            NodeSymbol::StringCon => {
                let lexeme = self.ast.lexeme(node);
                match self.strings.get(&lexeme) {
                    Some(slot) => slot.clone(),
                    None => lexeme.to_string(),
                }
            }
            NodeSymbol::Ident => variable_name(self.ast.lexeme(node), self.ast.decoration(node).block),
            NodeSymbol::Assign => self.emit_assign(node),
            NodeSymbol::Eq
            | NodeSymbol::Ne
            | NodeSymbol::Lt
            | NodeSymbol::Le
            | NodeSymbol::Gt
            | NodeSymbol::Ge
            | NodeSymbol::Add
            | NodeSymbol::Sub
            | NodeSymbol::Mul
            | NodeSymbol::Div
            | NodeSymbol::Rem => self.emit_binary(node),
            NodeSymbol::Pos | NodeSymbol::Neg | NodeSymbol::Not => {
                let operator = self.ast.lexeme(node);
                self.emit_unary(node, operator.as_str())
            }
            NodeSymbol::Ord => self.emit_unary(node, "(int) "),
            NodeSymbol::Chr => self.emit_unary(node, "(char) "),
            NodeSymbol::New => self.emit_new(node),
            NodeSymbol::NewString => self.emit_new_string(node),
            NodeSymbol::NewArray => self.emit_new_array(node),
            NodeSymbol::Call => self.emit_call(node),
            NodeSymbol::Index => self.emit_index(node),
            NodeSymbol::Select => self.emit_select(node),
            other => panic!("ICE: {} at {} is not an expression", other, self.ast.loc(node)),
        }
    }

    /// Store into the target and yield the target, so assignments chain.
    fn emit_assign(&mut self, node: NodeRef) -> String {
        let target = self.emit_expression(self.ast.child(node, 0));
        let value = self.emit_expression(self.ast.child(node, 1));
        self.line(&format!("{} = {};", target, value));
        target
    }

    /// Fresh register of the node's type holding `text`.
    fn emit_into_register(&mut self, node: NodeRef, text: &str) -> String {
        let ty = self.value_type(node);
        let register = self.new_register(register_kind(ty));
        self.line(&format!("{} {} = {};", ctype(ty), register, text));
        register
    }

    fn emit_binary(&mut self, node: NodeRef) -> String {
        let left = self.emit_expression(self.ast.child(node, 0));
        let right = self.emit_expression(self.ast.child(node, 1));
        let operator = self.ast.lexeme(node);
        self.emit_into_register(node, &format!("{} {} {}", left, operator, right))
    }

    fn emit_unary(&mut self, node: NodeRef, operator: &str) -> String {
        let operand = self.emit_expression(self.ast.child(node, 0));
        self.emit_into_register(node, &format!("{}{}", operator, operand))
    }

    fn emit_new(&mut self, node: NodeRef) -> String {
        let name = self.ast.lexeme(self.ast.child(node, 0));
        self.emit_into_register(node, &format!("xcalloc (1, sizeof (struct s_{}))", name))
    }

    fn emit_new_string(&mut self, node: NodeRef) -> String {
        let size = self.emit_expression(self.ast.child(node, 0));
        self.emit_into_register(node, &format!("xcalloc ({}, sizeof (char))", size))
    }

    fn emit_new_array(&mut self, node: NodeRef) -> String {
        let size = self.emit_expression(self.ast.child(node, 1));
        let element = match self.value_type(node) {
            Type::Array(base) => ctype(Type::Base(base)),
            other => panic!("ICE: array allocation typed {}", other),
        };
        self.emit_into_register(node, &format!("xcalloc ({}, sizeof ({}))", size, element))
    }

    fn emit_call(&mut self, node: NodeRef) -> String {
        let children = self.ast.children(node).to_vec();
        let callee = self.emit_expression(children[0]);
        let args = children[1..].iter().map(|arg| self.emit_expression(*arg)).collect_vec();
        let call = format!("{} ({})", callee, args.join(", "));
        if self.value_type(node).is_void() {
            self.line(&format!("{};", call));
            String::new()
        } else {
            self.emit_into_register(node, &call)
        }
    }

    /// Address of the selected slot in an `a` register, yielded dereferenced.
    fn emit_address(&mut self, node: NodeRef, place: &str) -> String {
        let ty = self.value_type(node);
        let register = self.new_register('a');
        self.line(&format!("{}* {} = &{};", ctype(ty), register, place));
        format!("(*{})", register)
    }

    fn emit_index(&mut self, node: NodeRef) -> String {
        let base = self.emit_expression(self.ast.child(node, 0));
        let index = self.emit_expression(self.ast.child(node, 1));
        self.emit_address(node, &format!("{}[{}]", base, index))
    }

    fn emit_select(&mut self, node: NodeRef) -> String {
        let object = self.ast.child(node, 0);
        let field = self.ast.child(node, 1);
        let structure = match self.value_type(object).struct_name() {
            Some(name) => name,
            None => panic!("ICE: field selection at {} on a non-struct", self.ast.loc(node)),
        };
        let base = self.emit_expression(object);
        let place = format!("{}->{}", base, field_name(structure, self.ast.lexeme(field)));
        self.emit_address(node, &place)
    }
}
