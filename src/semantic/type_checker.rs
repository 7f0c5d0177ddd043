//! Type checking rules, one per construct.
//!
//! [`check`] runs on a node after its children have been resolved and
//! checked. It reads child decorations, reports violations and refines the
//! node's own decoration. An operand with no type has already been diagnosed
//! and is skipped, so a single mistake does not cascade.

use crate::ast::{NameId, NodeRef, NodeSymbol};
use crate::diagnostic::SemanticError;
use crate::semantic::SemaCtx;
use crate::semantic::types::{BaseType, Roles, Type, compatible, describe};

/// Apply the rule for `node`'s construct, if it has one.
pub fn check(ctx: &mut SemaCtx, node: NodeRef) {
    match ctx.ast.symbol(node) {
        NodeSymbol::VarDecl => check_vardecl(ctx, node),
        NodeSymbol::While | NodeSymbol::If | NodeSymbol::IfElse | NodeSymbol::Not => check_condition(ctx, node),
        NodeSymbol::Function => check_returns(ctx, node),
        NodeSymbol::Assign => check_assign(ctx, node),
        NodeSymbol::Eq | NodeSymbol::Ne => check_equality(ctx, node),
        NodeSymbol::Lt | NodeSymbol::Le | NodeSymbol::Gt | NodeSymbol::Ge => check_relational(ctx, node),
        NodeSymbol::Add | NodeSymbol::Sub | NodeSymbol::Mul | NodeSymbol::Div | NodeSymbol::Rem => {
            check_arithmetic(ctx, node)
        }
        NodeSymbol::Pos | NodeSymbol::Neg | NodeSymbol::Chr | NodeSymbol::NewString => {
            check_operand(ctx, node, Type::INT)
        }
        NodeSymbol::Ord => check_operand(ctx, node, Type::CHAR),
        NodeSymbol::NewArray => check_newarray(ctx, node),
        NodeSymbol::Call => check_call(ctx, node),
        NodeSymbol::Index => check_index(ctx, node),
        NodeSymbol::Select => check_select(ctx, node),
        _ => {}
    }
}

fn value_type(ctx: &SemaCtx, node: NodeRef) -> Option<Type> {
    ctx.ast.decoration(node).attrs.value_type()
}

fn set_type(ctx: &mut SemaCtx, node: NodeRef, ty: Type) {
    ctx.ast.decoration_mut(node).attrs.ty = Some(ty);
}

fn mismatch(ctx: &mut SemaCtx, node: NodeRef, expected: impl ToString, found: Option<Type>) {
    let error = SemanticError::TypeMismatch {
        name: ctx.ast.lexeme(node),
        expected: expected.to_string(),
        found: describe(found),
        location: ctx.ast.loc(node),
    };
    ctx.report_error(error);
}

fn check_vardecl(ctx: &mut SemaCtx, node: NodeRef) {
    let decl = ctx.ast.child(node, 0);
    let init = ctx.ast.child(node, 1);
    let (_, ident, _) = ctx.ast.declaration_parts(decl);
    let Some(declared) = value_type(ctx, ident) else {
        return;
    };
    if declared.is_void() {
        let error = SemanticError::VoidDeclaration {
            name: ctx.ast.lexeme(ident),
            found: declared.to_string(),
            location: ctx.ast.loc(ident),
        };
        ctx.report_error(error);
    } else if let Some(found) = value_type(ctx, init)
        && !compatible(declared, found)
    {
        mismatch(ctx, node, declared, Some(found));
    }
}

fn check_condition(ctx: &mut SemaCtx, node: NodeRef) {
    let cond = ctx.ast.child(node, 0);
    if let Some(found) = value_type(ctx, cond)
        && found != Type::BOOL
    {
        mismatch(ctx, node, Type::BOOL, Some(found));
    }
}

/// Collect every return statement of a function body.
fn collect_returns(ctx: &SemaCtx, body: NodeRef) -> Vec<NodeRef> {
    ctx.ast
        .walk(body)
        .into_iter()
        .filter(|node| matches!(ctx.ast.symbol(*node), NodeSymbol::Return | NodeSymbol::ReturnVoid))
        .collect()
}

fn check_returns(ctx: &mut SemaCtx, node: NodeRef) {
    let decl = ctx.ast.child(node, 0);
    let body = ctx.ast.child(node, 2);
    let (_, ident, _) = ctx.ast.declaration_parts(decl);
    let Some(declared) = value_type(ctx, ident) else {
        return;
    };
    let returns = collect_returns(ctx, body);

    if !declared.is_void() && returns.is_empty() {
        let error = SemanticError::MissingReturn {
            name: ctx.ast.lexeme(ident),
            expected: declared.to_string(),
            location: ctx.ast.loc(ident),
        };
        ctx.report_error(error);
    }

    for ret in returns {
        if ctx.ast.symbol(ret) == NodeSymbol::ReturnVoid {
            if !declared.is_void() {
                mismatch(ctx, ret, declared, Some(Type::VOID));
            }
            continue;
        }
        let value = ctx.ast.child(ret, 0);
        let found = value_type(ctx, value);
        if declared.is_void() {
            let error = SemanticError::ValueReturnFromVoid {
                name: ctx.ast.lexeme(ret),
                location: ctx.ast.loc(ret),
            };
            ctx.report_error(error);
        } else if let Some(found) = found
            && !compatible(declared, found)
        {
            mismatch(ctx, ret, declared, Some(found));
        }
    }
}

fn check_assign(ctx: &mut SemaCtx, node: NodeRef) {
    let lhs = ctx.ast.child(node, 0);
    let rhs = ctx.ast.child(node, 1);
    let Some(target) = value_type(ctx, lhs) else {
        return;
    };
    if !ctx.ast.decoration(lhs).attrs.has(Roles::LVALUE) {
        let error = SemanticError::NotLvalue {
            name: ctx.ast.lexeme(node),
            found: target.to_string(),
            location: ctx.ast.loc(node),
        };
        ctx.report_error(error);
    } else if let Some(source) = value_type(ctx, rhs)
        && !compatible(target, source)
    {
        mismatch(ctx, node, target, Some(source));
    }
    set_type(ctx, node, target);
}

fn check_equality(ctx: &mut SemaCtx, node: NodeRef) {
    let lhs = ctx.ast.child(node, 0);
    let rhs = ctx.ast.child(node, 1);
    let (Some(left), Some(right)) = (value_type(ctx, lhs), value_type(ctx, rhs)) else {
        return;
    };
    // a void call yields no value to compare
    if left.is_void() || right.is_void() {
        mismatch(ctx, node, "non-void", Some(Type::VOID));
    } else if !compatible(left, right) {
        mismatch(ctx, node, left, Some(right));
    }
}

fn check_relational(ctx: &mut SemaCtx, node: NodeRef) {
    let lhs = ctx.ast.child(node, 0);
    let rhs = ctx.ast.child(node, 1);
    let Some(left) = value_type(ctx, lhs) else {
        return;
    };
    if !left.is_ordered() {
        mismatch(ctx, node, "bool char int", Some(left));
    } else if let Some(right) = value_type(ctx, rhs)
        && right != left
    {
        mismatch(ctx, node, left, Some(right));
    }
}

fn check_arithmetic(ctx: &mut SemaCtx, node: NodeRef) {
    let lhs = ctx.ast.child(node, 0);
    let rhs = ctx.ast.child(node, 1);
    let Some(left) = value_type(ctx, lhs) else {
        return;
    };
    if left != Type::INT {
        mismatch(ctx, node, Type::INT, Some(left));
    } else if let Some(right) = value_type(ctx, rhs)
        && right != left
    {
        mismatch(ctx, node, left, Some(right));
    }
}

/// Unary operators and `new string` take one operand of a fixed type.
fn check_operand(ctx: &mut SemaCtx, node: NodeRef, expected: Type) {
    let operand = ctx.ast.child(node, 0);
    if let Some(found) = value_type(ctx, operand)
        && found != expected
    {
        mismatch(ctx, node, expected, Some(found));
    }
}

fn check_newarray(ctx: &mut SemaCtx, node: NodeRef) {
    let base = ctx.ast.child(node, 0);
    let size = ctx.ast.child(node, 1);
    let element = match ctx.ast.symbol(base).base_type(ctx.ast.lexeme(base)) {
        Some(element) => element,
        None => panic!("ICE: array allocation at {} has no element type", ctx.ast.loc(node)),
    };
    if element == BaseType::Void {
        let error = SemanticError::VoidDeclaration {
            name: ctx.ast.lexeme(node),
            found: element.to_string(),
            location: ctx.ast.loc(node),
        };
        ctx.report_error(error);
    } else if let Some(found) = value_type(ctx, size)
        && found != Type::INT
    {
        mismatch(ctx, node, Type::INT, Some(found));
    }
    set_type(ctx, node, Type::Array(element));
}

/// Arguments are compared positionally against the callee's parameter chain.
/// Only the first incompatible argument is reported.
fn check_call(ctx: &mut SemaCtx, node: NodeRef) {
    let callee = ctx.ast.child(node, 0);
    let name: NameId = ctx.ast.lexeme(callee);
    let decoration = *ctx.ast.decoration(callee);
    let Some(function) = decoration.symbol else {
        return;
    };
    if !decoration.attrs.has(Roles::FUNCTION) {
        let location = ctx.ast.loc(callee);
        ctx.report_error(SemanticError::NotCallable { name, location });
        return;
    }

    let params = ctx.symbols.get(function).params.clone().unwrap_or_default();
    let args = ctx.ast.children(node)[1..].to_vec();
    let mut reported_mismatch = false;
    for (index, arg) in args.iter().enumerate() {
        let found = value_type(ctx, *arg);
        let Some(param) = params.get(index) else {
            let error = SemanticError::ExtraArgument {
                name,
                found: describe(found),
                location: ctx.ast.loc(callee),
            };
            ctx.report_error(error);
            break;
        };
        let expected = ctx.symbols.get(*param).attrs.value_type();
        if reported_mismatch {
            continue;
        }
        if let (Some(expected), Some(found)) = (expected, found)
            && !compatible(expected, found)
        {
            mismatch(ctx, callee, expected, Some(found));
            reported_mismatch = true;
        }
    }
    if let Some(missing) = params.get(args.len()) {
        let error = SemanticError::MissingArgument {
            name,
            expected: describe(ctx.symbols.get(*missing).attrs.value_type()),
            location: ctx.ast.loc(callee),
        };
        ctx.report_error(error);
    }

    if let Some(ret) = decoration.attrs.value_type() {
        set_type(ctx, node, ret);
    }
}

fn check_index(ctx: &mut SemaCtx, node: NodeRef) {
    let base = ctx.ast.child(node, 0);
    let subscript = ctx.ast.child(node, 1);
    match value_type(ctx, base) {
        Some(Type::Array(element)) => set_type(ctx, node, Type::Base(element)),
        Some(Type::Base(BaseType::String)) => set_type(ctx, node, Type::CHAR),
        Some(other) => {
            let error = SemanticError::NonIndexable {
                name: ctx.ast.lexeme(node),
                found: other.to_string(),
                location: ctx.ast.loc(node),
            };
            ctx.report_error(error);
        }
        None => {}
    }
    if let Some(found) = value_type(ctx, subscript)
        && found != Type::INT
    {
        mismatch(ctx, node, Type::INT, Some(found));
    }
}

/// Field selection. On error the node keeps its default decoration.
fn check_select(ctx: &mut SemaCtx, node: NodeRef) {
    let operand = ctx.ast.child(node, 0);
    let field = ctx.ast.child(node, 1);
    ctx.ast.decoration_mut(field).attrs.roles.insert(Roles::FIELD);

    let Some(ty) = value_type(ctx, operand) else {
        return;
    };
    let Type::Base(BaseType::Struct(tag)) = ty else {
        let error = SemanticError::NonSelectable {
            name: ctx.ast.lexeme(node),
            found: ty.to_string(),
            location: ctx.ast.loc(node),
        };
        ctx.report_error(error);
        return;
    };
    let structure = ctx.symbols.struct_symbol(tag).map(|id| ctx.symbols.get(id));
    let Some(structure) = structure.filter(|structure| structure.is_complete()) else {
        let error = SemanticError::IncompleteType {
            name: tag,
            location: ctx.ast.loc(field),
        };
        ctx.report_error(error);
        return;
    };
    let field_name = ctx.ast.lexeme(field);
    match structure.field(field_name) {
        Some(id) => {
            if let Some(field_type) = ctx.symbols.get(id).attrs.value_type() {
                set_type(ctx, node, field_type);
            }
        }
        None => {
            let error = SemanticError::UnknownField {
                name: field_name,
                found: ty.to_string(),
                location: ctx.ast.loc(field),
            };
            ctx.report_error(error);
        }
    }
}
