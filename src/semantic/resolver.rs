//! Scope resolution.
//!
//! [`enter`] runs when the traversal first reaches a node and handles
//! everything that must be in scope before the children are visited: struct
//! bodies, function signatures and their parameter block, nested blocks and
//! the default decoration of expression nodes. [`leave`] runs after the
//! children and handles identifier references, allocations, string constants
//! and variable declarations, then closes any block [`enter`] opened.

use indexmap::IndexMap;
use log::debug;

use crate::ast::{Decoration, NodeRef, NodeSymbol};
use crate::diagnostic::SemanticError;
use crate::semantic::SemaCtx;
use crate::semantic::symbol_table::{Symbol, SymbolId};
use crate::semantic::types::{Attributes, BaseType, Roles, Type};

/// Outcome of defining one declared name.
#[derive(Debug, Clone, Copy)]
struct Definition {
    id: SymbolId,
    /// Prototype entry a function definition landed on.
    prototype: Option<SymbolId>,
}

/// Pre-order rule. Returns true if a block was opened for this node.
pub fn enter(ctx: &mut SemaCtx, node: NodeRef) -> bool {
    match ctx.ast.symbol(node) {
        NodeSymbol::Struct => {
            set_default(ctx, node);
            if define_struct(ctx, node) {
                ctx.queues.structs.push(node);
            }
            false
        }
        NodeSymbol::Function => {
            set_default(ctx, node);
            define_function(ctx, node, Roles::FUNCTION);
            ctx.queues.functions.push(node);
            true
        }
        NodeSymbol::Prototype => {
            set_default(ctx, node);
            define_function(ctx, node, Roles::FUNCTION | Roles::PROTOTYPE);
            true
        }
        NodeSymbol::Block => {
            let in_function = ctx
                .ast
                .parent(node)
                .is_some_and(|parent| ctx.ast.symbol(parent) == NodeSymbol::Function);
            if in_function {
                ctx.ast.decoration_mut(node).block = ctx.symbols.current_block();
                false
            } else {
                let block = ctx.symbols.enter_block();
                ctx.ast.decoration_mut(node).block = block;
                true
            }
        }
        _ => {
            set_default(ctx, node);
            false
        }
    }
}

/// Post-order rule, run once every child has been resolved and checked.
pub fn leave(ctx: &mut SemaCtx, node: NodeRef, opened: bool) {
    match ctx.ast.symbol(node) {
        NodeSymbol::Ident => reference(ctx, node),
        NodeSymbol::New => {
            let type_id = ctx.ast.child(node, 0);
            let name = ctx.ast.lexeme(type_id);
            resolve_struct(ctx, type_id, false);
            ctx.ast.decoration_mut(node).attrs = Attributes::typed(Type::structure(name), Roles::VREG);
        }
        NodeSymbol::NewArray => {
            let base = ctx.ast.child(node, 0);
            if ctx.ast.symbol(base) == NodeSymbol::TypeId {
                resolve_struct(ctx, base, false);
            }
        }
        NodeSymbol::StringCon => ctx.queues.strings.push(node),
        NodeSymbol::VarDecl => {
            let decl = ctx.ast.child(node, 0);
            define_ident(ctx, decl, Roles::VARIABLE | Roles::LVALUE);
            if ctx.symbols.current_block().is_global() {
                ctx.queues.globals.push(node);
            }
        }
        _ => {}
    }
    if opened {
        ctx.symbols.exit_block();
    }
}

/// Attributes an expression node carries before type checking refines them.
pub fn default_attributes(symbol: NodeSymbol) -> Attributes {
    match symbol {
        NodeSymbol::Assign | NodeSymbol::New | NodeSymbol::NewArray | NodeSymbol::Call => {
            Attributes::new(None, Roles::VREG)
        }
        NodeSymbol::Eq
        | NodeSymbol::Ne
        | NodeSymbol::Lt
        | NodeSymbol::Le
        | NodeSymbol::Gt
        | NodeSymbol::Ge
        | NodeSymbol::Not => Attributes::typed(Type::BOOL, Roles::VREG),
        NodeSymbol::Add
        | NodeSymbol::Sub
        | NodeSymbol::Mul
        | NodeSymbol::Div
        | NodeSymbol::Rem
        | NodeSymbol::Pos
        | NodeSymbol::Neg
        | NodeSymbol::Ord => Attributes::typed(Type::INT, Roles::VREG),
        NodeSymbol::Chr => Attributes::typed(Type::CHAR, Roles::VREG),
        NodeSymbol::NewString => Attributes::typed(Type::STRING, Roles::VREG),
        NodeSymbol::Index | NodeSymbol::Select => Attributes::new(None, Roles::VADDR | Roles::LVALUE),
        NodeSymbol::IntCon => Attributes::typed(Type::INT, Roles::CONST),
        NodeSymbol::CharCon => Attributes::typed(Type::CHAR, Roles::CONST),
        NodeSymbol::StringCon => Attributes::typed(Type::STRING, Roles::CONST),
        NodeSymbol::False | NodeSymbol::True => Attributes::typed(Type::BOOL, Roles::CONST),
        NodeSymbol::Null => Attributes::typed(Type::Null, Roles::CONST),
        _ => Attributes::default(),
    }
}

/// Give an undecorated node its block and default attributes. Nodes already
/// decorated by a definition keep what they have.
fn set_default(ctx: &mut SemaCtx, node: NodeRef) {
    let block = ctx.symbols.current_block();
    let symbol = ctx.ast.symbol(node);
    let decoration = ctx.ast.decoration_mut(node);
    if decoration.symbol.is_some() || !decoration.attrs.is_empty() {
        return;
    }
    decoration.block = block;
    decoration.attrs = default_attributes(symbol);
}

/// Resolve an identifier against the open scopes, innermost first.
pub fn reference(ctx: &mut SemaCtx, node: NodeRef) {
    let name = ctx.ast.lexeme(node);
    match ctx.symbols.lookup(name) {
        Some(id) => {
            let symbol = ctx.symbols.get(id);
            *ctx.ast.decoration_mut(node) = Decoration {
                attrs: symbol.attrs,
                block: symbol.block,
                symbol: Some(id),
            };
        }
        None => {
            let block = ctx.symbols.current_block();
            *ctx.ast.decoration_mut(node) = Decoration {
                block,
                ..Decoration::default()
            };
            let location = ctx.ast.loc(node);
            ctx.report_error(SemanticError::UndeclaredIdentifier { name, location });
        }
    }
}

/// Look up (or create) the struct type named by `type_node` and decorate the
/// node with it. Outside a field list the struct must already be complete.
fn resolve_struct(ctx: &mut SemaCtx, type_node: NodeRef, allow_incomplete: bool) -> SymbolId {
    let name = ctx.ast.lexeme(type_node);
    let location = ctx.ast.loc(type_node);
    let id = ctx.symbols.struct_or_placeholder(name, location);
    if !allow_incomplete && !ctx.symbols.get(id).is_complete() {
        ctx.report_error(SemanticError::IncompleteType { name, location });
    }
    let block = ctx.symbols.current_block();
    *ctx.ast.decoration_mut(type_node) = Decoration {
        attrs: Attributes::typed(Type::structure(name), Roles::empty()),
        block,
        symbol: Some(id),
    };
    id
}

/// Define the name declared by `decl` with the given roles.
///
/// Fields are only created here; the caller inserts them into the struct's
/// field table. Everything else is inserted into the innermost scope.
fn define_ident(ctx: &mut SemaCtx, decl: NodeRef, roles: Roles) -> Definition {
    let (base, ident, is_array) = ctx.ast.declaration_parts(decl);
    let base_type = match ctx.ast.symbol(base).base_type(ctx.ast.lexeme(base)) {
        Some(base_type) => base_type,
        None => panic!(
            "ICE: declaration at {} has no base type ({})",
            ctx.ast.loc(decl),
            ctx.ast.symbol(base)
        ),
    };
    if let BaseType::Struct(_) = base_type {
        resolve_struct(ctx, base, roles.contains(Roles::FIELD));
    }
    let ty = if is_array {
        Type::Array(base_type)
    } else {
        Type::Base(base_type)
    };
    let name = ctx.ast.lexeme(ident);
    let location = ctx.ast.loc(ident);
    let block = ctx.symbols.current_block();
    let attrs = Attributes::typed(ty, roles);
    let id = ctx.symbols.push_symbol(Symbol::new(name, location, block, attrs));
    *ctx.ast.decoration_mut(ident) = Decoration {
        attrs,
        block,
        symbol: Some(id),
    };

    if ty.is_void() && roles.intersects(Roles::PARAM | Roles::FIELD) {
        ctx.report_error(SemanticError::VoidDeclaration {
            name,
            found: ty.to_string(),
            location,
        });
    }

    let mut definition = Definition { id, prototype: None };
    if roles.contains(Roles::FIELD) {
        return definition;
    }
    match ctx.symbols.insert(name, id) {
        Ok(()) => {
            let depth = ctx.symbols.depth();
            ctx.symbols.record(depth, id);
        }
        Err(existing) => {
            let is_definition = roles.contains(Roles::FUNCTION) && !roles.contains(Roles::PROTOTYPE);
            if is_definition && ctx.symbols.get(existing).attrs.has(Roles::PROTOTYPE) {
                debug!("'{}' defines prototype {:?}", name, existing);
                let depth = ctx.symbols.depth();
                ctx.symbols.record(depth, id);
                definition.prototype = Some(existing);
            } else {
                ctx.report_error(SemanticError::Redeclaration { name, location });
            }
        }
    }
    definition
}

/// Define a struct tag and its fields. Returns false for a redefinition.
fn define_struct(ctx: &mut SemaCtx, node: NodeRef) -> bool {
    let type_id = ctx.ast.child(node, 0);
    let name = ctx.ast.lexeme(type_id);
    let location = ctx.ast.loc(type_id);
    let block = ctx.symbols.current_block();
    let id = ctx.symbols.struct_or_placeholder(name, location);
    if ctx.symbols.get(id).is_complete() {
        ctx.report_error(SemanticError::Redeclaration { name, location });
        return false;
    }

    let symbol = ctx.symbols.get_mut(id);
    symbol.loc = location;
    symbol.block = block;
    symbol.fields = Some(IndexMap::new());
    let attrs = symbol.attrs;
    *ctx.ast.decoration_mut(type_id) = Decoration {
        attrs,
        block,
        symbol: Some(id),
    };
    let depth = ctx.symbols.depth();
    ctx.symbols.record(depth, id);

    let field_decls = ctx.ast.children(node)[1..].to_vec();
    for decl in field_decls {
        let field = define_ident(ctx, decl, Roles::FIELD);
        let field_symbol = ctx.symbols.get(field.id);
        let (field_name, field_loc) = (field_symbol.name, field_symbol.loc);
        let fields = match ctx.symbols.get_mut(id).fields.as_mut() {
            Some(fields) => fields,
            None => panic!("ICE: struct '{}' lost its field table", name),
        };
        if fields.contains_key(&field_name) {
            ctx.report_error(SemanticError::Redeclaration {
                name: field_name,
                location: field_loc,
            });
        } else {
            fields.insert(field_name, field.id);
            ctx.symbols.record(depth + 1, field.id);
        }
    }
    debug!("struct '{}' defined", name);
    true
}

/// Define a function or prototype, open its parameter block and define the
/// parameters. A definition landing on a prototype is matched against it.
fn define_function(ctx: &mut SemaCtx, node: NodeRef, roles: Roles) {
    let decl = ctx.ast.child(node, 0);
    let params = ctx.ast.child(node, 1);
    let function = define_ident(ctx, decl, roles);

    let block = ctx.symbols.enter_block();
    ctx.ast.decoration_mut(params).block = block;
    let param_decls = ctx.ast.children(params).to_vec();
    let mut param_ids = Vec::with_capacity(param_decls.len());
    for param in param_decls {
        let definition = define_ident(ctx, param, Roles::VARIABLE | Roles::PARAM | Roles::LVALUE);
        param_ids.push(definition.id);
    }
    ctx.symbols.get_mut(function.id).params = Some(param_ids.clone());

    if let Some(prototype) = function.prototype {
        match_prototype(ctx, function.id, prototype, &param_ids);
    }

    if !roles.contains(Roles::PROTOTYPE) {
        let body = ctx.ast.child(node, 2);
        let declares_locals = ctx
            .ast
            .children(body)
            .iter()
            .any(|stmt| ctx.ast.symbol(*stmt) == NodeSymbol::VarDecl);
        if declares_locals {
            ctx.symbols.record_blank();
        }
    }
}

/// Walk a definition's parameters in lockstep with its prototype's. The first
/// divergence is reported once and stops the walk. The prototype counts as
/// defined afterwards either way, so a later body is a redeclaration.
fn match_prototype(ctx: &mut SemaCtx, definition: SymbolId, prototype: SymbolId, params: &[SymbolId]) {
    let def = ctx.symbols.get(definition);
    let (name, def_loc, def_type) = (def.name, def.loc, def.attrs.ty);
    ctx.symbols.get_mut(prototype).attrs.roles.remove(Roles::PROTOTYPE);
    let proto = ctx.symbols.get(prototype);
    let proto_params = proto.params.clone().unwrap_or_default();

    if proto.attrs.ty != def_type {
        debug!("'{}' return type differs from prototype", name);
        ctx.report_error(SemanticError::PrototypeMismatch { name, location: def_loc });
        return;
    }

    let proto_block = proto_params.first().map(|first| ctx.symbols.get(*first).block);
    for (index, param) in params.iter().enumerate() {
        let param = ctx.symbols.get(*param);
        let matches = match proto_params.get(index) {
            Some(expected) => {
                let bound = proto_block.and_then(|block| ctx.symbols.lookup_in_block(block, param.name));
                bound == Some(*expected) && ctx.symbols.get(*expected).attrs == param.attrs
            }
            None => false,
        };
        if !matches {
            let location = param.loc;
            ctx.report_error(SemanticError::PrototypeMismatch { name, location });
            return;
        }
    }
    if proto_params.len() > params.len() {
        let location = params.last().map(|last| ctx.symbols.get(*last).loc).unwrap_or(def_loc);
        ctx.report_error(SemanticError::PrototypeMismatch { name, location });
        return;
    }

    debug!("'{}' matches its prototype", name);
}
