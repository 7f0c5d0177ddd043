//! Type kinds, role flags and the attribute set carried by symbols and nodes.
//!
//! A value's *type* (what it is) and its *roles* (how it was declared or where
//! it lives) are kept apart: [`Type`] is a closed tagged variant, [`Roles`] a
//! small flag set. [`Attributes`] pairs the two and renders them in the
//! canonical order used by every dump and diagnostic.

use std::fmt::{self, Display};

use bitflags::bitflags;

use crate::ast::NameId;

/// Element or scalar type of the oc language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Void,
    Bool,
    Char,
    Int,
    String,
    Struct(NameId),
}

/// Resolved type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Base(BaseType),
    /// `base[]`; oc has no arrays of arrays.
    Array(BaseType),
    /// Type of the `null` constant, assignable to any reference type.
    Null,
}

impl Type {
    pub const VOID: Type = Type::Base(BaseType::Void);
    pub const BOOL: Type = Type::Base(BaseType::Bool);
    pub const CHAR: Type = Type::Base(BaseType::Char);
    pub const INT: Type = Type::Base(BaseType::Int);
    pub const STRING: Type = Type::Base(BaseType::String);

    pub fn structure(name: NameId) -> Type {
        Type::Base(BaseType::Struct(name))
    }

    /// Struct tag of a struct-typed value or of an array of structs.
    pub fn struct_name(&self) -> Option<NameId> {
        match self {
            Type::Base(BaseType::Struct(name)) | Type::Array(BaseType::Struct(name)) => Some(*name),
            _ => None,
        }
    }

    /// True for `void` and `void[]`.
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Base(BaseType::Void) | Type::Array(BaseType::Void))
    }

    /// String, struct and array values are references and accept `null`.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Base(BaseType::String) | Type::Base(BaseType::Struct(_)) | Type::Array(_)
        )
    }

    /// Operand types accepted on the left of a relational operator.
    pub fn is_ordered(&self) -> bool {
        matches!(self, Type::Base(BaseType::Bool | BaseType::Char | BaseType::Int))
    }
}

impl Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Void => f.write_str("void"),
            BaseType::Bool => f.write_str("bool"),
            BaseType::Char => f.write_str("char"),
            BaseType::Int => f.write_str("int"),
            BaseType::String => f.write_str("string"),
            BaseType::Struct(name) => write!(f, "struct \"{}\"", name),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Base(base) => write!(f, "{}", base),
            Type::Array(base) => write!(f, "{} array", base),
            Type::Null => f.write_str("null"),
        }
    }
}

bitflags! {
    /// Role facts orthogonal to the value's type.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Roles: u16 {
        const FUNCTION  = 1 << 0;
        const PROTOTYPE = 1 << 1;
        const VARIABLE  = 1 << 2;
        const FIELD     = 1 << 3;
        const PARAM     = 1 << 4;
        const LVALUE    = 1 << 5;
        const CONST     = 1 << 6;
        const VREG      = 1 << 7;
        const VADDR     = 1 << 8;
    }
}

/// Canonical rendering order. `PROTOTYPE` is never printed.
const ROLE_NAMES: [(Roles, &str); 8] = [
    (Roles::FUNCTION, "function"),
    (Roles::VARIABLE, "variable"),
    (Roles::FIELD, "field"),
    (Roles::PARAM, "param"),
    (Roles::LVALUE, "lval"),
    (Roles::CONST, "const"),
    (Roles::VREG, "vreg"),
    (Roles::VADDR, "vaddr"),
];

/// Type plus roles. An absent type means "not yet known" or, after analysis,
/// "already diagnosed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attributes {
    pub ty: Option<Type>,
    pub roles: Roles,
}

impl Attributes {
    pub fn new(ty: Option<Type>, roles: Roles) -> Self {
        Self { ty, roles }
    }

    pub fn typed(ty: Type, roles: Roles) -> Self {
        Self { ty: Some(ty), roles }
    }

    pub fn is_empty(&self) -> bool {
        self.ty.is_none() && self.roles.is_empty()
    }

    /// The value type: roles masked off, type identity (and struct name) kept.
    pub fn value_type(&self) -> Option<Type> {
        self.ty
    }

    pub fn type_name(&self) -> Option<NameId> {
        self.ty.and_then(|ty| ty.struct_name())
    }

    pub fn has(&self, role: Roles) -> bool {
        self.roles.contains(role)
    }
}

impl Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut need_space = false;
        if let Some(ty) = &self.ty {
            write!(f, "{}", ty)?;
            need_space = true;
        }
        for (role, name) in ROLE_NAMES {
            if self.roles.contains(role) {
                if need_space {
                    f.write_str(" ")?;
                }
                f.write_str(name)?;
                need_space = true;
            }
        }
        Ok(())
    }
}

/// Renders an optional value type for diagnostics.
pub fn describe(ty: Option<Type>) -> String {
    match ty {
        Some(ty) => ty.to_string(),
        None => "<unknown>".to_string(),
    }
}

/// Assignment compatibility of `source` into a slot of type `target`.
///
/// Identical types are compatible, and `null` fits any reference target.
/// The relation is not symmetric: `null` is never a valid target.
pub fn compatible(target: Type, source: Type) -> bool {
    target == source || (target.is_reference() && source == Type::Null)
}
