//! Code generation module.
//!
//! Lowers the analyzed tree to oil, a linear C-like IR with typed virtual
//! registers and explicit goto labels:
//! - OilGen: module layout, declarations and function signatures
//! - oil_gen_statement: statements and control flow
//! - oil_gen_expression: expressions, one register per computed value

pub mod oil_gen;

pub(crate) mod oil_gen_expression;
pub(crate) mod oil_gen_statement;

pub use oil_gen::{OilGen, emit_program};
