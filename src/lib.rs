//! A compiler for the oc language, emitting the oil intermediate language.
pub mod source;

/// Contains the abstract syntax tree.
pub mod ast;
/// Contains the oil emitter.
pub mod codegen;
/// Contains the error types and the diagnostic collector.
pub mod diagnostic;
/// Contains the compiler driver.
pub mod driver;
pub mod lexer;
pub mod parser;
/// Contains the scope resolver and type checker.
pub mod semantic;
