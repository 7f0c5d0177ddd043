//! Compiler driver module
//!
//! Turns command-line arguments into a [`CompileConfig`], runs the pipeline
//! and writes the `.tok`, `.ast`, `.sym` and `.oil` listings.

pub mod artifact;
pub mod cli;
pub mod compiler;
pub(crate) mod output;

pub use artifact::{CompileArtifact, CompilePhase};
pub use cli::{Cli, CompileConfig, EmitKind, PathOrBuffer};
pub use compiler::{CompilerDriver, DriverError};
