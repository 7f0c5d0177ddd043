use crate::ast::Ast;
use crate::lexer::LexOutput;
use crate::semantic::output::SemaOutput;

/// Last phase the pipeline runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CompilePhase {
    Lex,
    Parse,
    Analyze,
    #[default]
    Emit,
}

/// outputs for a single compilation unit
#[derive(Debug, Default)]
pub struct CompileArtifact {
    pub lexed: Option<LexOutput>,
    pub ast: Option<Ast>,
    pub sema_output: Option<SemaOutput>,
    /// Decorated tree dump, present once analysis ran.
    pub ast_dump: Option<String>,
    /// Symbol listing, present once analysis ran.
    pub symbol_dump: Option<String>,
    /// Emitted oil. Absent when analysis reported errors.
    pub oil: Option<String>,
}
