//! Core compilation pipeline orchestration module
//!
//! This module contains the main compiler driver that orchestrates
//! the compilation pipeline: lexing, parsing, semantic analysis and oil
//! emission, followed by writing the requested listings.

use std::fs;
use std::path::PathBuf;

use log::debug;

use crate::ast::Ast;
use crate::ast::dumper::AstDumper;
use crate::codegen::emit_program;
use crate::diagnostic::{DiagnosticEngine, ParseError};
use crate::lexer::{LexOutput, tokenize};
use crate::parser::parse;
use crate::semantic::{SemaOutput, analyze};

use super::artifact::{CompileArtifact, CompilePhase};
use super::cli::{Cli, CompileConfig, PathOrBuffer};
use super::output::OutputHandler;

/// Main compiler driver
pub struct CompilerDriver {
    config: CompileConfig,
    diagnostics: DiagnosticEngine,
    output_handler: OutputHandler,
}

impl CompilerDriver {
    /// Create a new compiler driver from CLI arguments
    pub fn new(cli: Cli) -> Result<Self, DriverError> {
        let config = cli.into_config()?;
        Ok(Self::from_config(config))
    }

    /// Create a new compiler driver from configuration
    pub fn from_config(config: CompileConfig) -> Self {
        CompilerDriver {
            diagnostics: DiagnosticEngine::default(),
            output_handler: OutputHandler::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &DiagnosticEngine {
        &self.diagnostics
    }

    /// Run the phases up to and including `stop_after`.
    ///
    /// Only I/O failures and syntax errors end the pipeline early; lexical
    /// and semantic errors are collected and the pipeline keeps going, except
    /// that no oil is emitted for a program with errors.
    pub fn run_pipeline(&mut self, stop_after: CompilePhase) -> Result<CompileArtifact, DriverError> {
        let mut out = CompileArtifact::default();
        for (name, value) in &self.config.defines {
            debug!("define {}={}", name, value.as_deref().unwrap_or("1"));
        }

        let source = self.read_source()?;
        let lexed = self.run_lexer(&source);
        if stop_after == CompilePhase::Lex {
            out.lexed = Some(lexed);
            return Ok(out);
        }

        let mut ast = self.run_parser(&lexed)?;
        out.lexed = Some(lexed);
        if stop_after == CompilePhase::Parse {
            out.ast = Some(ast);
            return Ok(out);
        }

        let sema = self.run_analysis(&mut ast);
        out.ast_dump = Some(AstDumper::new(&ast, Some(&sema.symbols)).dump());
        out.symbol_dump = Some(sema.symbols.dump_listing());
        if stop_after == CompilePhase::Analyze {
            out.ast = Some(ast);
            out.sema_output = Some(sema);
            return Ok(out);
        }

        out.oil = self.run_codegen(&ast, &sema);
        out.ast = Some(ast);
        out.sema_output = Some(sema);
        Ok(out)
    }

    fn read_source(&self) -> Result<String, DriverError> {
        match &self.config.input {
            PathOrBuffer::Path(path) => fs::read_to_string(path).map_err(|source| DriverError::Io {
                path: path.clone(),
                source,
            }),
            PathOrBuffer::Buffer(_, source) => Ok(source.clone()),
        }
    }

    fn run_lexer(&mut self, source: &str) -> LexOutput {
        let lexed = tokenize(source, &self.config.input.display_name());
        for error in &lexed.errors {
            self.diagnostics.report_lex_error(error.clone());
        }
        if self.config.dump_tokens {
            eprint!("{}", lexed.dump);
        }
        lexed
    }

    fn run_parser(&mut self, lexed: &LexOutput) -> Result<Ast, DriverError> {
        let mut ast = Ast::new();
        if let Err(error) = parse(&lexed.tokens, &mut ast) {
            let location = error.location();
            let file = lexed
                .sources
                .name(location.file)
                .map(str::to_string)
                .unwrap_or_else(|| self.config.input.display_name());
            return Err(DriverError::Syntax {
                file,
                line: location.line,
                error,
            });
        }
        debug!("parser: {} nodes", ast.len());
        if self.config.dump_parser {
            eprint!("{}", AstDumper::new(&ast, None).dump());
        }
        Ok(ast)
    }

    fn run_analysis(&mut self, ast: &mut Ast) -> SemaOutput {
        analyze(ast, &mut self.diagnostics)
    }

    fn run_codegen(&self, ast: &Ast, sema: &SemaOutput) -> Option<String> {
        if self.diagnostics.has_errors() {
            debug!("skipping oil: {} errors", self.diagnostics.error_count());
            return None;
        }
        Some(emit_program(ast, sema))
    }

    /// Run the compilation and write the requested listings.
    ///
    /// Diagnostics are flushed to stderr before any error is returned.
    pub fn run(&mut self) -> Result<Vec<PathBuf>, DriverError> {
        let result = self.run_pipeline(self.config.stop_after);
        self.print_diagnostics();
        let mut artifact = result?;

        let written = self.output_handler.write_artifact(&self.config, &artifact)?;
        if let Some(mut ast) = artifact.ast.take() {
            let root = ast.root();
            let released = ast.release_subtree(root);
            debug!("released {} tree nodes", released);
        }

        if self.diagnostics.has_errors() {
            return Err(DriverError::CompilationFailed(self.diagnostics.error_count()));
        }
        Ok(written)
    }

    /// Print accumulated diagnostics without returning an error
    pub fn print_diagnostics(&self) {
        eprint!("{}", self.diagnostics.render());
    }
}

/// Error types for the compiler driver
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: source file name must end in .oc", .0.display())]
    BadSuffix(PathBuf),

    #[error("{file}: {line}: {error}")]
    Syntax {
        file: String,
        line: u32,
        #[source]
        error: ParseError,
    },

    #[error("compilation failed with {0} errors")]
    CompilationFailed(usize),
}
