//! CLI parsing and configuration module
//!
//! This module handles command-line argument parsing using clap and
//! provides configuration structures for the compiler driver.

use std::path::{Path, PathBuf};

use clap::{Parser as CliParser, ValueEnum};

use super::artifact::CompilePhase;
use super::compiler::DriverError;

/// CLI interface using clap
#[derive(CliParser, Debug)]
#[clap(name = "occ", about = "Compiler for the oc language, emitting oil")]
pub struct Cli {
    /// Input oc source file
    #[clap(value_parser, value_name = "FILE.oc")]
    pub input_file: PathBuf,

    /// Directory for the output files
    #[clap(short, long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Preprocessor macro definitions
    #[clap(short = 'D', long = "define", value_name = "NAME[=VALUE]", action = clap::ArgAction::Append)]
    pub defines: Vec<String>,

    /// Echo the token stream to stderr
    #[clap(short = 'l', long)]
    pub dump_tokens: bool,

    /// Echo the parser tree to stderr
    #[clap(short = 'y', long)]
    pub dump_parser: bool,

    /// Output files to write
    #[clap(long, value_enum, action = clap::ArgAction::Append)]
    pub emit: Vec<EmitKind>,

    /// Enable verbose diagnostic output
    #[clap(short, long)]
    pub verbose: bool,
}

/// Output files the driver can write, named after the input's basename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum EmitKind {
    /// Token listing (`.tok`)
    Tok,
    /// Decorated tree (`.ast`)
    Ast,
    /// Symbol listing (`.sym`)
    Sym,
    /// Intermediate language (`.oil`)
    Oil,
    /// Every output
    All,
}

impl EmitKind {
    pub fn extension(self) -> &'static str {
        match self {
            EmitKind::Tok => "tok",
            EmitKind::Ast => "ast",
            EmitKind::Sym => "sym",
            EmitKind::Oil => "oil",
            EmitKind::All => "",
        }
    }
}

/// Where the source comes from.
#[derive(Debug, Clone)]
pub enum PathOrBuffer {
    Path(PathBuf),
    /// In-memory source with the name it is reported under.
    Buffer(String, String),
}

impl PathOrBuffer {
    /// File name used in diagnostics and the token dump.
    pub fn display_name(&self) -> String {
        match self {
            PathOrBuffer::Path(path) => path.display().to_string(),
            PathOrBuffer::Buffer(name, _) => name.clone(),
        }
    }

    /// Basename without the `.oc` suffix.
    pub fn base_name(&self) -> String {
        let name = match self {
            PathOrBuffer::Path(path) => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            PathOrBuffer::Buffer(name, _) => Path::new(name).file_name().map(|n| n.to_string_lossy().into_owned()),
        }
        .unwrap_or_default();
        name.strip_suffix(".oc").map(str::to_string).unwrap_or(name)
    }
}

/// Configuration for compilation
#[derive(Debug, Clone)]
pub struct CompileConfig {
    pub input: PathOrBuffer,
    pub out_dir: PathBuf,
    pub defines: Vec<(String, Option<String>)>, // NAME -> VALUE
    pub dump_tokens: bool,
    pub dump_parser: bool,
    pub emit: Vec<EmitKind>,
    pub verbose: bool,
    pub stop_after: CompilePhase,
}

impl CompileConfig {
    /// In-memory configuration compiling `source` as `test.oc`, writing nothing.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            input: PathOrBuffer::Buffer("test.oc".to_string(), source.into()),
            out_dir: PathBuf::from("."),
            defines: Vec::new(),
            dump_tokens: false,
            dump_parser: false,
            emit: Vec::new(),
            verbose: false,
            stop_after: CompilePhase::default(),
        }
    }

    /// True if `kind` is among the requested outputs.
    pub fn emits(&self, kind: EmitKind) -> bool {
        self.emit.contains(&EmitKind::All) || self.emit.contains(&kind)
    }
}

/// Split `NAME[=VALUE]`.
pub fn parse_define(def: &str) -> (String, Option<String>) {
    match def.split_once('=') {
        Some((name, value)) => (name.to_string(), Some(value.to_string())),
        None => (def.to_string(), None),
    }
}

impl Cli {
    /// Convert CLI arguments into compilation configuration
    pub fn into_config(self) -> Result<CompileConfig, DriverError> {
        if self.input_file.extension().and_then(|ext| ext.to_str()) != Some("oc") {
            return Err(DriverError::BadSuffix(self.input_file));
        }
        let emit = if self.emit.is_empty() {
            vec![EmitKind::All]
        } else {
            self.emit
        };
        Ok(CompileConfig {
            input: PathOrBuffer::Path(self.input_file),
            out_dir: self.out_dir.unwrap_or_else(|| PathBuf::from(".")),
            defines: self.defines.iter().map(|def| parse_define(def)).collect(),
            dump_tokens: self.dump_tokens,
            dump_parser: self.dump_parser,
            emit,
            verbose: self.verbose,
            stop_after: CompilePhase::default(),
        })
    }
}
