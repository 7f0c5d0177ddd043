//! Output file writing module
//!
//! Writes the listings of one compilation next to each other in the output
//! directory, named `<base>.<extension>`.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::artifact::CompileArtifact;
use super::cli::{CompileConfig, EmitKind};
use super::compiler::DriverError;

/// Handler for the per-phase output files
pub(crate) struct OutputHandler {
    out_dir: PathBuf,
    base_name: String,
}

impl OutputHandler {
    pub(crate) fn new(config: &CompileConfig) -> Self {
        OutputHandler {
            out_dir: config.out_dir.clone(),
            base_name: config.input.base_name(),
        }
    }

    pub(crate) fn path_for(&self, kind: EmitKind) -> PathBuf {
        self.out_dir.join(format!("{}.{}", self.base_name, kind.extension()))
    }

    /// Write every requested listing the artifact holds. Returns the paths
    /// written, in `.tok .ast .sym .oil` order.
    pub(crate) fn write_artifact(
        &self,
        config: &CompileConfig,
        artifact: &CompileArtifact,
    ) -> Result<Vec<PathBuf>, DriverError> {
        let listings = [
            (EmitKind::Tok, artifact.lexed.as_ref().map(|lexed| lexed.dump.as_str())),
            (EmitKind::Ast, artifact.ast_dump.as_deref()),
            (EmitKind::Sym, artifact.symbol_dump.as_deref()),
            (EmitKind::Oil, artifact.oil.as_deref()),
        ];
        let mut written = Vec::new();
        for (kind, contents) in listings {
            if let Some(contents) = contents
                && config.emits(kind)
            {
                let path = self.path_for(kind);
                write_file(&path, contents)?;
                written.push(path);
            }
        }
        Ok(written)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), DriverError> {
    debug!("writing {} ({} bytes)", path.display(), contents.len());
    fs::write(path, contents).map_err(|source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    })
}
