//! Seams between the driver and its collaborators.

use crate::driver::{CompileError, SourceUnit};
use crate::ir::Program;
use std::path::PathBuf;

/// Error that can occur when reading unit text into the IR.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("parse error: {0}")]
    Parse(String),
}

/// A reader parses unit text into the span-carrying IR.
pub trait Reader: Send + Sync {
    /// Language identifier (e.g., "typescript").
    fn language(&self) -> &'static str;

    /// File extensions this reader handles (e.g., &["ts", "tsx"]).
    fn extensions(&self) -> &'static [&'static str];

    /// Remove syntax that only exists for the type checker, leaving text
    /// whose spans can be copied into the output.
    fn erase_types(&self, source: &str) -> Result<String, ReadError> {
        Ok(source.to_string())
    }

    /// Parse source text into the IR.
    fn read(&self, source: &str) -> Result<Program, ReadError>;
}

/// A front-end supplies the text of every unit reachable from the entries.
pub trait FrontEnd {
    /// Load the entry units followed by their transitive local imports.
    ///
    /// Only a missing or unreadable entry is an error; problems with
    /// imported units are reported as diagnostics on the returned units.
    fn load(&self, entries: &[PathBuf]) -> Result<Vec<SourceUnit>, CompileError>;
}
