//! Multi-unit compilation driver.
//!
//! The driver asks a [`FrontEnd`] for the entry unit and everything it
//! transitively imports, then runs each unit through the same pipeline:
//!
//! ```text
//! unit text ─► erase types ─► strip shim qualifiers ─► read IR ─► emit ─► replace tokens
//! ```
//!
//! and writes the result to `<out_dir>/<stem>.<extension>`. Units are
//! independent: a unit that fails only produces diagnostics for itself.

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::emit::{Emitted, emit};
use crate::grammar::Grammar;
use crate::replace::replace_tokens;
use crate::stdlib::strip_qualifiers;
use crate::traits::{FrontEnd, ReadError, Reader};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Text of one compilation unit as supplied by a front-end.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub text: String,
    /// Problems found while loading this unit (unresolved imports, ...).
    pub diagnostics: Vec<Diagnostic>,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            diagnostics: Vec::new(),
        }
    }
}

/// Faults that stop a whole run.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("entry file not found: {}", .0.display())]
    EntryNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Options for one compilation run.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub entry: PathBuf,
    pub out_dir: PathBuf,
    pub grammar: Grammar,
}

impl CompileOptions {
    pub fn new(entry: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            out_dir: out_dir.into(),
            grammar: Grammar::default(),
        }
    }

    pub fn with_grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = grammar;
        self
    }

    /// Artifact path for a unit: `<out_dir>/<stem>.<extension>`.
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        self.out_dir
            .join(format!("{stem}.{}", self.grammar.file.extension))
    }
}

/// Outcome for one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitReport {
    pub source_path: PathBuf,
    /// Where the artifact was written; `None` if nothing was written.
    pub output_path: Option<PathBuf>,
    pub generated: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl UnitReport {
    /// The unit could not be parsed or its artifact not written.
    pub fn failed(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::Parse | DiagnosticKind::Io))
    }
}

/// Outcome of a whole run, in front-end order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompileReport {
    pub units: Vec<UnitReport>,
}

impl CompileReport {
    /// Every diagnostic of every unit.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.units.iter().flat_map(|unit| unit.diagnostics.iter())
    }

    pub fn has_failures(&self) -> bool {
        self.units.iter().any(UnitReport::failed)
    }
}

/// Compile one unit's text without touching the filesystem.
///
/// Returns the generated text (token replacement applied) together with
/// the emitter's diagnostics. Spans in the diagnostics refer to the text
/// after type erasure.
pub fn compile_source(
    source: &str,
    grammar: &Grammar,
    reader: &dyn Reader,
) -> Result<Emitted, ReadError> {
    let erased = reader.erase_types(source)?;
    let text = strip_qualifiers(&erased, &grammar.file.stdlib.qualifiers());
    let program = reader.read(&text)?;
    let emitted = emit(&program, &text, grammar);
    Ok(Emitted {
        text: replace_tokens(&emitted.text, &grammar.file.token_replacements),
        diagnostics: emitted.diagnostics,
    })
}

/// Compile the entry unit and everything it imports.
pub fn compile(
    options: &CompileOptions,
    front_end: &dyn FrontEnd,
    reader: &dyn Reader,
) -> Result<CompileReport, CompileError> {
    let units = front_end.load(std::slice::from_ref(&options.entry))?;
    tracing::debug!(units = units.len(), out_dir = %options.out_dir.display(), "loaded units");

    fs::create_dir_all(&options.out_dir).map_err(|source| CompileError::OutputDir {
        path: options.out_dir.clone(),
        source,
    })?;

    let mut written: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut report = CompileReport::default();
    for unit in units {
        let unit_report = compile_unit(unit, options, reader);
        if let Some(output) = &unit_report.output_path
            && let Some(previous) = written.insert(output.clone(), unit_report.source_path.clone())
        {
            tracing::warn!(
                output = %output.display(),
                overwritten = %previous.display(),
                by = %unit_report.source_path.display(),
                "output file name collision"
            );
        }
        report.units.push(unit_report);
    }
    Ok(report)
}

/// Run one unit through the pipeline and write its artifact.
pub fn compile_unit(unit: SourceUnit, options: &CompileOptions, reader: &dyn Reader) -> UnitReport {
    let SourceUnit {
        path,
        text,
        diagnostics: load_diagnostics,
    } = unit;
    tracing::debug!(path = %path.display(), "compiling unit");

    let mut diagnostics: Vec<Diagnostic> = load_diagnostics
        .into_iter()
        .map(|d| if d.path.is_none() { d.with_path(&path) } else { d })
        .collect();

    let emitted = match compile_source(&text, &options.grammar, reader) {
        Ok(emitted) => emitted,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read unit");
            diagnostics.push(Diagnostic::new(DiagnosticKind::Parse, err.to_string()).with_path(&path));
            return UnitReport {
                source_path: path,
                output_path: None,
                generated: String::new(),
                diagnostics,
            };
        }
    };
    diagnostics.extend(emitted.diagnostics.into_iter().map(|d| d.with_path(&path)));

    if diagnostics.iter().any(|d| d.kind == DiagnosticKind::Parse) {
        tracing::warn!(path = %path.display(), "syntax errors, no output written");
        return UnitReport {
            source_path: path,
            output_path: None,
            generated: emitted.text,
            diagnostics,
        };
    }

    let output = options.output_path(&path);
    let output_path = match fs::write(&output, &emitted.text) {
        Ok(()) => Some(output),
        Err(err) => {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::Io,
                    format!("failed to write {}: {err}", output.display()),
                )
                .with_path(&path),
            );
            None
        }
    };

    UnitReport {
        source_path: path,
        output_path,
        generated: emitted.text,
        diagnostics,
    }
}

/// Compile a project from disk with the TypeScript reader.
#[cfg(feature = "read-typescript")]
pub fn compile_project(
    options: &CompileOptions,
    front_end: &crate::frontend::FsFrontEnd<'_>,
) -> Result<CompileReport, CompileError> {
    compile(options, front_end, &crate::input::TYPESCRIPT_READER)
}
