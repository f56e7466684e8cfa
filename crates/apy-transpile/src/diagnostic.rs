//! Structured diagnostics reported while compiling a unit.

use crate::ir::Span;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A node kind, or a shape of a known kind, the emitter does not lower.
    Unsupported,
    /// A child the lowering relies on is absent.
    MissingStructure,
    /// An import specifier that looks local did not resolve to a file.
    Resolution,
    /// The unit's text could not be parsed.
    Parse,
    /// Reading or writing a file failed.
    Io,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Unsupported => "unsupported",
            DiagnosticKind::MissingStructure => "missing structure",
            DiagnosticKind::Resolution => "unresolved import",
            DiagnosticKind::Parse => "parse error",
            DiagnosticKind::Io => "io error",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Option<Span>,
    pub path: Option<PathBuf>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
            path: None,
        }
    }

    pub fn unsupported(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Unsupported, message).with_span(span)
    }

    pub fn missing(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::MissingStructure, message).with_span(span)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: ", path.display())?;
        }
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(span) = self.span {
            write!(f, " (bytes {}..{})", span.start, span.end)?;
        }
        Ok(())
    }
}
