//! Grammar-driven translation of TypeScript source into Python-like text.
//!
//! `apy-transpile` is a syntax-directed rewriter, not a semantic compiler:
//! statement scaffolding is regenerated from a [`Grammar`], expressions are
//! copied from the source by span, and a handful of shapes are lowered
//! (template literals, `withStatement` blocks, `named` arguments, counting
//! `for` loops).
//!
//! # Architecture
//!
//! ```text
//!  FrontEnd            Reader                 Emitter            Token pass
//! ──────────    ──────────────────────    ─────────────────    ────────────
//! entry.ts ─┐   erase types               Program ─> text      true  -> True
//! a.ts     ─┼─> strip `py.` qualifiers ─> (emit.rs,         ─> this  -> self
//! b.ts     ─┘   parse to Program (ir.rs)   grammar.rs)         ===   -> ==
//! ```
//!
//! Each unit is written to `<out_dir>/<stem>.<extension>` by the
//! [`driver`].
//!
//! # Example
//!
//! ```ignore
//! use apy_transpile::{Grammar, TYPESCRIPT_READER, compile_source};
//!
//! let out = compile_source("let ok = true;", &Grammar::python(), &TYPESCRIPT_READER)?;
//! assert_eq!(out.text, "ok = True\n");
//! ```
//!
//! # Grammars
//!
//! The default grammar targets Python. Other targets are described in JSON,
//! naming only what differs:
//!
//! ```json
//! { "functionKeyword": "func", "file": { "extension": "gd" } }
//! ```

pub mod diagnostic;
pub mod driver;
pub mod emit;
pub mod frontend;
pub mod grammar;
pub mod input;
pub mod ir;
pub mod lower;
pub mod replace;
pub mod stdlib;
pub mod traits;

// Re-exports: configuration and IR
pub use grammar::{Grammar, GrammarError};
pub use ir::{Expr, Program, Span, Stmt};

// Re-exports: pipeline
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use driver::{
    CompileError, CompileOptions, CompileReport, SourceUnit, UnitReport, compile, compile_source,
    compile_unit,
};
pub use emit::{Emitted, Emitter, emit};
pub use frontend::{FsFrontEnd, Resolution};
pub use replace::replace_tokens;

// Re-exports: Traits
pub use traits::{FrontEnd, ReadError, Reader};

// Re-exports: Built-in readers
#[cfg(feature = "read-typescript")]
pub use driver::compile_project;
#[cfg(feature = "read-typescript")]
pub use input::{TYPESCRIPT_READER, TypeScriptReader, erase_types, read_typescript};
