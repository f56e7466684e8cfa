//! Span-carrying syntax tree consumed by the emitter.
//!
//! The tree is deliberately shallow: statement scaffolding is modelled
//! structurally, while most expressions only keep the span of their source
//! text plus the few children the lowering rules need. Every span indexes
//! into the *same* text the tree was read from.

use serde::Serialize;
use std::ops::Range;

/// Half-open byte range `[start, end)` into a unit's source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Source text covered by this span, or `""` if it does not fit `source`.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// A parsed compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }
}

/// Statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stmt {
    Block { body: Vec<Stmt>, span: Span },
    Function(Function),
    Return { span: Span },
    Expr { expr: Expr, span: Span },
    Var(VarDecl),
    Class(Class),
    Import(Import),
    If(If),
    For(For),
    ForIn(ForIn),
    While { test: Expr, body: Box<Stmt>, span: Span },
    Break { span: Span },
    Continue { span: Span },
    /// Declaration or comment that has no runtime counterpart.
    Erased { span: Span },
    /// A node kind the reader does not model.
    Unsupported { kind: String, span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block { span, .. }
            | Stmt::Return { span }
            | Stmt::Expr { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Break { span }
            | Stmt::Continue { span }
            | Stmt::Erased { span }
            | Stmt::Unsupported { span, .. } => *span,
            Stmt::Function(f) => f.span,
            Stmt::Var(v) => v.span,
            Stmt::Class(c) => c.span,
            Stmt::Import(i) => i.span,
            Stmt::If(i) => i.span,
            Stmt::For(f) => f.span,
            Stmt::ForIn(f) => f.span,
        }
    }
}

/// A named parameter, with the span of its default value if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub default: Option<Span>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }
}

/// Function declaration (also used for class methods).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarators: Vec<Declarator>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declarator {
    /// Binding name; `None` for destructuring patterns.
    pub name: Option<String>,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Span>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassMember {
    Constructor(Function),
    Method(Function),
    /// Field declaration or any other non-method member.
    Field { name: String, span: Span },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Import {
    pub specifiers: Vec<ImportSpecifier>,
    /// Module specifier with its quotes removed.
    pub source: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportSpecifier {
    /// `import name from "m"`
    Default { local: String },
    /// `import * as local from "m"`
    Namespace { local: String },
    /// `import { imported as local } from "m"`
    Named { imported: String, local: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct If {
    pub test: Expr,
    pub consequent: Box<Stmt>,
    pub alternate: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct For {
    pub init: Option<Box<Stmt>>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForIn {
    /// Loop variable name; `None` for destructuring patterns.
    pub left: Option<String>,
    pub right: Expr,
    pub body: Box<Stmt>,
    /// `true` for `for..of`, `false` for `for..in`.
    pub of: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    Number,
    String,
    Bool,
    Null,
    Undefined,
    Regex,
}

/// Body of a function literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionBody {
    Block { body: Vec<Stmt> },
    Expr { expr: Box<Expr> },
}

/// Expressions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expr {
    Ident {
        name: String,
        span: Span,
    },
    Literal {
        kind: LiteralKind,
        span: Span,
    },
    Template {
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Assign {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
        span: Span,
    },
    Update {
        argument: Box<Expr>,
        op: String,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        op: String,
        argument: Box<Expr>,
        span: Span,
    },
    Sequence {
        exprs: Vec<Expr>,
        span: Span,
    },
    Member {
        object: Box<Expr>,
        property: String,
        span: Span,
    },
    Paren {
        expr: Box<Expr>,
        span: Span,
    },
    Function {
        params: Vec<Param>,
        body: FunctionBody,
        span: Span,
    },
    Array {
        span: Span,
    },
    Object {
        span: Span,
    },
    /// Any expression kind the emitter copies verbatim.
    Other {
        kind: String,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident { span, .. }
            | Expr::Literal { span, .. }
            | Expr::Template { span }
            | Expr::Call { span, .. }
            | Expr::New { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Update { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Sequence { span, .. }
            | Expr::Member { span, .. }
            | Expr::Paren { span, .. }
            | Expr::Function { span, .. }
            | Expr::Array { span }
            | Expr::Object { span }
            | Expr::Other { span, .. } => *span,
        }
    }

    /// Identifier name, looking through parentheses.
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident { name, .. } => Some(name),
            Expr::Paren { expr, .. } => expr.as_ident(),
            _ => None,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        match self {
            Expr::Paren { expr, .. } => expr.unparen(),
            other => other,
        }
    }
}
