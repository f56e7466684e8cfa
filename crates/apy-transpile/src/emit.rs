//! Grammar-driven emitter.
//!
//! Walks the IR of one unit and writes target-language text. Statement
//! scaffolding (headers, block delimiters, indentation) is generated from
//! the [`Grammar`]; expressions are copied from the unit's source text
//! except for the few shapes that need lowering. Indentation depth is a
//! plain argument, so every block returns to the depth it was entered at.
//!
//! Constructs the emitter cannot lower produce a [`Diagnostic`] and no
//! output; the walk always continues with the next statement.

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::grammar::Grammar;
use crate::ir::*;
use crate::lower::{flatten_sequence, requote_string, rewrite_template_literal, string_content};
use crate::replace::is_ident_char;
use crate::stdlib::{CallTable, StdlibForm, is_shim_module, shim_submodule};

/// Output of emitting one unit, before token replacement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Emitted {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Emit a parsed unit. `source` must be the text `program` was read from.
pub fn emit(program: &Program, source: &str, grammar: &Grammar) -> Emitted {
    let mut emitter = Emitter::new(grammar, source);
    let text = emitter.emit_program(program);
    Emitted {
        text,
        diagnostics: emitter.diagnostics,
    }
}

/// Emitter state for one unit.
pub struct Emitter<'a> {
    grammar: &'a Grammar,
    source: &'a str,
    calls: CallTable<'a>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Emitter<'a> {
    pub fn new(grammar: &'a Grammar, source: &'a str) -> Self {
        Self {
            grammar,
            source,
            calls: CallTable::new(grammar),
            diagnostics: Vec::new(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn emit_program(&mut self, program: &Program) -> String {
        let mut out = String::new();
        self.emit_stmts(&program.body, 0, &mut out);
        out
    }

    /// Emit statements in order at `depth`.
    pub fn emit_stmts(&mut self, stmts: &[Stmt], depth: usize, out: &mut String) {
        for stmt in stmts {
            self.emit_stmt(stmt, depth, out);
        }
    }

    pub fn emit_stmt(&mut self, stmt: &Stmt, depth: usize, out: &mut String) {
        let grammar = self.grammar;
        match stmt {
            Stmt::Block { body, .. } => self.emit_stmts(body, depth, out),

            Stmt::Function(func) => {
                let params = self.params_text(&func.params, false);
                self.emit_function(
                    Some(grammar.function_keyword.as_str()),
                    &func.name,
                    &params,
                    &func.body,
                    depth,
                    out,
                );
            }

            Stmt::Return { span } => {
                let text = self.verbatim(*span);
                let text = text.trim_end().trim_end_matches(';').trim_end();
                self.line(depth, &format!("{text}{}", grammar.terminator()), out);
            }

            Stmt::Expr { expr, span } => self.emit_expr_stmt(expr, *span, depth, out),

            Stmt::Var(decl) => self.emit_var(decl, depth, out),

            Stmt::Class(class) => self.emit_class(class, depth, out),

            Stmt::Import(import) => self.emit_import(import, depth, out),

            Stmt::If(node) => self.emit_if(node, depth, out),

            Stmt::For(node) => self.emit_for(node, depth, out),

            Stmt::ForIn(node) => self.emit_for_in(node, depth, out),

            Stmt::While { test, body, .. } => {
                let header = format!("{} {}", grammar.control.while_keyword, self.condition(test));
                self.emit_block(&header, body_of(body), depth, out);
            }

            Stmt::Break { .. } => {
                let text = format!("{}{}", grammar.control.break_keyword, grammar.terminator());
                self.line(depth, &text, out);
            }

            Stmt::Continue { .. } => {
                let text = format!("{}{}", grammar.control.continue_keyword, grammar.terminator());
                self.line(depth, &text, out);
            }

            Stmt::Erased { .. } => {}

            Stmt::Unsupported { kind, span } if kind == "ERROR" => {
                tracing::warn!(start = span.start, "syntax error");
                self.diagnostics
                    .push(Diagnostic::new(DiagnosticKind::Parse, "syntax error").with_span(*span));
            }

            Stmt::Unsupported { kind, span } => self.unsupported(kind, *span),
        }
    }

    // ========================================================================
    // Output helpers
    // ========================================================================

    fn line(&self, depth: usize, text: &str, out: &mut String) {
        out.push_str(&self.grammar.indent(depth));
        out.push_str(text);
        out.push('\n');
    }

    /// `header` + block opener, `body` one level deeper, then the closer.
    fn emit_block(&mut self, header: &str, body: &[Stmt], depth: usize, out: &mut String) {
        out.push_str(&self.grammar.indent(depth));
        out.push_str(header);
        out.push_str(self.grammar.block_open());
        self.emit_body(body, depth + 1, out);
        self.close_block(depth, out);
    }

    /// Statements of a block body; indent-style bodies never end up empty.
    fn emit_body(&mut self, body: &[Stmt], depth: usize, out: &mut String) {
        let before = out.len();
        self.emit_stmts(body, depth, out);
        if out.len() == before {
            self.empty_body(depth, out);
        }
    }

    fn empty_body(&self, depth: usize, out: &mut String) {
        if !self.grammar.file.use_braces && !self.grammar.file.empty_block.is_empty() {
            self.line(depth, &self.grammar.file.empty_block, out);
        }
    }

    fn close_block(&self, depth: usize, out: &mut String) {
        if self.grammar.file.use_braces {
            self.line(depth, "}", out);
        }
    }

    fn text(&self, span: Span) -> &'a str {
        span.text(self.source)
    }

    fn verbatim(&self, span: Span) -> String {
        self.text(span).to_string()
    }

    /// Source text of `expr` with the keyword of every `new` expression in
    /// its tree removed, unless the grammar keeps it. Only `Expr::New`
    /// nodes are touched, so string contents are copied as-is.
    fn without_new(&self, expr: &Expr) -> String {
        let span = expr.span();
        if self.grammar.class.call_with_new_keyword {
            return self.verbatim(span);
        }
        let mut cuts = Vec::new();
        new_keywords(expr, self.source, &mut cuts);
        cuts.sort_by_key(|cut| cut.start);

        let mut out = String::with_capacity(span.end.saturating_sub(span.start));
        let mut pos = span.start;
        for cut in cuts {
            if cut.start < pos || cut.end > span.end {
                continue;
            }
            out.push_str(self.text(Span::new(pos, cut.start)));
            pos = cut.end;
        }
        out.push_str(self.text(Span::new(pos, span.end)));
        out
    }

    fn unsupported(&mut self, what: &str, span: Span) {
        tracing::warn!(construct = what, start = span.start, "skipping unsupported construct");
        self.diagnostics
            .push(Diagnostic::unsupported(format!("{what} is not supported"), span));
    }

    fn missing(&mut self, message: String, span: Span) {
        tracing::warn!(start = span.start, "{message}");
        self.diagnostics.push(Diagnostic::missing(message, span));
    }

    // ========================================================================
    // Functions and classes
    // ========================================================================

    fn params_text(&self, params: &[Param], receiver: bool) -> String {
        let receiver_name = &self.grammar.class.receiver_name;
        let receiver = (receiver && !receiver_name.is_empty()).then(|| receiver_name.clone());
        receiver
            .into_iter()
            .chain(params.iter().map(|param| match param.default {
                Some(default) => format!("{}={}", param.name, self.verbatim(default)),
                None => param.name.clone(),
            }))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn emit_function(
        &mut self,
        keyword: Option<&str>,
        name: &str,
        params: &str,
        body: &[Stmt],
        depth: usize,
        out: &mut String,
    ) {
        let header = match keyword {
            Some(keyword) if !keyword.is_empty() => format!("{keyword} {name}({params})"),
            _ => format!("{name}({params})"),
        };
        self.emit_block(&header, body, depth, out);
    }

    /// `const f = (x) => ...` becomes a named function.
    fn emit_function_literal(
        &mut self,
        name: &str,
        params: &[Param],
        body: &FunctionBody,
        depth: usize,
        out: &mut String,
    ) {
        let keyword = Some(self.grammar.function_keyword.as_str());
        let params = self.params_text(params, false);
        match body {
            FunctionBody::Block { body } => {
                self.emit_function(keyword, name, &params, body, depth, out);
            }
            FunctionBody::Expr { expr } => {
                let grammar = self.grammar;
                out.push_str(&grammar.indent(depth));
                out.push_str(&format!("{} {name}({params})", grammar.function_keyword));
                out.push_str(grammar.block_open());
                let value = self.render_expr(expr);
                self.line(depth + 1, &format!("return {value}{}", grammar.terminator()), out);
                self.close_block(depth, out);
            }
        }
    }

    fn emit_class(&mut self, class: &Class, depth: usize, out: &mut String) {
        let syntax = &self.grammar.class;
        let mut header = format!("{} {}", syntax.keyword, class.name);
        if let Some(superclass) = class.superclass {
            let superclass = self.text(superclass);
            if syntax.inherit_with_parens {
                header.push_str(&format!("({superclass})"));
            } else {
                header.push_str(&format!(" extends {superclass}"));
            }
        }

        out.push_str(&self.grammar.indent(depth));
        out.push_str(&header);
        out.push_str(self.grammar.block_open());
        let before = out.len();

        let constructor = class.members.iter().find_map(|member| match member {
            ClassMember::Constructor(func) => Some(func),
            _ => None,
        });
        if let Some(constructor) = constructor {
            self.emit_method(constructor, true, depth + 1, out);
        }

        for member in &class.members {
            match member {
                ClassMember::Method(func) => self.emit_method(func, false, depth + 1, out),
                ClassMember::Field { name, span } => {
                    self.unsupported(&format!("class member `{name}`"), *span);
                }
                ClassMember::Constructor(_) => {}
            }
        }

        if out.len() == before {
            self.empty_body(depth + 1, out);
        }
        self.close_block(depth, out);
    }

    fn emit_method(&mut self, func: &Function, constructor: bool, depth: usize, out: &mut String) {
        let grammar = self.grammar;
        let syntax = &grammar.class;
        let (name, keyword) = if constructor {
            (
                syntax.constructor_name.as_str(),
                syntax.constructor_is_function,
            )
        } else {
            (func.name.as_str(), syntax.prefix_method_keyword)
        };
        let keyword = keyword.then_some(grammar.function_keyword.as_str());
        let params = self.params_text(&func.params, syntax.prefix_self);
        self.emit_function(keyword, name, &params, &func.body, depth, out);
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn emit_var(&mut self, decl: &VarDecl, depth: usize, out: &mut String) {
        let Some((first, rest)) = decl.declarators.split_first() else {
            self.missing("variable declaration without declarators".into(), decl.span);
            return;
        };
        for extra in rest {
            let name = extra.name.as_deref().unwrap_or("pattern");
            self.unsupported(&format!("additional declarator `{name}`"), extra.span);
        }

        let Some(name) = first.name.as_deref() else {
            self.unsupported("destructuring declaration", first.span);
            return;
        };

        if let Some(Expr::Function { params, body, .. }) = first.init.as_ref().map(Expr::unparen) {
            self.emit_function_literal(name, params, body, depth, out);
            return;
        }

        let value = match &first.init {
            Some(init) => self.render_initializer(init),
            None => "undefined".to_string(),
        };
        let keyword = match &self.grammar.variable_keyword {
            Some(keyword) => format!("{keyword} "),
            None => String::new(),
        };
        let text = format!("{keyword}{name} = {value}{}", self.grammar.terminator());
        self.line(depth, &text, out);
    }

    fn render_initializer(&mut self, init: &Expr) -> String {
        match init {
            Expr::Literal { span, .. } => self.text(*span).to_string(),
            Expr::New { args, span, .. }
                if self.text(*span).ends_with(')')
                    && !args.iter().any(|arg| self.needs_rewrite(arg)) =>
            {
                self.without_new(init)
            }
            Expr::New { callee, args, .. } => {
                let args = self.render_args(args);
                let callee = self.text(callee.span());
                if self.grammar.class.call_with_new_keyword {
                    format!("new {callee}({args})")
                } else {
                    format!("{callee}({args})")
                }
            }
            Expr::Unary { op, argument, span } if op == "-" => match argument.unparen() {
                Expr::Literal { span: lit, .. } => format!("-{}", self.text(*lit)),
                _ => self.verbatim(*span),
            },
            other => self.render_expr(other),
        }
    }

    fn emit_import(&mut self, import: &Import, depth: usize, out: &mut String) {
        if is_shim_module(&import.source, self.grammar) {
            return;
        }
        let module = self.module_path(&import.source);
        let terminator = self.grammar.terminator();

        let mut named = Vec::new();
        for specifier in &import.specifiers {
            match specifier {
                ImportSpecifier::Default { local } | ImportSpecifier::Namespace { local } => {
                    let text = if *local == module {
                        format!("import {module}{terminator}")
                    } else {
                        format!("import {module} as {local}{terminator}")
                    };
                    self.line(depth, &text, out);
                }
                ImportSpecifier::Named { imported, local } => {
                    if imported == local {
                        named.push(imported.clone());
                    } else {
                        named.push(format!("{imported} as {local}"));
                    }
                }
            }
        }

        if !named.is_empty() {
            let text = format!("from {module} import {}{terminator}", named.join(", "));
            self.line(depth, &text, out);
        }
        if import.specifiers.is_empty() {
            self.line(depth, &format!("import {module}{terminator}"), out);
        }
    }

    /// Target module path for an import specifier.
    fn module_path(&self, specifier: &str) -> String {
        let separator = &self.grammar.file.module_path_separator;
        if let Some(module) = shim_submodule(specifier, self.grammar) {
            return module.replace('/', separator);
        }

        let mut path = specifier;
        loop {
            if let Some(rest) = path.strip_prefix("./") {
                path = rest;
            } else if let Some(rest) = path.strip_prefix("../") {
                path = rest;
            } else {
                break;
            }
        }
        let path = [".js", ".ts", ".mjs"]
            .iter()
            .find_map(|ext| path.strip_suffix(ext))
            .unwrap_or(path);
        path.replace('/', separator)
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    /// `if` chains are walked iteratively; each `else if` fuses into one
    /// header at the same depth.
    fn emit_if(&mut self, node: &If, depth: usize, out: &mut String) {
        let grammar = self.grammar;
        let control = &grammar.control;
        let braces = grammar.file.use_braces;

        let mut keyword = control.if_keyword.as_str();
        let mut current = node;
        out.push_str(&grammar.indent(depth));
        loop {
            out.push_str(&format!("{keyword} {}", self.condition(&current.test)));
            out.push_str(grammar.block_open());
            self.emit_body(body_of(&current.consequent), depth + 1, out);

            let Some(alternate) = current.alternate.as_deref() else {
                self.close_block(depth, out);
                return;
            };

            out.push_str(&grammar.indent(depth));
            if braces {
                out.push_str("} ");
            }
            match alternate {
                Stmt::If(next) => {
                    keyword = control.else_if_keyword.as_str();
                    current = next;
                }
                other => {
                    out.push_str(&control.else_keyword);
                    out.push_str(grammar.block_open());
                    self.emit_body(body_of(other), depth + 1, out);
                    self.close_block(depth, out);
                    return;
                }
            }
        }
    }

    /// Test expression without its source parentheses; brace grammars get
    /// them back.
    fn condition(&self, test: &Expr) -> String {
        let inner = match test {
            Expr::Paren { expr, .. } => expr.span(),
            other => other.span(),
        };
        let text = self.verbatim(inner);
        if self.grammar.file.use_braces {
            format!("({text})")
        } else {
            text
        }
    }

    fn emit_for(&mut self, node: &For, depth: usize, out: &mut String) {
        let Some(range) = self.range_loop(node) else {
            self.unsupported(
                "for statement outside `for (let i = START; i OP END; STEP)`",
                node.span,
            );
            return;
        };
        let control = &self.grammar.control;
        let header = format!(
            "{} {} {} {}({}, {}, {})",
            control.for_keyword,
            range.name,
            control.in_keyword,
            control.range_function,
            range.start,
            range.end,
            range.step
        );
        self.emit_block(&header, body_of(&node.body), depth, out);
    }

    /// Decompose a canonical counting loop.
    fn range_loop(&self, node: &For) -> Option<RangeLoop> {
        let Some(Stmt::Var(decl)) = node.init.as_deref() else {
            return None;
        };
        let [declarator] = decl.declarators.as_slice() else {
            return None;
        };
        let name = declarator.name.clone()?;
        let start = self.verbatim(declarator.init.as_ref()?.span());

        let Expr::Binary {
            left, op, right, ..
        } = node.test.as_ref()?.unparen()
        else {
            return None;
        };
        if left.as_ident() != Some(name.as_str()) {
            return None;
        }
        let bound = self.verbatim(right.span());
        let end = match op.as_str() {
            "<" | ">" | "!=" | "!==" => bound,
            "<=" => offset(&bound, 1),
            ">=" => offset(&bound, -1),
            _ => return None,
        };

        let step = match node.update.as_ref()?.unparen() {
            Expr::Update { argument, op, .. } if argument.as_ident() == Some(name.as_str()) => {
                match op.as_str() {
                    "++" => "1".to_string(),
                    "--" => "-1".to_string(),
                    _ => return None,
                }
            }
            Expr::Assign {
                left, op, right, ..
            } if left.as_ident() == Some(name.as_str()) => {
                let amount = self.verbatim(right.span());
                match op.as_str() {
                    "+=" => amount,
                    "-=" => negate(&amount),
                    _ => return None,
                }
            }
            _ => return None,
        };

        Some(RangeLoop {
            name,
            start,
            end,
            step,
        })
    }

    fn emit_for_in(&mut self, node: &ForIn, depth: usize, out: &mut String) {
        let Some(name) = node.left.as_deref() else {
            self.unsupported("for-in loop with a destructuring binding", node.span);
            return;
        };
        let Some(iterable) = node.right.as_ident() else {
            self.unsupported("for-in loop over a non-identifier iterable", node.right.span());
            return;
        };
        let control = &self.grammar.control;
        let header = format!(
            "{} {name} {} {iterable}",
            control.for_keyword, control.in_keyword
        );
        self.emit_block(&header, body_of(&node.body), depth, out);
    }

    // ========================================================================
    // Expression statements
    // ========================================================================

    fn emit_expr_stmt(&mut self, expr: &Expr, span: Span, depth: usize, out: &mut String) {
        let terminator = self.grammar.terminator();
        match expr {
            Expr::Call { callee, args, span } => {
                if self.calls.lookup(callee) == Some(StdlibForm::ScopedResource) {
                    self.emit_scoped_resource(args, *span, depth, out);
                } else {
                    let call = self.render_call(callee, args, *span);
                    self.line(depth, &format!("{call}{terminator}"), out);
                }
            }

            Expr::Assign {
                left, op, right, ..
            } if matches!(right.unparen(), Expr::Template { .. }) => {
                let value = self.render_expr(right);
                let text = format!("{} {op} {value}{terminator}", self.text(left.span()));
                self.line(depth, &text, out);
            }

            Expr::Assign { .. } => {
                let text = self.without_new(expr);
                self.line(depth, &format!("{text}{terminator}"), out);
            }

            // Postfix form regardless of the source, so the token pass
            // sees `i++` and not `++i`.
            Expr::Update { argument, op, .. } => {
                let text = format!("{}{op}{terminator}", self.text(argument.span()));
                self.line(depth, &text, out);
            }

            Expr::Sequence { .. } => {
                let mut elements = Vec::new();
                flatten_sequence(expr, |element, _, _| elements.push(element));
                for element in elements {
                    self.emit_expr_stmt(element, element.span(), depth, out);
                }
            }

            Expr::Paren { expr: inner, .. } => self.emit_expr_stmt(inner, span, depth, out),

            _ => self.unsupported("expression statement", span),
        }
    }

    /// `withStatement(resource, binding, () => { ... })`.
    fn emit_scoped_resource(&mut self, args: &[Expr], span: Span, depth: usize, out: &mut String) {
        let [resource, binding, body, ..] = args else {
            self.missing(
                format!("withStatement expects 3 arguments, found {}", args.len()),
                span,
            );
            return;
        };
        let Expr::Function { body, .. } = body.unparen() else {
            self.missing(
                "withStatement body must be a function literal".into(),
                body.span(),
            );
            return;
        };

        let grammar = self.grammar;
        let resource = self.render_expr(resource);
        let header = format!(
            "{} {resource} {} {}",
            grammar.control.with_keyword,
            grammar.control.as_keyword,
            self.binding_name(binding)
        );
        match body {
            FunctionBody::Block { body } => self.emit_block(&header, body, depth, out),
            FunctionBody::Expr { expr } => {
                out.push_str(&self.grammar.indent(depth));
                out.push_str(&header);
                out.push_str(self.grammar.block_open());
                self.emit_expr_stmt(expr, expr.span(), depth + 1, out);
                self.close_block(depth, out);
            }
        }
    }

    /// A name given either as a string literal or as a bare identifier.
    fn binding_name(&self, expr: &Expr) -> String {
        let text = self.text(expr.span());
        match expr.unparen() {
            Expr::Literal {
                kind: LiteralKind::String,
                ..
            } => string_content(text).unwrap_or(text).to_string(),
            Expr::Ident { name, .. } => name.clone(),
            _ => text.to_string(),
        }
    }

    // ========================================================================
    // Expression rendering
    // ========================================================================

    /// Call text: verbatim unless an argument needs lowering.
    fn render_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> String {
        if !args.iter().any(|arg| self.needs_rewrite(arg)) {
            return self.verbatim(span);
        }
        let callee = self.verbatim(callee.span());
        let args = self.render_args(args);
        format!("{callee}({args})")
    }

    fn render_args(&mut self, args: &[Expr]) -> String {
        args.iter()
            .map(|arg| self.render_expr(arg))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn needs_rewrite(&self, expr: &Expr) -> bool {
        match expr.unparen() {
            Expr::Template { .. } => true,
            Expr::Call { callee, args, .. } => {
                self.calls.lookup(callee) == Some(StdlibForm::NamedArgument)
                    || args.iter().any(|arg| self.needs_rewrite(arg))
            }
            Expr::Sequence { exprs, .. } => exprs.iter().any(|e| self.needs_rewrite(e)),
            _ => false,
        }
    }

    /// Expression text with templates, named arguments and sequences lowered.
    fn render_expr(&mut self, expr: &Expr) -> String {
        match expr.unparen() {
            Expr::Template { span } => rewrite_template_literal(self.text(*span), self.grammar),
            Expr::Call { callee, args, span } => {
                if self.calls.lookup(callee) == Some(StdlibForm::NamedArgument) {
                    self.render_named_argument(args, *span)
                } else {
                    self.render_call(callee, args, *span)
                }
            }
            inner @ Expr::Sequence { .. } if self.needs_rewrite(inner) => {
                let mut elements = Vec::new();
                flatten_sequence(inner, |element, _, _| elements.push(element));
                elements
                    .into_iter()
                    .map(|element| self.render_expr(element))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
            _ => self.verbatim(expr.span()),
        }
    }

    /// `named("x", 1)` becomes `x=1`.
    fn render_named_argument(&mut self, args: &[Expr], span: Span) -> String {
        let [name, value] = args else {
            self.missing(
                format!("named expects 2 arguments, found {}", args.len()),
                span,
            );
            return self.verbatim(span);
        };
        let name = self.binding_name(name);
        let value = match value.unparen() {
            Expr::Literal {
                kind: LiteralKind::String,
                span,
            } => requote_string(self.text(*span), self.grammar),
            other => self.render_expr(other),
        };
        format!("{name}={value}")
    }
}

struct RangeLoop {
    name: String,
    start: String,
    end: String,
    step: String,
}

/// Statements governed by a control-flow body.
fn body_of(stmt: &Stmt) -> &[Stmt] {
    match stmt {
        Stmt::Block { body, .. } => body,
        other => std::slice::from_ref(other),
    }
}

/// `bound + delta`, folded when `bound` is an integer literal.
fn offset(bound: &str, delta: i64) -> String {
    match bound.trim().parse::<i64>() {
        Ok(n) => (n + delta).to_string(),
        Err(_) if delta >= 0 => format!("{bound} + {delta}"),
        Err(_) => format!("{bound} - {}", -delta),
    }
}

fn negate(amount: &str) -> String {
    let amount = amount.trim();
    if let Some(positive) = amount.strip_prefix('-') {
        positive.trim_start().to_string()
    } else if amount.parse::<f64>().is_ok() || amount.chars().all(is_ident_char) {
        format!("-{amount}")
    } else {
        format!("-({amount})")
    }
}

/// Spans of `new` keywords (with the whitespace after them) in `expr`.
fn new_keywords(expr: &Expr, source: &str, cuts: &mut Vec<Span>) {
    match expr {
        Expr::New { callee, args, span } => {
            let text = span.text(source);
            if let Some(rest) = text.strip_prefix("new") {
                let len = text.len() - rest.trim_start().len();
                cuts.push(Span::new(span.start, span.start + len));
            }
            new_keywords(callee, source, cuts);
            for arg in args {
                new_keywords(arg, source, cuts);
            }
        }
        Expr::Call { callee, args, .. } => {
            new_keywords(callee, source, cuts);
            for arg in args {
                new_keywords(arg, source, cuts);
            }
        }
        Expr::Assign { left, right, .. } | Expr::Binary { left, right, .. } => {
            new_keywords(left, source, cuts);
            new_keywords(right, source, cuts);
        }
        Expr::Sequence { exprs, .. } => {
            for expr in exprs {
                new_keywords(expr, source, cuts);
            }
        }
        Expr::Update { argument, .. } | Expr::Unary { argument, .. } => {
            new_keywords(argument, source, cuts);
        }
        Expr::Member { object, .. } => new_keywords(object, source, cuts),
        Expr::Paren { expr, .. } => new_keywords(expr, source, cuts),
        Expr::Ident { .. }
        | Expr::Literal { .. }
        | Expr::Template { .. }
        | Expr::Function { .. }
        | Expr::Array { .. }
        | Expr::Object { .. }
        | Expr::Other { .. } => {}
    }
}

#[cfg(all(test, feature = "read-typescript"))]
mod tests {
    use super::*;
    use crate::input::read_typescript;

    fn emit_with(code: &str, grammar: &Grammar) -> Emitted {
        let program = read_typescript(code).expect("parse failed");
        emit(&program, code, grammar)
    }

    fn python(code: &str) -> String {
        let emitted = emit_with(code, &Grammar::python());
        assert!(
            emitted.diagnostics.is_empty(),
            "unexpected diagnostics: {:?}",
            emitted.diagnostics
        );
        emitted.text
    }

    #[test]
    fn test_function_declaration() {
        assert_eq!(
            python("function add(a, b) { return a + b; }"),
            "def add(a, b):\n    return a + b\n"
        );
    }

    #[test]
    fn test_default_parameters_and_empty_body() {
        assert_eq!(
            python("function greet(name = \"you\", n = 1) {}"),
            "def greet(name=\"you\", n=1):\n    pass\n"
        );
    }

    #[test]
    fn test_unsupported_node_between_functions() {
        let emitted = emit_with(
            "function a() {}\ntry { x(); } catch (e) {}\nfunction b() {}",
            &Grammar::python(),
        );
        assert_eq!(emitted.text, "def a():\n    pass\ndef b():\n    pass\n");
        assert_eq!(emitted.diagnostics.len(), 1);
        assert_eq!(emitted.diagnostics[0].kind, DiagnosticKind::Unsupported);
    }

    #[test]
    fn test_syntax_error_reported_as_parse() {
        let emitted = emit_with("function ok() {}\nlet x = ;", &Grammar::python());
        assert!(emitted.text.starts_with("def ok():\n"));
        assert!(
            emitted
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::Parse)
        );
    }

    #[test]
    fn test_indentation_returns_to_entry_depth() {
        let code = "function outer() {\n  if (a) {\n    for (let i = 0; i < 3; i++) { g(i); }\n  }\n}\ndone();";
        assert_eq!(
            python(code),
            "def outer():\n    if a:\n        for i in range(0, 3, 1):\n            g(i)\ndone()\n"
        );
    }

    #[test]
    fn test_named_argument_flattening() {
        assert_eq!(
            python("target(named(\"x\", 1), named(\"y\", \"s\"));"),
            "target(x=1, y='s')\n"
        );
    }

    #[test]
    fn test_named_arguments_in_sequence() {
        assert_eq!(
            python("target((named(\"x\", 1), named(\"y\", 2)));"),
            "target(x=1, y=2)\n"
        );
    }

    #[test]
    fn test_plain_call_is_verbatim() {
        assert_eq!(python("obj.method(a, [1, 2], \"s\");"), "obj.method(a, [1, 2], \"s\")\n");
    }

    #[test]
    fn test_template_argument_rewritten() {
        assert_eq!(
            python("console.log(`Hello, ${name}!`);"),
            "console.log(f'Hello, {name}!')\n"
        );
    }

    #[test]
    fn test_numeric_for_loops() {
        assert_eq!(
            python("for (let i = 0; i < 10; i++) { f(i); }"),
            "for i in range(0, 10, 1):\n    f(i)\n"
        );
        assert_eq!(
            python("for (let i = 5; i > 0; i--) { f(i); }"),
            "for i in range(5, 0, -1):\n    f(i)\n"
        );
        assert_eq!(
            python("for (let i = 0; i <= 10; i += 2) { f(i); }"),
            "for i in range(0, 11, 2):\n    f(i)\n"
        );
    }

    #[test]
    fn test_unsupported_for_shape() {
        let emitted = emit_with("for (;;) { f(); }", &Grammar::python());
        assert_eq!(emitted.text, "");
        assert_eq!(emitted.diagnostics[0].kind, DiagnosticKind::Unsupported);
    }

    #[test]
    fn test_for_in_and_for_of() {
        assert_eq!(
            python("for (const k in table) { use(k); }"),
            "for k in table:\n    use(k)\n"
        );
        assert_eq!(
            python("for (const item of items) { use(item); }"),
            "for item in items:\n    use(item)\n"
        );
    }

    #[test]
    fn test_scoped_resource() {
        assert_eq!(
            python("withStatement(open(\"f.txt\"), \"fh\", () => { use(fh); });"),
            "with open(\"f.txt\") as fh:\n    use(fh)\n"
        );
    }

    #[test]
    fn test_qualified_scoped_resource() {
        assert_eq!(
            python("py.withStatement(lock, \"held\", () => { work(held); });"),
            "with lock as held:\n    work(held)\n"
        );
    }

    #[test]
    fn test_scoped_resource_without_function_body() {
        let emitted = emit_with("withStatement(res, \"r\", handler);", &Grammar::python());
        assert_eq!(emitted.text, "");
        assert_eq!(
            emitted.diagnostics[0].kind,
            DiagnosticKind::MissingStructure
        );
    }

    #[test]
    fn test_class_emission_order() {
        let code = "class A extends B {\n  x = 1;\n  greet(name) { console.log(name); }\n  constructor(a) { this.a = a; }\n  bye() { return 1; }\n}";
        let emitted = emit_with(code, &Grammar::python());
        assert_eq!(
            emitted.text,
            "class A(B):\n    def __init__(self, a):\n        this.a = a\n    def greet(self, name):\n        console.log(name)\n    def bye(self):\n        return 1\n"
        );
        assert_eq!(emitted.diagnostics.len(), 1);
        assert!(emitted.diagnostics[0].message.contains("`x`"));
    }

    #[test]
    fn test_class_without_constructor() {
        assert_eq!(
            python("class Empty {}"),
            "class Empty:\n    pass\n"
        );
        assert_eq!(
            python("class C { run() {} }"),
            "class C:\n    def run(self):\n        pass\n"
        );
    }

    #[test]
    fn test_if_elif_else() {
        assert_eq!(
            python("if (a) { f(); } else if (b) { g(); } else { h(); }"),
            "if a:\n    f()\nelif b:\n    g()\nelse:\n    h()\n"
        );
    }

    #[test]
    fn test_variable_initializers() {
        assert_eq!(python("let x = 5;"), "x = 5\n");
        assert_eq!(python("const s = `hi ${n}`;"), "s = f'hi {n}'\n");
        assert_eq!(python("let p = new Point(1, 2);"), "p = Point(1, 2)\n");
        assert_eq!(python("let n = -1;"), "n = -1\n");
        assert_eq!(python("let y;"), "y = undefined\n");
        assert_eq!(python("const xs = [1, 2];"), "xs = [1, 2]\n");
    }

    #[test]
    fn test_extra_declarators_diagnosed() {
        let emitted = emit_with("let a = 1, b = 2;", &Grammar::python());
        assert_eq!(emitted.text, "a = 1\n");
        assert_eq!(emitted.diagnostics.len(), 1);
        assert!(emitted.diagnostics[0].message.contains("`b`"));
    }

    #[test]
    fn test_arrow_function_initializer() {
        assert_eq!(
            python("const sq = (x) => x * x;"),
            "def sq(x):\n    return x * x\n"
        );
        assert_eq!(
            python("const hi = () => { greet(); };"),
            "def hi():\n    greet()\n"
        );
    }

    #[test]
    fn test_assignment_drops_new() {
        assert_eq!(python("p = new Point(1, 2);"), "p = Point(1, 2)\n");
        assert_eq!(python("renewal = 1;"), "renewal = 1\n");
    }

    #[test]
    fn test_update_statements_are_postfix() {
        assert_eq!(python("i++;"), "i++\n");
        assert_eq!(python("--j;"), "j--\n");
    }

    #[test]
    fn test_while_break_continue() {
        assert_eq!(
            python("while (n > 0) { if (skip) { continue; } n--; break; }"),
            "while n > 0:\n    if skip:\n        continue\n    n--\n    break\n"
        );
    }

    #[test]
    fn test_import_forms() {
        assert_eq!(
            python("import { a, b as c } from \"./mod\";"),
            "from mod import a, b as c\n"
        );
        assert_eq!(
            python("import * as u from \"./lib/util.js\";"),
            "import lib.util as u\n"
        );
        assert_eq!(python("import py from \"pylib\";"), "");
        assert_eq!(python("import random from \"pylib/random\";"), "import random\n");
        assert_eq!(python("import \"./side\";"), "import side\n");
    }

    #[test]
    fn test_export_and_type_declarations() {
        assert_eq!(
            python("export function f() { return 1; }"),
            "def f():\n    return 1\n"
        );
        assert_eq!(python("// note\ninterface P { x: number }"), "");
    }

    #[test]
    fn test_brace_grammar() {
        let grammar = Grammar::from_json(
            r#"{ "functionKeyword": "function", "variableKeyword": "let", "file": { "useBraces": true, "useSemicolons": true, "indent": "  " } }"#,
        )
        .unwrap();
        let emitted = emit_with(
            "function f(a) { if (a) { return 1; } else { x = 2; } let y = 3; }",
            &grammar,
        );
        assert_eq!(
            emitted.text,
            "function f(a) {\n  if (a) {\n    return 1;\n  } else {\n    x = 2;\n  }\n  let y = 3;\n}\n"
        );
    }

    #[test]
    fn test_nested_new_dropped_in_assignments() {
        assert_eq!(
            python("x = new Foo(new Bar(), renew(news));"),
            "x = Foo(Bar(), renew(news))\n"
        );
        assert_eq!(python("let p = new A(new B());"), "p = A(B())\n");
        assert_eq!(python("let d = new Date;"), "d = Date()\n");
    }

    #[test]
    fn test_new_inside_strings_is_kept() {
        assert_eq!(
            python("function f() { return \"brand new car\"; }"),
            "def f():\n    return \"brand new car\"\n"
        );
        assert_eq!(
            python("console.log(\"a new user\");"),
            "console.log(\"a new user\")\n"
        );
        assert_eq!(
            python("if (s == \"new york\") { g(); }"),
            "if s == \"new york\":\n    g()\n"
        );
        assert_eq!(
            python("label = make(\"new \", new Point(1, 2));"),
            "label = make(\"new \", Point(1, 2))\n"
        );
    }

    #[test]
    fn test_grammar_can_keep_new() {
        let grammar = Grammar::from_json(r#"{ "class": { "callWithNewKeyword": true } }"#).unwrap();
        let emitted = emit_with("p = new Point(\"new\");", &grammar);
        assert_eq!(emitted.text, "p = new Point(\"new\")\n");
    }

    #[test]
    fn test_negate_and_offset() {
        assert_eq!(negate("2"), "-2");
        assert_eq!(negate("-2"), "2");
        assert_eq!(negate("step"), "-step");
        assert_eq!(negate("a + b"), "-(a + b)");
        assert_eq!(offset("10", 1), "11");
        assert_eq!(offset("n", 1), "n + 1");
        assert_eq!(offset("n", -1), "n - 1");
    }
}
