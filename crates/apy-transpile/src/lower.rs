//! Small rewrites the emitter applies to specific expression shapes.

use crate::grammar::Grammar;
use crate::ir::Expr;

/// Visit each logical element of an expression that may be a comma
/// sequence.
///
/// `visit` receives `(element, index, total)` with a 1-based index. Anything
/// other than a sequence (a bare call, typically) is a single element
/// visited as `(expr, 1, 1)`. Parentheses around the sequence are ignored.
pub fn flatten_sequence<'e, F>(expr: &'e Expr, mut visit: F)
where
    F: FnMut(&'e Expr, usize, usize),
{
    match expr.unparen() {
        Expr::Sequence { exprs, .. } => {
            let total = exprs.len();
            for (i, element) in exprs.iter().enumerate() {
                visit(element, i + 1, total);
            }
        }
        single => visit(single, 1, 1),
    }
}

/// Re-delimit a template literal for the target grammar.
///
/// The backticks are replaced by `templateLiteral.start`/`end` and every
/// `${ ... }` by `interpolationStart ... interpolationEnd`. This is a
/// character scan, not a parse: braces inside strings within an
/// interpolation, or templates nested in one, are not understood.
pub fn rewrite_template_literal(raw: &str, grammar: &Grammar) -> String {
    let t = &grammar.template_literal;
    let inner = raw
        .strip_prefix('`')
        .and_then(|s| s.strip_suffix('`'))
        .unwrap_or(raw);

    let end_quote = single_char(&t.end);
    let brace_interpolation = t.interpolation_start == "{";

    let mut out = String::with_capacity(inner.len() + t.start.len() + t.end.len());
    out.push_str(&t.start);

    let mut chars = inner.chars().peekable();
    let mut depth = 0usize;
    while let Some(c) = chars.next() {
        if depth > 0 {
            match c {
                '{' => {
                    depth += 1;
                    out.push(c);
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        out.push_str(&t.interpolation_end);
                    } else {
                        out.push(c);
                    }
                }
                _ => out.push(c),
            }
            continue;
        }

        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push_str(&t.interpolation_start);
                depth = 1;
            }
            // Literal braces would read as interpolation markers
            '{' | '}' if brace_interpolation => {
                out.push(c);
                out.push(c);
            }
            _ if Some(c) == end_quote => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out.push_str(&t.end);
    out
}

/// Re-quote a simple string literal with the grammar's preferred quote.
///
/// Literals whose content contains the target quote are returned as-is.
pub fn requote_string(raw: &str, grammar: &Grammar) -> String {
    let quote = grammar.file.string_quote.as_str();
    match string_content(raw) {
        Some(inner) if !quote.is_empty() && !inner.contains(quote) => {
            format!("{quote}{inner}{quote}")
        }
        _ => raw.to_string(),
    }
}

/// Content of a simple quoted string literal.
pub fn string_content(raw: &str) -> Option<&str> {
    if raw.len() < 2 {
        return None;
    }
    ['"', '\'']
        .into_iter()
        .find_map(|q| raw.strip_prefix(q).and_then(|s| s.strip_suffix(q)))
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
