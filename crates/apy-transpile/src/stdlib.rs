//! Recognition of standard-library shim calls.
//!
//! The shim module only exists so source code type-checks; its functions
//! are never executed. Calls to them are recognized purely by name and
//! lowered into target constructs by the emitter.

use crate::grammar::Grammar;
use crate::ir::Expr;
use crate::replace::is_ident_char;

/// A call form the emitter treats as syntax rather than as a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdlibForm {
    /// `withStatement(resource, binding, () => { ... })`
    ScopedResource,
    /// `named(name, value)` inside an argument list
    NamedArgument,
}

/// Shim function names and the form each lowers to.
const REGISTRY: &[(&str, StdlibForm)] = &[
    ("withStatement", StdlibForm::ScopedResource),
    ("named", StdlibForm::NamedArgument),
];

/// Name lookup over the registry, honoring the grammar's shim qualifiers.
#[derive(Debug, Clone)]
pub struct CallTable<'g> {
    qualifiers: Vec<&'g str>,
}

impl<'g> CallTable<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            qualifiers: grammar.file.stdlib.qualifiers(),
        }
    }

    /// Form for a bare shim function name.
    pub fn lookup_name(name: &str) -> Option<StdlibForm> {
        REGISTRY
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, form)| *form)
    }

    /// Form for a callee, either `name` or `alias.name`.
    pub fn lookup(&self, callee: &Expr) -> Option<StdlibForm> {
        match callee.unparen() {
            Expr::Ident { name, .. } => Self::lookup_name(name),
            Expr::Member {
                object, property, ..
            } => {
                let qualifier = object.as_ident()?;
                if self.qualifiers.iter().any(|q| *q == qualifier) {
                    Self::lookup_name(property)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Whether an import specifier names the shim module itself.
pub fn is_shim_module(specifier: &str, grammar: &Grammar) -> bool {
    let shim = grammar.file.stdlib.import_path.as_str();
    !shim.is_empty()
        && (specifier == shim
            || specifier
                .rsplit('/')
                .next()
                .is_some_and(|last| last == shim && specifier.starts_with('.')))
}

/// Target module behind a shim submodule (`pylib/random` → `random`).
pub fn shim_submodule<'s>(specifier: &'s str, grammar: &Grammar) -> Option<&'s str> {
    let shim = grammar.file.stdlib.import_path.as_str();
    if shim.is_empty() {
        return None;
    }
    specifier
        .strip_prefix(shim)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|rest| !rest.is_empty())
}

/// Remove shim qualifiers from unit text: `py.withStatement(...)` becomes
/// `withStatement(...)`.
///
/// A qualifier only matches as a whole identifier that is not itself a
/// property (`numpy.x` and `a.py.x` are left alone) and that is followed
/// by a member name.
pub fn strip_qualifiers(text: &str, aliases: &[impl AsRef<str>]) -> String {
    let mut out = text.to_string();
    for alias in aliases.iter().map(AsRef::as_ref).filter(|a| !a.is_empty()) {
        out = strip_qualifier(&out, alias);
    }
    out
}

fn strip_qualifier(text: &str, alias: &str) -> String {
    let pattern = format!("{alias}.");
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut prev: Option<char> = None;

    while let Some(pos) = rest.find(&pattern) {
        let before = rest[..pos].chars().next_back().or(prev);
        let after = rest[pos + pattern.len()..].chars().next();
        let standalone = before.is_none_or(|c| !is_ident_char(c) && c != '.');
        let qualifies = after.is_some_and(|c| is_ident_char(c) && !c.is_ascii_digit());

        out.push_str(&rest[..pos]);
        if !(standalone && qualifies) {
            out.push_str(&pattern);
        }
        // The consumed pattern always ends in '.'
        prev = Some('.');
        rest = &rest[pos + pattern.len()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Span;

    fn ident(name: &str) -> Expr {
        Expr::Ident {
            name: name.into(),
            span: Span::default(),
        }
    }

    #[test]
    fn test_lookup_bare_name() {
        let grammar = Grammar::python();
        let table = CallTable::new(&grammar);
        assert_eq!(
            table.lookup(&ident("withStatement")),
            Some(StdlibForm::ScopedResource)
        );
        assert_eq!(table.lookup(&ident("named")), Some(StdlibForm::NamedArgument));
        assert_eq!(table.lookup(&ident("print")), None);
    }

    #[test]
    fn test_lookup_qualified_name() {
        let grammar = Grammar::python();
        let table = CallTable::new(&grammar);
        let qualified = Expr::Member {
            object: Box::new(ident("py")),
            property: "withStatement".into(),
            span: Span::default(),
        };
        assert_eq!(table.lookup(&qualified), Some(StdlibForm::ScopedResource));

        let foreign = Expr::Member {
            object: Box::new(ident("other")),
            property: "withStatement".into(),
            span: Span::default(),
        };
        assert_eq!(table.lookup(&foreign), None);
    }

    #[test]
    fn test_import_name_is_a_qualifier() {
        let grammar = Grammar::from_json(
            r#"{ "file": { "stdlib": { "importName": "lib", "recognizedAliases": [] } } }"#,
        )
        .unwrap();
        assert_eq!(grammar.file.stdlib.qualifiers(), vec!["lib"]);

        let table = CallTable::new(&grammar);
        let qualified = Expr::Member {
            object: Box::new(ident("lib")),
            property: "named".into(),
            span: Span::default(),
        };
        assert_eq!(table.lookup(&qualified), Some(StdlibForm::NamedArgument));
    }

    #[test]
    fn test_qualifiers_skip_duplicates() {
        let grammar = Grammar::python();
        assert_eq!(grammar.file.stdlib.qualifiers(), vec!["py", "pylib"]);
    }

    #[test]
    fn test_strip_qualifiers() {
        let aliases = vec!["py".to_string(), "pylib".to_string()];
        assert_eq!(
            strip_qualifiers("py.withStatement(a, b, f);", &aliases),
            "withStatement(a, b, f);"
        );
        assert_eq!(
            strip_qualifiers("pylib.named(\"x\", 1)", &aliases),
            "named(\"x\", 1)"
        );
    }

    #[test]
    fn test_strip_qualifiers_respects_boundaries() {
        let aliases = vec!["py".to_string()];
        assert_eq!(strip_qualifiers("numpy.array(x)", &aliases), "numpy.array(x)");
        assert_eq!(strip_qualifiers("a.py.b", &aliases), "a.py.b");
        assert_eq!(strip_qualifiers("\"x.py.\"", &aliases), "\"x.py.\"");
        assert_eq!(
            strip_qualifiers("f(py.a, py.b)", &aliases),
            "f(a, b)"
        );
    }

    #[test]
    fn test_shim_module_detection() {
        let grammar = Grammar::python();
        assert!(is_shim_module("pylib", &grammar));
        assert!(is_shim_module("../pylib", &grammar));
        assert!(!is_shim_module("pylib/random", &grammar));
        assert!(!is_shim_module("./gradio", &grammar));
        assert_eq!(shim_submodule("pylib/random", &grammar), Some("random"));
        assert_eq!(shim_submodule("pylib", &grammar), None);
        assert_eq!(shim_submodule("pylibx/random", &grammar), None);
    }
}
