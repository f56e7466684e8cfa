//! Target-language grammar description.
//!
//! A [`Grammar`] tells the emitter how to spell the target language:
//! keywords, block style, statement terminators, literal delimiters, the
//! standard-library shim it should recognize, and the token replacements
//! applied after emission. Every field has a default matching Python, so a
//! config only needs to name what differs.
//!
//! ```json
//! {
//!   "functionKeyword": "func",
//!   "file": { "extension": "gd" }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Errors raised while building a [`Grammar`] from configuration.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("templateLiteral is partially specified (missing {})", missing.join(", "))]
    PartialTemplateLiteral { missing: Vec<&'static str> },

    #[error("invalid grammar: {0}")]
    Json(#[from] serde_json::Error),
}

/// Target-language syntax, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GrammarSpec", rename_all = "camelCase")]
pub struct Grammar {
    pub function_keyword: String,
    /// Keyword introducing a variable declaration, if the target has one.
    pub variable_keyword: Option<String>,
    pub class: ClassSyntax,
    pub template_literal: TemplateLiteral,
    pub control: ControlKeywords,
    pub file: FileSyntax,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSyntax {
    pub keyword: String,
    pub constructor_name: String,
    /// Prepend the receiver (`self`) to constructor and method parameters.
    pub prefix_self: bool,
    /// Prepend the function keyword to method headers.
    pub prefix_method_keyword: bool,
    /// Prepend the function keyword to the constructor header.
    pub constructor_is_function: bool,
    /// Keep `new` when constructing instances.
    pub call_with_new_keyword: bool,
    pub receiver_name: String,
    /// `class A(B)` rather than `class A extends B`.
    pub inherit_with_parens: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLiteral {
    pub start: String,
    pub end: String,
    pub interpolation_start: String,
    pub interpolation_end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlKeywords {
    pub if_keyword: String,
    pub else_keyword: String,
    /// Fused `else` + `if` token (`elif`, `else if`).
    pub else_if_keyword: String,
    pub for_keyword: String,
    pub in_keyword: String,
    pub range_function: String,
    pub while_keyword: String,
    pub with_keyword: String,
    pub as_keyword: String,
    pub break_keyword: String,
    pub continue_keyword: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSyntax {
    pub extension: String,
    pub use_semicolons: bool,
    pub use_braces: bool,
    /// One level of indentation.
    pub indent: String,
    /// Placeholder statement for empty indent-style bodies.
    pub empty_block: String,
    /// Quote used when a string literal is regenerated.
    pub string_quote: String,
    /// Replaces `/` in emitted module paths.
    pub module_path_separator: String,
    pub stdlib: StdlibSyntax,
    /// Ordered whole-text substitutions applied after emission.
    pub token_replacements: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StdlibSyntax {
    /// Default-import name of the shim (`import py from "pylib"`); always
    /// recognized as a qualifier.
    pub import_name: String,
    /// Module specifier of the shim; imports of it are dropped.
    pub import_path: String,
    /// Qualifiers stripped from shim calls (`py.withStatement` → `withStatement`).
    pub recognized_aliases: Vec<String>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::python()
    }
}

impl Grammar {
    /// The reference target: Python 3.
    pub fn python() -> Self {
        Self {
            function_keyword: "def".into(),
            variable_keyword: None,
            class: ClassSyntax::default(),
            template_literal: TemplateLiteral::default(),
            control: ControlKeywords::default(),
            file: FileSyntax::default(),
        }
    }

    /// Parse a grammar from JSON, applying per-field defaults.
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let spec: GrammarSpec = serde_json::from_str(json)?;
        Self::try_from(spec)
    }

    /// Leading whitespace for `depth` levels of nesting.
    pub fn indent(&self, depth: usize) -> String {
        self.file.indent.repeat(depth)
    }

    /// Text closing a block header line.
    pub fn block_open(&self) -> &'static str {
        if self.file.use_braces { " {\n" } else { ":\n" }
    }

    /// Statement terminator.
    pub fn terminator(&self) -> &'static str {
        if self.file.use_semicolons { ";" } else { "" }
    }
}

impl Default for ClassSyntax {
    fn default() -> Self {
        Self {
            keyword: "class".into(),
            constructor_name: "__init__".into(),
            prefix_self: true,
            prefix_method_keyword: true,
            constructor_is_function: true,
            call_with_new_keyword: false,
            receiver_name: "self".into(),
            inherit_with_parens: true,
        }
    }
}

impl Default for TemplateLiteral {
    fn default() -> Self {
        Self {
            start: "f'".into(),
            end: "'".into(),
            interpolation_start: "{".into(),
            interpolation_end: "}".into(),
        }
    }
}

impl Default for ControlKeywords {
    fn default() -> Self {
        Self {
            if_keyword: "if".into(),
            else_keyword: "else".into(),
            else_if_keyword: "elif".into(),
            for_keyword: "for".into(),
            in_keyword: "in".into(),
            range_function: "range".into(),
            while_keyword: "while".into(),
            with_keyword: "with".into(),
            as_keyword: "as".into(),
            break_keyword: "break".into(),
            continue_keyword: "continue".into(),
        }
    }
}

impl Default for FileSyntax {
    fn default() -> Self {
        Self {
            extension: "py".into(),
            use_semicolons: false,
            use_braces: false,
            indent: "    ".into(),
            empty_block: "pass".into(),
            string_quote: "'".into(),
            module_path_separator: ".".into(),
            stdlib: StdlibSyntax::default(),
            token_replacements: default_token_replacements(),
        }
    }
}

impl StdlibSyntax {
    /// Qualifiers that mark a shim call: the import name, then the
    /// recognized aliases, without empty or repeated entries.
    pub fn qualifiers(&self) -> Vec<&str> {
        let mut qualifiers: Vec<&str> = Vec::new();
        for name in std::iter::once(&self.import_name).chain(&self.recognized_aliases) {
            if !name.is_empty() && !qualifiers.contains(&name.as_str()) {
                qualifiers.push(name);
            }
        }
        qualifiers
    }
}

impl Default for StdlibSyntax {
    fn default() -> Self {
        Self {
            import_name: "py".into(),
            import_path: "pylib".into(),
            recognized_aliases: vec!["py".into(), "pylib".into()],
        }
    }
}

/// Python spellings of the source language's reserved tokens.
pub fn default_token_replacements() -> IndexMap<String, String> {
    [
        ("true", "True"),
        ("false", "False"),
        ("console.log", "print"),
        ("this", "self"),
        ("null", "None"),
        ("undefined", "None"),
        ("!==", "!="),
        ("===", "=="),
        ("&&", "and"),
        ("||", "or"),
        ("++", " += 1"),
        ("--", " -= 1"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

// ============================================================================
// Deserialization shape: every field optional, defaults applied per field
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GrammarSpec {
    function_keyword: Option<String>,
    variable_keyword: Option<String>,
    class: ClassSpec,
    template_literal: Option<TemplateLiteralSpec>,
    control: ControlSpec,
    file: FileSpec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ClassSpec {
    keyword: Option<String>,
    constructor_name: Option<String>,
    #[serde(alias = "doPrefixWithSelf")]
    prefix_self: Option<bool>,
    #[serde(alias = "doPrefixMethods")]
    prefix_method_keyword: Option<bool>,
    #[serde(alias = "constructorIsAFunction")]
    constructor_is_function: Option<bool>,
    call_with_new_keyword: Option<bool>,
    receiver_name: Option<String>,
    inherit_with_parens: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TemplateLiteralSpec {
    start: Option<String>,
    end: Option<String>,
    interpolation_start: Option<String>,
    interpolation_end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ControlSpec {
    if_keyword: Option<String>,
    else_keyword: Option<String>,
    else_if_keyword: Option<String>,
    for_keyword: Option<String>,
    in_keyword: Option<String>,
    range_function: Option<String>,
    while_keyword: Option<String>,
    with_keyword: Option<String>,
    as_keyword: Option<String>,
    break_keyword: Option<String>,
    continue_keyword: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FileSpec {
    extension: Option<String>,
    use_semicolons: Option<bool>,
    use_braces: Option<bool>,
    indent: Option<String>,
    empty_block: Option<String>,
    string_quote: Option<String>,
    module_path_separator: Option<String>,
    stdlib: StdlibSpec,
    token_replacements: Option<IndexMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StdlibSpec {
    import_name: Option<String>,
    import_path: Option<String>,
    recognized_aliases: Option<Vec<String>>,
}

impl TryFrom<GrammarSpec> for Grammar {
    type Error = GrammarError;

    fn try_from(spec: GrammarSpec) -> Result<Self, Self::Error> {
        let defaults = Grammar::python();

        let template_literal = match spec.template_literal {
            None => defaults.template_literal,
            Some(t) => t.build()?,
        };

        let class = {
            let d = defaults.class;
            let c = spec.class;
            ClassSyntax {
                keyword: c.keyword.unwrap_or(d.keyword),
                constructor_name: c.constructor_name.unwrap_or(d.constructor_name),
                prefix_self: c.prefix_self.unwrap_or(d.prefix_self),
                prefix_method_keyword: c.prefix_method_keyword.unwrap_or(d.prefix_method_keyword),
                constructor_is_function: c
                    .constructor_is_function
                    .unwrap_or(d.constructor_is_function),
                call_with_new_keyword: c.call_with_new_keyword.unwrap_or(d.call_with_new_keyword),
                receiver_name: c.receiver_name.unwrap_or(d.receiver_name),
                inherit_with_parens: c.inherit_with_parens.unwrap_or(d.inherit_with_parens),
            }
        };

        let control = {
            let d = defaults.control;
            let c = spec.control;
            ControlKeywords {
                if_keyword: c.if_keyword.unwrap_or(d.if_keyword),
                else_keyword: c.else_keyword.unwrap_or(d.else_keyword),
                else_if_keyword: c.else_if_keyword.unwrap_or(d.else_if_keyword),
                for_keyword: c.for_keyword.unwrap_or(d.for_keyword),
                in_keyword: c.in_keyword.unwrap_or(d.in_keyword),
                range_function: c.range_function.unwrap_or(d.range_function),
                while_keyword: c.while_keyword.unwrap_or(d.while_keyword),
                with_keyword: c.with_keyword.unwrap_or(d.with_keyword),
                as_keyword: c.as_keyword.unwrap_or(d.as_keyword),
                break_keyword: c.break_keyword.unwrap_or(d.break_keyword),
                continue_keyword: c.continue_keyword.unwrap_or(d.continue_keyword),
            }
        };

        let file = {
            let d = defaults.file;
            let f = spec.file;
            let s = f.stdlib;
            FileSyntax {
                extension: f.extension.unwrap_or(d.extension),
                use_semicolons: f.use_semicolons.unwrap_or(d.use_semicolons),
                use_braces: f.use_braces.unwrap_or(d.use_braces),
                indent: f.indent.unwrap_or(d.indent),
                empty_block: f.empty_block.unwrap_or(d.empty_block),
                string_quote: f.string_quote.unwrap_or(d.string_quote),
                module_path_separator: f.module_path_separator.unwrap_or(d.module_path_separator),
                stdlib: StdlibSyntax {
                    import_name: s.import_name.unwrap_or(d.stdlib.import_name),
                    import_path: s.import_path.unwrap_or(d.stdlib.import_path),
                    recognized_aliases: s
                        .recognized_aliases
                        .unwrap_or(d.stdlib.recognized_aliases),
                },
                token_replacements: f.token_replacements.unwrap_or(d.token_replacements),
            }
        };

        Ok(Grammar {
            function_keyword: spec.function_keyword.unwrap_or(defaults.function_keyword),
            variable_keyword: spec.variable_keyword.filter(|k| !k.is_empty()),
            class,
            template_literal,
            control,
            file,
        })
    }
}

impl TemplateLiteralSpec {
    /// All four delimiters are required once the object is present.
    fn build(self) -> Result<TemplateLiteral, GrammarError> {
        match (
            self.start,
            self.end,
            self.interpolation_start,
            self.interpolation_end,
        ) {
            (Some(start), Some(end), Some(interpolation_start), Some(interpolation_end)) => {
                Ok(TemplateLiteral {
                    start,
                    end,
                    interpolation_start,
                    interpolation_end,
                })
            }
            (start, end, interpolation_start, interpolation_end) => {
                let missing = [
                    ("start", start.is_none()),
                    ("end", end.is_none()),
                    ("interpolationStart", interpolation_start.is_none()),
                    ("interpolationEnd", interpolation_end.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(GrammarError::PartialTemplateLiteral { missing })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_python() {
        let grammar = Grammar::from_json("{}").unwrap();
        assert_eq!(grammar, Grammar::python());
        assert_eq!(grammar.file.extension, "py");
        assert!(grammar.variable_keyword.is_none());
    }

    #[test]
    fn test_fields_default_independently() {
        let grammar = Grammar::from_json(
            r#"{ "functionKeyword": "func", "class": { "constructorName": "_init" } }"#,
        )
        .unwrap();
        assert_eq!(grammar.function_keyword, "func");
        assert_eq!(grammar.class.constructor_name, "_init");
        assert_eq!(grammar.class.keyword, "class");
        assert!(grammar.class.prefix_self);
        assert_eq!(grammar.file.extension, "py");
    }

    #[test]
    fn test_legacy_class_flag_names() {
        let grammar = Grammar::from_json(
            r#"{ "class": { "doPrefixWithSelf": false, "doPrefixMethods": false, "constructorIsAFunction": false } }"#,
        )
        .unwrap();
        assert!(!grammar.class.prefix_self);
        assert!(!grammar.class.prefix_method_keyword);
        assert!(!grammar.class.constructor_is_function);
    }

    #[test]
    fn test_partial_template_literal_rejected() {
        let err = Grammar::from_json(r#"{ "templateLiteral": { "start": "`" } }"#).unwrap_err();
        match err {
            GrammarError::PartialTemplateLiteral { missing } => {
                assert_eq!(missing, vec!["end", "interpolationStart", "interpolationEnd"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_complete_template_literal_accepted() {
        let grammar = Grammar::from_json(
            r##"{ "templateLiteral": { "start": "\"", "end": "\"", "interpolationStart": "#{", "interpolationEnd": "}" } }"##,
        )
        .unwrap();
        assert_eq!(grammar.template_literal.interpolation_start, "#{");
    }

    #[test]
    fn test_token_replacements_keep_order() {
        let grammar = Grammar::from_json(
            r#"{ "file": { "tokenReplacements": { "zeta": "z", "alpha": "a" } } }"#,
        )
        .unwrap();
        let keys: Vec<&str> = grammar
            .file
            .token_replacements
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_empty_variable_keyword_is_none() {
        let grammar = Grammar::from_json(r#"{ "variableKeyword": "" }"#).unwrap();
        assert!(grammar.variable_keyword.is_none());
    }

    #[test]
    fn test_serialized_grammar_reloads() {
        let grammar = Grammar::python();
        let json = serde_json::to_string(&grammar).unwrap();
        assert!(json.contains("\"functionKeyword\":\"def\""));
        assert_eq!(Grammar::from_json(&json).unwrap(), grammar);
    }

    #[test]
    fn test_block_style_helpers() {
        let braces = Grammar::from_json(r#"{ "file": { "useBraces": true, "useSemicolons": true } }"#)
            .unwrap();
        assert_eq!(braces.block_open(), " {\n");
        assert_eq!(braces.terminator(), ";");
        assert_eq!(Grammar::python().block_open(), ":\n");
        assert_eq!(Grammar::python().indent(2), "        ");
    }
}
