//! Tree-sitter based TypeScript reader.
//!
//! Two entry points share one parser setup:
//! - [`erase_types`] removes TypeScript-only syntax (annotations, type
//!   arguments, interfaces, `as` casts, ...) so the remaining text is plain
//!   ECMAScript that verbatim span copies can rely on.
//! - [`read_typescript`] turns that text into the span-carrying IR.

use crate::ir::*;
use crate::traits::{ReadError, Reader};
use std::ops::Range;
use tree_sitter::{Node, Parser, Tree};

/// Static instance of the TypeScript reader.
pub static TYPESCRIPT_READER: TypeScriptReader = TypeScriptReader;

/// TypeScript reader using tree-sitter.
pub struct TypeScriptReader;

impl Reader for TypeScriptReader {
    fn language(&self) -> &'static str {
        "typescript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx", "mts", "js", "jsx", "mjs"]
    }

    fn erase_types(&self, source: &str) -> Result<String, ReadError> {
        erase_types(source)
    }

    fn read(&self, source: &str) -> Result<Program, ReadError> {
        read_typescript(source)
    }
}

fn parse(source: &str) -> Result<Tree, ReadError> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_typescript::language().into())
        .map_err(|err| ReadError::Parse(err.to_string()))?;

    parser
        .parse(source, None)
        .ok_or_else(|| ReadError::Parse("failed to parse".into()))
}

/// Parse TypeScript source into the IR.
///
/// Syntax errors do not fail the read: `ERROR` nodes surface as
/// [`Stmt::Unsupported`] so the emitter can report them and continue.
pub fn read_typescript(source: &str) -> Result<Program, ReadError> {
    let tree = parse(source)?;
    if tree.root_node().has_error() {
        tracing::debug!("source contains syntax errors; affected statements will be skipped");
    }
    let ctx = ReadContext::new(source);
    Ok(ctx.read_program(&tree))
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token)
}

fn span(node: Node) -> Span {
    node.byte_range().into()
}

fn is_compound(kind: &str) -> bool {
    matches!(
        kind,
        "statement_block"
            | "function_declaration"
            | "generator_function_declaration"
            | "class_declaration"
            | "abstract_class_declaration"
            | "if_statement"
            | "else_clause"
            | "for_statement"
            | "for_in_statement"
            | "while_statement"
            | "export_statement"
    )
}

struct ReadContext<'a> {
    source: &'a str,
}

impl<'a> ReadContext<'a> {
    fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn node_text(&self, node: Node) -> &'a str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    fn unsupported(&self, node: Node) -> Stmt {
        Stmt::Unsupported {
            kind: node.kind().to_string(),
            span: span(node),
        }
    }

    fn read_program(&self, tree: &Tree) -> Program {
        let root = tree.root_node();
        Program::new(self.read_stmts(root))
    }

    fn read_stmts(&self, node: Node) -> Vec<Stmt> {
        named_children(node)
            .into_iter()
            .map(|child| self.read_stmt(child))
            .collect()
    }

    /// Statements of a body, which may be a block or a single statement.
    fn read_body(&self, node: Node) -> Vec<Stmt> {
        if node.kind() == "statement_block" {
            self.read_stmts(node)
        } else {
            vec![self.read_stmt(node)]
        }
    }

    fn read_stmt(&self, node: Node) -> Stmt {
        // Errors inside compound statements surface at their leaves
        if node.is_error() || (node.has_error() && !is_compound(node.kind())) {
            return Stmt::Unsupported {
                kind: "ERROR".into(),
                span: span(node),
            };
        }

        match node.kind() {
            "comment" | "empty_statement" | "hash_bang_line" => Stmt::Erased { span: span(node) },

            // Type-level declarations have no runtime counterpart
            "interface_declaration"
            | "type_alias_declaration"
            | "ambient_declaration"
            | "function_signature" => Stmt::Erased { span: span(node) },

            "statement_block" => Stmt::Block {
                body: self.read_stmts(node),
                span: span(node),
            },

            "expression_statement" => match named_children(node).first() {
                Some(expr) => Stmt::Expr {
                    expr: self.read_expr(*expr),
                    span: span(node),
                },
                None => self.unsupported(node),
            },

            "function_declaration" | "generator_function_declaration" => {
                self.read_function_declaration(node)
            }

            "return_statement" => Stmt::Return { span: span(node) },

            "lexical_declaration" | "variable_declaration" => self.read_variable_declaration(node),

            "class_declaration" | "abstract_class_declaration" => self.read_class(node),

            "import_statement" => self.read_import(node),

            "if_statement" => self.read_if_statement(node),

            "for_statement" => self.read_for_statement(node),

            "for_in_statement" => self.read_for_in_statement(node),

            "while_statement" => {
                let (Some(condition), Some(body)) = (
                    node.child_by_field_name("condition"),
                    node.child_by_field_name("body"),
                ) else {
                    return self.unsupported(node);
                };
                Stmt::While {
                    test: self.read_expr(condition),
                    body: Box::new(self.read_stmt(body)),
                    span: span(node),
                }
            }

            "break_statement" => Stmt::Break { span: span(node) },
            "continue_statement" => Stmt::Continue { span: span(node) },

            // `export function f() {}` behaves like the bare declaration
            "export_statement" => match node.child_by_field_name("declaration") {
                Some(decl) => self.read_stmt(decl),
                None => self.unsupported(node),
            },

            _ => self.unsupported(node),
        }
    }

    fn read_function_declaration(&self, node: Node) -> Stmt {
        match self.read_function(node) {
            Some(func) => Stmt::Function(func),
            None => self.unsupported(node),
        }
    }

    /// Shared by function declarations and method definitions.
    fn read_function(&self, node: Node) -> Option<Function> {
        let name = node.child_by_field_name("name")?;
        let body = node.child_by_field_name("body")?;
        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.read_parameters(p))
            .unwrap_or_default();

        Some(Function {
            name: self.node_text(name).to_string(),
            params,
            body: self.read_body(body),
            span: span(node),
        })
    }

    fn read_parameters(&self, node: Node) -> Vec<Param> {
        named_children(node)
            .into_iter()
            .filter_map(|child| self.read_parameter(child))
            .collect()
    }

    fn read_parameter(&self, node: Node) -> Option<Param> {
        match node.kind() {
            "identifier" => Some(Param::new(self.node_text(node))),
            "required_parameter" | "optional_parameter" => {
                let pattern = node.child_by_field_name("pattern")?;
                // `this: Foo` only annotates the receiver
                if pattern.kind() == "this" {
                    return None;
                }
                let mut param = self.read_parameter(pattern)?;
                if let Some(value) = node.child_by_field_name("value") {
                    param.default = Some(span(value));
                }
                Some(param)
            }
            "assignment_pattern" => {
                let left = node.child_by_field_name("left")?;
                let mut param = self.read_parameter(left)?;
                param.default = node.child_by_field_name("right").map(span);
                Some(param)
            }
            "rest_pattern" => named_children(node)
                .first()
                .map(|inner| Param::new(self.node_text(*inner))),
            _ => Some(Param::new(self.node_text(node))),
        }
    }

    fn read_variable_declaration(&self, node: Node) -> Stmt {
        let kind = if node.kind() == "variable_declaration" {
            VarKind::Var
        } else {
            match node.child_by_field_name("kind").map(|k| self.node_text(k)) {
                Some("const") => VarKind::Const,
                _ => VarKind::Let,
            }
        };

        let declarators = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "variable_declarator")
            .map(|declarator| Declarator {
                name: declarator
                    .child_by_field_name("name")
                    .filter(|n| n.kind() == "identifier")
                    .map(|n| self.node_text(n).to_string()),
                init: declarator
                    .child_by_field_name("value")
                    .map(|value| self.read_expr(value)),
                span: span(declarator),
            })
            .collect();

        Stmt::Var(VarDecl {
            kind,
            declarators,
            span: span(node),
        })
    }

    fn read_class(&self, node: Node) -> Stmt {
        let (Some(name), Some(body)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("body"),
        ) else {
            return self.unsupported(node);
        };

        let members = named_children(body)
            .into_iter()
            .filter_map(|member| self.read_class_member(member))
            .collect();

        Stmt::Class(Class {
            name: self.node_text(name).to_string(),
            superclass: self.read_superclass(node),
            members,
            span: span(node),
        })
    }

    fn read_superclass(&self, node: Node) -> Option<Span> {
        let heritage = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "class_heritage")?;
        let first = *named_children(heritage).first()?;
        if first.kind() == "extends_clause" {
            // TypeScript wraps the superclass in an extends_clause
            let value = first
                .child_by_field_name("value")
                .or_else(|| named_children(first).first().copied())?;
            Some(span(value))
        } else {
            Some(span(first))
        }
    }

    fn read_class_member(&self, node: Node) -> Option<ClassMember> {
        match node.kind() {
            "method_definition" => {
                let func = match self.read_function(node) {
                    Some(func) => func,
                    None => {
                        return Some(ClassMember::Field {
                            name: node.kind().to_string(),
                            span: span(node),
                        });
                    }
                };
                if func.name == "constructor" {
                    Some(ClassMember::Constructor(func))
                } else {
                    Some(ClassMember::Method(func))
                }
            }
            "method_signature" | "abstract_method_signature" | "index_signature" | "decorator" => {
                None
            }
            "public_field_definition" | "field_definition" => {
                let name = node
                    .child_by_field_name("name")
                    .or_else(|| node.child_by_field_name("property"))
                    .map(|n| self.node_text(n).to_string())
                    .unwrap_or_default();
                Some(ClassMember::Field {
                    name,
                    span: span(node),
                })
            }
            other => Some(ClassMember::Field {
                name: other.to_string(),
                span: span(node),
            }),
        }
    }

    fn read_import(&self, node: Node) -> Stmt {
        // `import type { T } from "m"` is erased by the type checker
        if has_token(node, "type") {
            return Stmt::Erased { span: span(node) };
        }

        let Some(source) = node.child_by_field_name("source") else {
            return self.unsupported(node);
        };
        let source = self
            .node_text(source)
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string();

        let mut specifiers = Vec::new();
        if let Some(clause) = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "import_clause")
        {
            for child in named_children(clause) {
                match child.kind() {
                    "identifier" => specifiers.push(ImportSpecifier::Default {
                        local: self.node_text(child).to_string(),
                    }),
                    "namespace_import" => {
                        if let Some(local) = named_children(child).first() {
                            specifiers.push(ImportSpecifier::Namespace {
                                local: self.node_text(*local).to_string(),
                            });
                        }
                    }
                    "named_imports" => {
                        for spec in named_children(child) {
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            let Some(name) = spec.child_by_field_name("name") else {
                                continue;
                            };
                            let imported = self.node_text(name).to_string();
                            let local = spec
                                .child_by_field_name("alias")
                                .map(|alias| self.node_text(alias).to_string())
                                .unwrap_or_else(|| imported.clone());
                            specifiers.push(ImportSpecifier::Named { imported, local });
                        }
                    }
                    _ => {}
                }
            }
        }

        Stmt::Import(Import {
            specifiers,
            source,
            span: span(node),
        })
    }

    fn read_if_statement(&self, node: Node) -> Stmt {
        let (Some(condition), Some(consequence)) = (
            node.child_by_field_name("condition"),
            node.child_by_field_name("consequence"),
        ) else {
            return self.unsupported(node);
        };

        // else_clause wraps the alternate statement
        let alternate = node
            .child_by_field_name("alternative")
            .and_then(|clause| named_children(clause).first().copied())
            .map(|alt| Box::new(self.read_stmt(alt)));

        Stmt::If(If {
            test: self.read_expr(condition),
            consequent: Box::new(self.read_stmt(consequence)),
            alternate,
            span: span(node),
        })
    }

    fn read_for_statement(&self, node: Node) -> Stmt {
        let Some(body) = node.child_by_field_name("body") else {
            return self.unsupported(node);
        };

        let init = node
            .child_by_field_name("initializer")
            .and_then(|init| match init.kind() {
                "empty_statement" | ";" => None,
                "lexical_declaration" | "variable_declaration" | "expression_statement" => {
                    Some(Box::new(self.read_stmt(init)))
                }
                _ => Some(Box::new(Stmt::Expr {
                    expr: self.read_expr(init),
                    span: span(init),
                })),
            });

        // Older grammars wrap the condition in an expression_statement
        let test = node
            .child_by_field_name("condition")
            .and_then(|cond| match cond.kind() {
                "empty_statement" | ";" => None,
                "expression_statement" => named_children(cond).first().copied(),
                _ => Some(cond),
            })
            .map(|cond| self.read_expr(cond));

        let update = node
            .child_by_field_name("increment")
            .map(|inc| self.read_expr(inc));

        Stmt::For(For {
            init,
            test,
            update,
            body: Box::new(self.read_stmt(body)),
            span: span(node),
        })
    }

    fn read_for_in_statement(&self, node: Node) -> Stmt {
        let (Some(left), Some(right), Some(body)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
            node.child_by_field_name("body"),
        ) else {
            return self.unsupported(node);
        };

        let of = match node.child_by_field_name("operator") {
            Some(op) => self.node_text(op) == "of",
            None => has_token(node, "of"),
        };

        Stmt::ForIn(ForIn {
            left: (left.kind() == "identifier").then(|| self.node_text(left).to_string()),
            right: self.read_expr(right),
            body: Box::new(self.read_stmt(body)),
            of,
            span: span(node),
        })
    }

    fn read_expr(&self, node: Node) -> Expr {
        let s = span(node);
        match node.kind() {
            "identifier" | "this" | "super" | "property_identifier"
            | "shorthand_property_identifier" => Expr::Ident {
                name: self.node_text(node).to_string(),
                span: s,
            },

            "number" => self.literal(LiteralKind::Number, s),
            "string" => self.literal(LiteralKind::String, s),
            "true" | "false" => self.literal(LiteralKind::Bool, s),
            "null" => self.literal(LiteralKind::Null, s),
            "undefined" => self.literal(LiteralKind::Undefined, s),
            "regex" => self.literal(LiteralKind::Regex, s),

            "template_string" => Expr::Template { span: s },

            "call_expression" => {
                let Some(function) = node.child_by_field_name("function") else {
                    return self.other(node);
                };
                match node.child_by_field_name("arguments") {
                    Some(args) if args.kind() == "arguments" => Expr::Call {
                        callee: Box::new(self.read_expr(function)),
                        args: self.read_arguments(args),
                        span: s,
                    },
                    // Tagged templates and friends
                    _ => self.other(node),
                }
            }

            "new_expression" => {
                let Some(constructor) = node.child_by_field_name("constructor") else {
                    return self.other(node);
                };
                Expr::New {
                    callee: Box::new(self.read_expr(constructor)),
                    args: node
                        .child_by_field_name("arguments")
                        .map(|args| self.read_arguments(args))
                        .unwrap_or_default(),
                    span: s,
                }
            }

            "assignment_expression" | "augmented_assignment_expression" => {
                let (Some(left), Some(right)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) else {
                    return self.other(node);
                };
                let op = node
                    .child_by_field_name("operator")
                    .map(|op| self.node_text(op))
                    .unwrap_or("=");
                Expr::Assign {
                    left: Box::new(self.read_expr(left)),
                    op: op.to_string(),
                    right: Box::new(self.read_expr(right)),
                    span: s,
                }
            }

            "update_expression" => {
                let (Some(argument), Some(op)) = (
                    node.child_by_field_name("argument"),
                    node.child_by_field_name("operator"),
                ) else {
                    return self.other(node);
                };
                Expr::Update {
                    argument: Box::new(self.read_expr(argument)),
                    op: self.node_text(op).to_string(),
                    span: s,
                }
            }

            "binary_expression" => {
                let (Some(left), Some(op), Some(right)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("operator"),
                    node.child_by_field_name("right"),
                ) else {
                    return self.other(node);
                };
                Expr::Binary {
                    left: Box::new(self.read_expr(left)),
                    op: self.node_text(op).to_string(),
                    right: Box::new(self.read_expr(right)),
                    span: s,
                }
            }

            "unary_expression" => {
                let (Some(op), Some(argument)) = (
                    node.child_by_field_name("operator"),
                    node.child_by_field_name("argument"),
                ) else {
                    return self.other(node);
                };
                Expr::Unary {
                    op: self.node_text(op).to_string(),
                    argument: Box::new(self.read_expr(argument)),
                    span: s,
                }
            }

            "sequence_expression" => {
                let mut exprs = Vec::new();
                self.collect_sequence(node, &mut exprs);
                Expr::Sequence { exprs, span: s }
            }

            "member_expression" => {
                let (Some(object), Some(property)) = (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("property"),
                ) else {
                    return self.other(node);
                };
                Expr::Member {
                    object: Box::new(self.read_expr(object)),
                    property: self.node_text(property).to_string(),
                    span: s,
                }
            }

            "parenthesized_expression" => match named_children(node).first() {
                Some(inner) => Expr::Paren {
                    expr: Box::new(self.read_expr(*inner)),
                    span: s,
                },
                None => self.other(node),
            },

            "arrow_function" | "function_expression" | "function" => {
                let params = if let Some(params) = node.child_by_field_name("parameters") {
                    self.read_parameters(params)
                } else if let Some(param) = node.child_by_field_name("parameter") {
                    vec![Param::new(self.node_text(param))]
                } else {
                    Vec::new()
                };
                let Some(body) = node.child_by_field_name("body") else {
                    return self.other(node);
                };
                let body = if body.kind() == "statement_block" {
                    FunctionBody::Block {
                        body: self.read_stmts(body),
                    }
                } else {
                    FunctionBody::Expr {
                        expr: Box::new(self.read_expr(body)),
                    }
                };
                Expr::Function {
                    params,
                    body,
                    span: s,
                }
            }

            "array" => Expr::Array { span: s },
            "object" => Expr::Object { span: s },

            _ => self.other(node),
        }
    }

    fn literal(&self, kind: LiteralKind, span: Span) -> Expr {
        Expr::Literal { kind, span }
    }

    fn other(&self, node: Node) -> Expr {
        Expr::Other {
            kind: node.kind().to_string(),
            span: span(node),
        }
    }

    fn read_arguments(&self, node: Node) -> Vec<Expr> {
        named_children(node)
            .into_iter()
            .map(|arg| self.read_expr(arg))
            .collect()
    }

    /// Older grammars nest `a, b, c` as `a, (b, c)`; flatten either shape.
    fn collect_sequence(&self, node: Node, out: &mut Vec<Expr>) {
        for child in named_children(node) {
            if child.kind() == "sequence_expression" {
                self.collect_sequence(child, out);
            } else {
                out.push(self.read_expr(child));
            }
        }
    }
}

// ============================================================================
// Type erasure
// ============================================================================

/// Remove TypeScript-only syntax, leaving ECMAScript text.
///
/// Declarations that only exist at the type level are deleted whole;
/// annotations, type arguments, casts and modifiers are cut out of the
/// surrounding expression.
pub fn erase_types(source: &str) -> Result<String, ReadError> {
    let tree = parse(source)?;
    let mut ranges = Vec::new();
    collect_type_ranges(tree.root_node(), &mut ranges);
    ranges.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for range in ranges {
        if range.start < last {
            continue;
        }
        out.push_str(&source[last..range.start]);
        last = range.end;
    }
    out.push_str(&source[last..]);
    Ok(out)
}

fn is_type_only_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "interface_declaration"
            | "type_alias_declaration"
            | "ambient_declaration"
            | "function_signature"
    )
}

/// Anonymous tokens that only carry type information, by parent kind.
fn erasable_tokens(parent: &str) -> &'static [&'static str] {
    match parent {
        "optional_parameter" => &["?"],
        "required_parameter" => &["readonly"],
        "public_field_definition" => &["?", "!", "readonly", "declare", "abstract"],
        "method_definition" => &["?", "abstract"],
        "abstract_class_declaration" => &["abstract"],
        "variable_declarator" => &["!"],
        _ => &[],
    }
}

fn collect_type_ranges(node: Node, ranges: &mut Vec<Range<usize>>) {
    let kind = node.kind();

    if is_type_only_declaration(kind) {
        ranges.push(node.byte_range());
        return;
    }

    match kind {
        "type_annotation" | "asserts_annotation" | "type_predicate_annotation"
        | "type_arguments" | "type_parameters" | "implements_clause" | "accessibility_modifier" | "override_modifier" | "method_signature"
        | "abstract_method_signature" | "index_signature" => {
            ranges.push(node.byte_range());
            return;
        }
        "export_statement" => {
            if let Some(decl) = node.child_by_field_name("declaration")
                && is_type_only_declaration(decl.kind())
            {
                ranges.push(node.byte_range());
                return;
            }
        }
        "import_statement" => {
            if has_token(node, "type") {
                ranges.push(node.byte_range());
                return;
            }
        }
        "as_expression" | "satisfies_expression" | "non_null_expression" => {
            // Keep the operand, drop ` as T` / ` satisfies T` / `!`
            if let Some(inner) = named_children(node).first() {
                ranges.push(inner.end_byte()..node.end_byte());
                collect_type_ranges(*inner, ranges);
            }
            return;
        }
        _ => {}
    }

    let tokens = erasable_tokens(kind);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if !child.is_named() && tokens.contains(&child.kind()) {
            ranges.push(child.byte_range());
        } else {
            collect_type_ranges(child, ranges);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(code: &str) -> Program {
        read_typescript(code).expect("parse failed")
    }

    #[test]
    fn test_reader_metadata() {
        assert_eq!(TYPESCRIPT_READER.language(), "typescript");
        assert!(TYPESCRIPT_READER.extensions().contains(&"ts"));
    }

    #[test]
    fn test_function_declaration() {
        let program = read("function add(a, b) { return a + b; }");
        let Stmt::Function(func) = &program.body[0] else {
            panic!("expected function, got {:?}", program.body[0]);
        };
        assert_eq!(func.name, "add");
        let params: Vec<&str> = func.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(params, vec!["a", "b"]);
        assert!(matches!(func.body[0], Stmt::Return { .. }));
    }

    #[test]
    fn test_parameter_default_span() {
        let code = "function greet(name = \"you\") {}";
        let program = read(code);
        let Stmt::Function(func) = &program.body[0] else {
            panic!("expected function");
        };
        let default = func.params[0].default.expect("default value");
        assert_eq!(default.text(code), "\"you\"");
    }

    #[test]
    fn test_spans_index_source() {
        let code = "let x = [1, 2];";
        let program = read(code);
        let Stmt::Var(decl) = &program.body[0] else {
            panic!("expected var");
        };
        assert_eq!(decl.kind, VarKind::Let);
        let init = decl.declarators[0].init.as_ref().unwrap();
        assert!(matches!(init, Expr::Array { .. }));
        assert_eq!(init.span().text(code), "[1, 2]");
    }

    #[test]
    fn test_class_members() {
        let program = read(
            "class A extends B { x = 1; constructor(a) { this.a = a; } get() { return 1; } }",
        );
        let Stmt::Class(class) = &program.body[0] else {
            panic!("expected class");
        };
        assert_eq!(class.name, "A");
        assert!(class.superclass.is_some());
        assert!(matches!(class.members[0], ClassMember::Field { .. }));
        assert!(matches!(class.members[1], ClassMember::Constructor(_)));
        assert!(matches!(class.members[2], ClassMember::Method(_)));
    }

    #[test]
    fn test_import_specifiers() {
        let program = read("import { a, b as c } from \"./mod\";");
        let Stmt::Import(import) = &program.body[0] else {
            panic!("expected import");
        };
        assert_eq!(import.source, "./mod");
        assert_eq!(
            import.specifiers,
            vec![
                ImportSpecifier::Named {
                    imported: "a".into(),
                    local: "a".into()
                },
                ImportSpecifier::Named {
                    imported: "b".into(),
                    local: "c".into()
                },
            ]
        );
    }

    #[test]
    fn test_namespace_import() {
        let program = read("import * as util from \"./util\";");
        let Stmt::Import(import) = &program.body[0] else {
            panic!("expected import");
        };
        assert_eq!(
            import.specifiers,
            vec![ImportSpecifier::Namespace {
                local: "util".into()
            }]
        );
    }

    #[test]
    fn test_for_statement_parts() {
        let program = read("for (let i = 0; i < 10; i++) { f(i); }");
        let Stmt::For(for_stmt) = &program.body[0] else {
            panic!("expected for");
        };
        assert!(matches!(for_stmt.init.as_deref(), Some(Stmt::Var(_))));
        assert!(matches!(for_stmt.test, Some(Expr::Binary { .. })));
        assert!(matches!(
            for_stmt.update,
            Some(Expr::Update { ref op, .. }) if op == "++"
        ));
    }

    #[test]
    fn test_for_of_statement() {
        let program = read("for (const item of items) { use(item); }");
        let Stmt::ForIn(for_in) = &program.body[0] else {
            panic!("expected for-in");
        };
        assert_eq!(for_in.left.as_deref(), Some("item"));
        assert!(for_in.of);
        assert_eq!(for_in.right.as_ident(), Some("items"));
    }

    #[test]
    fn test_sequence_flattened() {
        let program = read("f((a, b, c));");
        let Stmt::Expr { expr: Expr::Call { args, .. }, .. } = &program.body[0] else {
            panic!("expected call");
        };
        let Expr::Sequence { exprs, .. } = args[0].unparen() else {
            panic!("expected sequence, got {:?}", args[0]);
        };
        assert_eq!(exprs.len(), 3);
    }

    #[test]
    fn test_unknown_statement_is_unsupported() {
        let program = read("try { a(); } catch (e) {}");
        assert!(matches!(
            &program.body[0],
            Stmt::Unsupported { kind, .. } if kind == "try_statement"
        ));
    }

    #[test]
    fn test_syntax_error_becomes_error_statement() {
        let program = read("function ok() {}\nlet x = ;");
        assert!(matches!(program.body[0], Stmt::Function(_)));
        assert!(program.body.iter().any(
            |stmt| matches!(stmt, Stmt::Unsupported { kind, .. } if kind == "ERROR")
        ));
    }

    #[test]
    fn test_erase_annotations() {
        let erased = erase_types("function f(a: number, b?: string): void { return; }").unwrap();
        assert_eq!(erased, "function f(a, b) { return; }");
    }

    #[test]
    fn test_erase_type_declarations() {
        let erased =
            erase_types("interface P { x: number }\nexport type Q = P;\nlet y = 1;").unwrap();
        assert_eq!(erased.trim(), "let y = 1;");
    }

    #[test]
    fn test_erase_casts_and_generics() {
        let erased = erase_types("let v = parse<Foo>(raw as string)!;").unwrap();
        assert_eq!(erased, "let v = parse(raw);");
    }
}
