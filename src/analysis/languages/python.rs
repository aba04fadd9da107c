//! Python language analyzer using tree-sitter.

use std::collections::BTreeSet;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, Query, QueryCursor};

use super::{
    binding_name, grammar_error, has_comment_child, significant_children, unquote,
    FactCollector, NOT_IMPLEMENTED_PHRASES,
};
use crate::analysis::{
    CommentText, ControlFlowInfo, FactSheet, FunctionFact, ImportFact, Language,
    LanguageAnalyzer, LiteralContext, LiteralFact, LiteralKind, ParseError, ParsedFile, Span,
};

const CONTROL_FLOW_QUERY: &str = r#"
(if_statement) @if
(elif_clause) @elif
(for_statement) @for
(while_statement) @while
(conditional_expression) @ternary
(boolean_operator operator: "and") @and
(boolean_operator operator: "or") @or
(try_statement) @try
(except_clause) @except
(match_statement) @match
(case_clause) @case
"#;

pub struct PythonAnalyzer {
    grammar: tree_sitter::Language,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self {
            grammar: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.grammar)
            .map_err(|e| grammar_error(Language::Python, e))?;
        Ok(parser)
    }

    fn visit(
        &self,
        parsed: &ParsedFile,
        node: Node,
        query: &Query,
        out: &mut FactCollector,
        current_fn: Option<usize>,
    ) {
        let mut current_fn = current_fn;
        match node.kind() {
            "function_definition" => {
                let fact = self.function_fact(parsed, node, query);
                current_fn = Some(out.push_function(fact));
            }
            "import_statement" => {
                let mut cursor = node.walk();
                for name in node.children_by_field_name("name", &mut cursor) {
                    let module = imported_name(parsed, name);
                    out.push_import(ImportFact {
                        module_name: module.to_string(),
                        imported_symbol: None,
                        is_relative: false,
                        span: Span::from_node(node),
                    });
                }
                return;
            }
            "import_from_statement" => {
                self.import_from(parsed, node, out);
                return;
            }
            "future_import_statement" => {
                out.push_import(ImportFact {
                    module_name: "__future__".to_string(),
                    imported_symbol: None,
                    is_relative: false,
                    span: Span::from_node(node),
                });
                return;
            }
            "comment" => return,
            "expression_statement" if is_docstring(node) => return,
            "string" | "concatenated_string" => {
                out.push_literal(self.literal(parsed, node, LiteralKind::String, current_fn));
                return;
            }
            "integer" | "float" => {
                out.push_literal(self.literal(parsed, node, LiteralKind::Number, current_fn));
                return;
            }
            "list" | "tuple" | "set" | "expression_list" | "argument_list" if is_container(node) => {
                let anchor = if node.kind() == "argument_list" {
                    node.parent().unwrap_or(node)
                } else {
                    node
                };
                out.container(LiteralFact {
                    value: parsed.node_text(node).to_string(),
                    kind: LiteralKind::List,
                    span: Span::from_node(node),
                    context: LiteralContext {
                        binding: self.binding_for(parsed, anchor),
                        container: None,
                        function: current_fn,
                    },
                });
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(parsed, child, query, out, current_fn);
        }
    }

    fn import_from(&self, parsed: &ParsedFile, node: Node, out: &mut FactCollector) {
        let Some(module) = node.child_by_field_name("module_name") else {
            return;
        };
        let module_name = parsed.node_text(module).to_string();
        let is_relative = module.kind() == "relative_import";
        let span = Span::from_node(node);

        let mut cursor = node.walk();
        let mut symbols: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| imported_name(parsed, n).to_string())
            .collect();
        if symbols.is_empty() {
            symbols.push("*".to_string());
        }

        for symbol in symbols {
            out.push_import(ImportFact {
                module_name: module_name.clone(),
                imported_symbol: Some(symbol),
                is_relative,
                span,
            });
        }
    }

    fn literal(
        &self,
        parsed: &ParsedFile,
        node: Node,
        kind: LiteralKind,
        current_fn: Option<usize>,
    ) -> LiteralFact {
        let value = match node.kind() {
            "string" => unquote(parsed.node_text(node)),
            "concatenated_string" => significant_children(node)
                .into_iter()
                .map(|s| unquote(parsed.node_text(s)))
                .collect(),
            _ => parsed.node_text(node).to_string(),
        };
        let container = climb(node)
            .parent()
            .filter(|p| is_container(*p))
            .map(|p| p.start_byte());

        LiteralFact {
            value,
            kind,
            span: Span::from_node(node),
            context: LiteralContext {
                binding: if container.is_some() {
                    None
                } else {
                    self.binding_for(parsed, node)
                },
                container,
                function: current_fn,
            },
        }
    }

    /// Keyword, variable, attribute, dict key or parameter a value is bound to.
    fn binding_for(&self, parsed: &ParsedFile, node: Node) -> Option<String> {
        let anchor = climb(node);
        let parent = anchor.parent()?;
        let named = |field: &str| {
            parent
                .child_by_field_name(field)
                .filter(|n| n.id() != anchor.id())
        };
        match parent.kind() {
            "keyword_argument" | "default_parameter" | "typed_default_parameter" => {
                named("name").map(|n| parsed.node_text(n).to_string())
            }
            "assignment" | "augmented_assignment" => {
                named("left").and_then(|n| binding_name(parsed.node_text(n)))
            }
            "pair" => named("key").and_then(|key| {
                if key.kind() == "string" {
                    Some(unquote(parsed.node_text(key)))
                } else {
                    binding_name(parsed.node_text(key))
                }
            }),
            _ => None,
        }
    }

    fn function_fact(&self, parsed: &ParsedFile, node: Node, query: &Query) -> FunctionFact {
        let name = node
            .child_by_field_name("name")
            .map(|n| parsed.node_text(n).to_string())
            .unwrap_or_default();
        let qualified_name = match receiver_for(parsed, node) {
            Some(class) => format!("{}.{}", class, name),
            None => name.clone(),
        };
        let decorated = node
            .parent()
            .filter(|p| p.kind() == "decorated_definition");
        let is_abstract = decorated.is_some_and(|d| {
            let mut cursor = d.walk();
            let abstract_decorator = d
                .children(&mut cursor)
                .filter(|c| c.kind() == "decorator")
                .any(|c| parsed.node_text(c).contains("abstractmethod"));
            abstract_decorator
        });

        let mut fact = FunctionFact {
            name,
            qualified_name,
            span: Span::from_node(node),
            doc_start_line: decorated.unwrap_or(node).start_position().row + 1,
            body_line_count: 0,
            statement_count: 0,
            control_flow: ControlFlowInfo::default(),
            cyclomatic_complexity: 1,
            is_empty: false,
            has_only_trivial_body: false,
            raises_not_implemented: false,
            returns_constant_only: false,
            is_abstract,
            comment_markers: BTreeSet::new(),
        };

        let Some(body) = node.child_by_field_name("body") else {
            return fact;
        };

        let children = significant_children(body);
        let statements: Vec<Node> = children
            .iter()
            .copied()
            .filter(|s| !is_docstring(*s))
            .collect();
        let body_span = Span::from_node(body);
        fact.body_line_count = body_span.end_line - body_span.start_line + 1;
        fact.statement_count = statements.len();
        fact.is_empty = children.is_empty() && !has_comment_child(body);
        fact.has_only_trivial_body =
            !fact.is_empty && children.iter().all(|s| self.is_trivial_statement(parsed, *s));
        fact.raises_not_implemented =
            statements.len() == 1 && self.is_not_implemented_raise(parsed, statements[0]);
        fact.returns_constant_only =
            statements.len() == 1 && self.is_constant_return(statements[0]);
        fact.control_flow = extract_control_flow(parsed, body, query);
        fact.cyclomatic_complexity = fact.control_flow.cyclomatic_complexity();
        fact
    }

    /// `pass`, `...`, a docstring, bare `return` or `return None`.
    fn is_trivial_statement(&self, parsed: &ParsedFile, node: Node) -> bool {
        match node.kind() {
            "pass_statement" => true,
            "expression_statement" => {
                is_docstring(node)
                    || significant_children(node)
                        .first()
                        .is_some_and(|c| c.kind() == "ellipsis")
            }
            "return_statement" => match node.named_child(0) {
                None => true,
                Some(value) => value.kind() == "none" || parsed.node_text(value) == "None",
            },
            _ => false,
        }
    }

    /// `raise NotImplementedError` or a generic exception whose message says
    /// the code is not implemented.
    fn is_not_implemented_raise(&self, parsed: &ParsedFile, node: Node) -> bool {
        if node.kind() != "raise_statement" {
            return false;
        }
        let Some(raised) = node.named_child(0) else {
            return false;
        };
        let callee = if raised.kind() == "call" {
            raised.child_by_field_name("function").unwrap_or(raised)
        } else {
            raised
        };
        let name = parsed.node_text(callee);
        let name = name.rsplit('.').next().unwrap_or(name);
        if name == "NotImplementedError" || name == "NotImplemented" {
            return true;
        }

        if matches!(name, "Exception" | "RuntimeError") {
            let message = parsed.node_text(raised).to_lowercase();
            return NOT_IMPLEMENTED_PHRASES.iter().any(|p| message.contains(p));
        }
        false
    }

    fn is_constant_return(&self, node: Node) -> bool {
        if node.kind() != "return_statement" {
            return false;
        }
        node.named_child(0).is_some_and(is_constant_expr)
    }
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language(&self) -> Language {
        Language::Python
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py", "pyi"]
    }

    fn parse(&self, path: &str, source: &[u8]) -> Result<ParsedFile, ParseError> {
        let mut parser = self.create_parser()?;
        let tree = parser.parse(source, None).ok_or_else(|| ParseError::Syntax {
            path: path.to_string(),
            line: 1,
        })?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string(),
        })
    }

    fn extract_facts(&self, parsed: &ParsedFile) -> Result<FactSheet, ParseError> {
        let query = Query::new(&self.grammar, CONTROL_FLOW_QUERY)
            .map_err(|e| grammar_error(Language::Python, e))?;
        let mut out = FactCollector::new(&parsed.path, Language::Python);
        self.visit(parsed, parsed.tree.root_node(), &query, &mut out, None);
        Ok(out.finish())
    }

    fn comments(&self, parsed: &ParsedFile) -> Vec<CommentText> {
        let mut comments = Vec::new();
        let mut stack = vec![parsed.tree.root_node()];
        while let Some(node) = stack.pop() {
            if node.kind() == "comment" || is_docstring(node) {
                comments.push(CommentText {
                    start_line: node.start_position().row + 1,
                    text: parsed.node_text(node).to_string(),
                });
                continue;
            }
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        comments
    }
}

/// A statement consisting of a bare string.
fn is_docstring(node: Node) -> bool {
    if node.kind() != "expression_statement" {
        return false;
    }
    let children = significant_children(node);
    children.len() == 1 && matches!(children[0].kind(), "string" | "concatenated_string")
}

/// Module name of a `dotted_name` or `aliased_import`.
fn imported_name<'a>(parsed: &'a ParsedFile, node: Node) -> &'a str {
    if node.kind() == "aliased_import" {
        if let Some(name) = node.child_by_field_name("name") {
            return parsed.node_text(name);
        }
    }
    parsed.node_text(node)
}

fn receiver_for(parsed: &ParsedFile, node: Node) -> Option<String> {
    let mut current = node.parent();
    while let Some(parent) = current {
        match parent.kind() {
            "class_definition" => {
                return parent
                    .child_by_field_name("name")
                    .map(|n| parsed.node_text(n).to_string());
            }
            "function_definition" | "lambda" => return None,
            _ => current = parent.parent(),
        }
    }
    None
}

fn is_constant_expr(node: Node) -> bool {
    match node.kind() {
        "true" | "false" | "integer" | "float" | "string" => true,
        "list" | "dictionary" | "tuple" | "set" => significant_children(node).is_empty(),
        "unary_operator" => node
            .child_by_field_name("argument")
            .is_some_and(|a| matches!(a.kind(), "integer" | "float")),
        _ => false,
    }
}

/// Sequence displays and call argument lists with more than one element.
fn is_container(node: Node) -> bool {
    match node.kind() {
        "list" | "tuple" | "set" | "expression_list" => true,
        "argument_list" => significant_children(node).len() > 1,
        _ => false,
    }
}

/// Walk up from a value through method calls, parentheses and
/// single-argument calls (`"x".lower()`, `str("x")`).
fn climb(node: Node) -> Node {
    let mut current = node;
    while let Some(parent) = current.parent() {
        let passes = match parent.kind() {
            "parenthesized_expression" | "unary_operator" | "await" => true,
            "attribute" => parent
                .child_by_field_name("object")
                .is_some_and(|o| o.id() == current.id()),
            "call" => {
                current.kind() == "argument_list"
                    || parent
                        .child_by_field_name("function")
                        .is_some_and(|f| f.id() == current.id())
            }
            "argument_list" => significant_children(parent).len() == 1,
            _ => false,
        };
        if !passes {
            break;
        }
        current = parent;
    }
    current
}

fn extract_control_flow(parsed: &ParsedFile, body: Node, query: &Query) -> ControlFlowInfo {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, body, &parsed.source[..]);

    let mut info = ControlFlowInfo::default();

    while let Some(m) = matches.next() {
        for capture in m.captures {
            let name = query.capture_names()[capture.index as usize];
            match name {
                "if" | "elif" => info.if_count += 1,
                "for" | "while" => info.loop_count += 1,
                "match" => info.switch_count += 1,
                "case" => info.case_count += 1,
                "ternary" => info.ternary_count += 1,
                "and" => info.and_count += 1,
                "or" => info.or_count += 1,
                "except" => info.catch_count += 1,
                _ => {}
            }
        }
    }

    info
}
