//! Rust language analyzer using tree-sitter.
//!
//! Extracts:
//! - Free functions, impl methods and trait methods (with receiver)
//! - Function body details for stub detection
//! - Control flow for complexity
//! - String/number literals and the containers holding them
//! - `use` and `extern crate` declarations, local `mod` names

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

/// Tree-sitter query for control flow nodes (complexity calculation).
const CONTROL_FLOW_QUERY: &str = r#"
(if_expression) @if
(for_expression) @for
(while_expression) @while
(loop_expression) @loop
(match_expression) @match
(match_arm) @match_arm
(binary_expression operator: "&&") @and
(binary_expression operator: "||") @or
(try_expression) @try
"#;

/// Nodes a literal value passes through on its way to a binding.
const WRAPPER_KINDS: &[&str] = &[
    "reference_expression",
    "parenthesized_expression",
    "unary_expression",
    "try_expression",
    "type_cast_expression",
    "await_expression",
];

/// Zero-argument constructors that produce an empty value.
const EMPTY_CONSTRUCTORS: &[&str] = &[
    "Default::default",
    "String::new",
    "Vec::new",
    "HashMap::new",
    "BTreeMap::new",
    "HashSet::new",
];

/// Rust language analyzer.
pub struct RustAnalyzer {
    grammar: tree_sitter::Language,
}

impl RustAnalyzer {
    /// Create a new Rust analyzer.
    pub fn new() -> Self {
        Self {
            grammar: tree_sitter_rust::LANGUAGE.into(),
        }
    }

    /// Create a new parser for this thread.
    fn create_parser(&self) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.grammar)
            .map_err(|e| grammar_error(Language::Rust, e))?;
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
            "function_item" | "function_signature_item" => {
                let fact = self.function_fact(parsed, node, query);
                current_fn = Some(out.push_function(fact));
            }
            "use_declaration" => {
                if let Some(arg) = node.child_by_field_name("argument") {
                    self.use_tree(parsed, arg, "", Span::from_node(node), out);
                }
                return;
            }
            "extern_crate_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    push_import(out, parsed.node_text(name), None, Span::from_node(node));
                }
                return;
            }
            "mod_item" => {
                if let Some(name) = node.child_by_field_name("name") {
                    out.local_module(parsed.node_text(name));
                }
            }
            "attribute_item" | "inner_attribute_item" | "line_comment" | "block_comment" => {
                return;
            }
            "string_literal" | "raw_string_literal" => {
                out.push_literal(self.literal(parsed, node, LiteralKind::String, current_fn));
                return;
            }
            "integer_literal" | "float_literal" => {
                out.push_literal(self.literal(parsed, node, LiteralKind::Number, current_fn));
                return;
            }
            "array_expression" | "tuple_expression" | "token_tree" | "arguments"
                if is_container(node) =>
            {
                let anchor = if node.kind() == "token_tree" {
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

    fn literal(
        &self,
        parsed: &ParsedFile,
        node: Node,
        kind: LiteralKind,
        current_fn: Option<usize>,
    ) -> LiteralFact {
        let text = parsed.node_text(node);
        let value = match kind {
            LiteralKind::String => unquote(text),
            _ => text.to_string(),
        };
        let anchor = climb(node);
        let container = anchor
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

    /// Name of the field, variable or constant a value is assigned to.
    fn binding_for(&self, parsed: &ParsedFile, node: Node) -> Option<String> {
        let anchor = climb(node);
        let parent = anchor.parent()?;
        match parent.kind() {
            "field_initializer" => parent
                .child_by_field_name("field")
                .map(|f| parsed.node_text(f).to_string()),
            "let_declaration" => parent
                .child_by_field_name("pattern")
                .and_then(|p| binding_name(parsed.node_text(p))),
            "const_item" | "static_item" => parent
                .child_by_field_name("name")
                .map(|n| parsed.node_text(n).to_string()),
            "assignment_expression" | "compound_assignment_expr" => {
                let left = parent.child_by_field_name("left")?;
                if left.id() == anchor.id() {
                    return None;
                }
                binding_name(parsed.node_text(left))
            }
            _ => None,
        }
    }

    fn function_fact(&self, parsed: &ParsedFile, node: Node, query: &Query) -> FunctionFact {
        let name = node
            .child_by_field_name("name")
            .map(|n| parsed.node_text(n).to_string())
            .unwrap_or_default();
        let qualified_name = match self.receiver_for(parsed, node) {
            Some(receiver) => format!("{}.{}", receiver, name),
            None => name.clone(),
        };

        let mut fact = FunctionFact {
            name,
            qualified_name,
            span: Span::from_node(node),
            doc_start_line: doc_start_line(node),
            body_line_count: 0,
            statement_count: 0,
            control_flow: ControlFlowInfo::default(),
            cyclomatic_complexity: 1,
            is_empty: false,
            has_only_trivial_body: false,
            raises_not_implemented: false,
            returns_constant_only: false,
            is_abstract: false,
            comment_markers: BTreeSet::new(),
        };

        // Trait methods without a default body
        let Some(body) = node.child_by_field_name("body") else {
            fact.is_abstract = true;
            return fact;
        };

        let statements = significant_children(body);
        let body_span = Span::from_node(body);
        fact.body_line_count = body_span.end_line - body_span.start_line + 1;
        fact.statement_count = statements.len();
        fact.is_empty = statements.is_empty() && !has_comment_child(body);
        fact.has_only_trivial_body =
            !fact.is_empty && statements.iter().all(|s| is_trivial_statement(*s));
        fact.raises_not_implemented =
            statements.len() == 1 && self.is_not_implemented_macro(parsed, statements[0]);
        fact.returns_constant_only =
            statements.len() == 1 && self.is_constant_return(parsed, statements[0]);
        fact.control_flow = extract_control_flow(parsed, body, query);
        fact.cyclomatic_complexity = fact.control_flow.cyclomatic_complexity();
        fact
    }

    /// Type an impl or trait method belongs to.
    fn receiver_for(&self, parsed: &ParsedFile, node: Node) -> Option<String> {
        let mut current = node.parent();
        while let Some(parent) = current {
            match parent.kind() {
                "impl_item" => {
                    let ty = parent.child_by_field_name("type")?;
                    let text = parsed.node_text(ty);
                    return Some(text.split('<').next().unwrap_or(text).trim().to_string());
                }
                "trait_item" => {
                    return parent
                        .child_by_field_name("name")
                        .map(|n| parsed.node_text(n).to_string());
                }
                "function_item" | "closure_expression" => return None,
                _ => current = parent.parent(),
            }
        }
        None
    }

    /// `todo!()`, `unimplemented!()` or a placeholder `panic!`.
    ///
    /// `panic!` with a real message is usually an intentional error path, so
    /// only empty or not-implemented messages count.
    fn is_not_implemented_macro(&self, parsed: &ParsedFile, statement: Node) -> bool {
        let node = statement_expression(statement);
        if node.kind() != "macro_invocation" {
            return false;
        }
        let name = node
            .child_by_field_name("macro")
            .map(|m| parsed.node_text(m))
            .unwrap_or("");
        match name.rsplit("::").next().unwrap_or(name) {
            "todo" | "unimplemented" => true,
            "panic" => {
                let mut cursor = node.walk();
                let args = node
                    .children(&mut cursor)
                    .find(|c| c.kind() == "token_tree")
                    .map(|t| parsed.node_text(t))
                    .unwrap_or("");
                let inner = args
                    .trim_start_matches(['(', '[', '{'])
                    .trim_end_matches([')', ']', '}'])
                    .trim();
                let message = unquote(inner).to_lowercase();
                message.is_empty() || NOT_IMPLEMENTED_PHRASES.iter().any(|p| message.contains(p))
            }
            _ => false,
        }
    }

    fn is_constant_return(&self, parsed: &ParsedFile, statement: Node) -> bool {
        let mut node = statement_expression(statement);
        if node.kind() == "return_expression" {
            match node.named_child(0) {
                Some(value) => node = value,
                None => return false,
            }
        }
        self.is_constant_expr(parsed, node)
    }

    fn is_constant_expr(&self, parsed: &ParsedFile, node: Node) -> bool {
        match node.kind() {
            "boolean_literal" | "integer_literal" | "float_literal" | "string_literal"
            | "raw_string_literal" | "char_literal" | "unit_expression" => true,
            "identifier" => parsed.node_text(node) == "None",
            "array_expression" => significant_children(node).is_empty(),
            "reference_expression" | "parenthesized_expression" => node
                .child_by_field_name("value")
                .or_else(|| node.named_child(0))
                .is_some_and(|inner| self.is_constant_expr(parsed, inner)),
            "call_expression" => {
                let function = node
                    .child_by_field_name("function")
                    .map(|f| parsed.node_text(f))
                    .unwrap_or("");
                let args = node
                    .child_by_field_name("arguments")
                    .map(significant_children)
                    .unwrap_or_default();
                match function {
                    "Ok" | "Some" | "Err" => {
                        args.len() == 1 && self.is_constant_expr(parsed, args[0])
                    }
                    f if EMPTY_CONSTRUCTORS.contains(&f) => args.is_empty(),
                    _ => false,
                }
            }
            "macro_invocation" => {
                let name = node
                    .child_by_field_name("macro")
                    .map(|m| parsed.node_text(m))
                    .unwrap_or("");
                let mut cursor = node.walk();
                let empty_args = node
                    .children(&mut cursor)
                    .find(|c| c.kind() == "token_tree")
                    .is_some_and(|t| t.named_child_count() == 0);
                name == "vec" && empty_args
            }
            _ => false,
        }
    }

    fn use_tree(&self, parsed: &ParsedFile, node: Node, prefix: &str, span: Span, out: &mut FactCollector) {
        match node.kind() {
            "scoped_use_list" => {
                let path = node
                    .child_by_field_name("path")
                    .map(|p| parsed.node_text(p))
                    .unwrap_or("");
                let prefix = join_path(prefix, path);
                if let Some(list) = node.child_by_field_name("list") {
                    self.use_tree(parsed, list, &prefix, span, out);
                }
            }
            "use_list" => {
                for child in significant_children(node) {
                    self.use_tree(parsed, child, prefix, span, out);
                }
            }
            "use_as_clause" => {
                if let Some(path) = node.child_by_field_name("path") {
                    self.use_tree(parsed, path, prefix, span, out);
                }
            }
            "use_wildcard" => {
                let path = parsed.node_text(node).trim_end_matches('*').trim_end_matches("::");
                push_import(out, &join_path(prefix, path), Some("*"), span);
            }
            "scoped_identifier" => {
                let full = join_path(prefix, parsed.node_text(node));
                match full.rsplit_once("::") {
                    Some((module, symbol)) if !module.is_empty() => {
                        push_import(out, module, Some(symbol), span)
                    }
                    _ => push_import(out, &full, None, span),
                }
            }
            "identifier" | "crate" | "self" | "super" => {
                let text = parsed.node_text(node);
                if prefix.is_empty() {
                    push_import(out, text, None, span);
                } else if text == "self" {
                    push_import(out, prefix, None, span);
                } else {
                    push_import(out, prefix, Some(text), span);
                }
            }
            _ => {}
        }
    }
}

impl Default for RustAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for RustAnalyzer {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["rs"]
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
            .map_err(|e| grammar_error(Language::Rust, e))?;
        let mut out = FactCollector::new(&parsed.path, Language::Rust);
        self.visit(parsed, parsed.tree.root_node(), &query, &mut out, None);
        Ok(out.finish())
    }

    fn comments(&self, parsed: &ParsedFile) -> Vec<CommentText> {
        let mut comments = Vec::new();
        let mut stack = vec![parsed.tree.root_node()];
        while let Some(node) = stack.pop() {
            if matches!(node.kind(), "line_comment" | "block_comment") {
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

fn push_import(out: &mut FactCollector, module: &str, symbol: Option<&str>, span: Span) {
    let first = module.split("::").find(|s| !s.is_empty()).unwrap_or(module);
    out.push_import(ImportFact {
        module_name: module.to_string(),
        imported_symbol: symbol.map(str::to_string),
        is_relative: matches!(first, "crate" | "self" | "super"),
        span,
    });
}

fn join_path(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{}::{}", prefix, path),
    }
}

/// Unwrap an expression statement to the expression it holds.
fn statement_expression(node: Node) -> Node {
    if node.kind() == "expression_statement" {
        node.named_child(0).unwrap_or(node)
    } else {
        node
    }
}

/// `()`, `;`, `return;` and `return ()`.
fn is_trivial_statement(node: Node) -> bool {
    let node = statement_expression(node);
    match node.kind() {
        "unit_expression" | "empty_statement" => true,
        "return_expression" => match node.named_child(0) {
            None => true,
            Some(value) => value.kind() == "unit_expression",
        },
        _ => false,
    }
}

/// Multi-element literal groups: arrays, tuples, macro token trees and
/// argument lists with more than one argument.
fn is_container(node: Node) -> bool {
    match node.kind() {
        "array_expression" | "tuple_expression" => true,
        "token_tree" => node
            .parent()
            .is_some_and(|p| matches!(p.kind(), "macro_invocation" | "token_tree")),
        "arguments" => significant_children(node).len() > 1,
        _ => false,
    }
}

/// Walk up from a value through method calls, references and single-argument
/// constructor calls (`"x".to_string()`, `String::from("x")`).
fn climb(node: Node) -> Node {
    let mut current = node;
    while let Some(parent) = current.parent() {
        let passes = match parent.kind() {
            "field_expression" => parent
                .child_by_field_name("value")
                .is_some_and(|v| v.id() == current.id()),
            "call_expression" => {
                current.kind() == "arguments"
                    || parent
                        .child_by_field_name("function")
                        .is_some_and(|f| f.id() == current.id())
            }
            "arguments" => significant_children(parent).len() == 1,
            kind => WRAPPER_KINDS.contains(&kind),
        };
        if !passes {
            break;
        }
        current = parent;
    }
    current
}

/// First line of the doc comments and attributes directly above an item.
fn doc_start_line(node: Node) -> usize {
    let mut start = node.start_position().row;
    let mut current = node;
    while let Some(prev) = current.prev_sibling() {
        if !matches!(prev.kind(), "line_comment" | "block_comment" | "attribute_item") {
            break;
        }
        // Doc comments own their trailing newline
        let end = prev.end_position();
        let end_row = if end.column == 0 && end.row > 0 { end.row - 1 } else { end.row };
        if end_row + 1 < start {
            break;
        }
        start = prev.start_position().row;
        current = prev;
    }
    start + 1
}

fn extract_control_flow(parsed: &ParsedFile, body: Node, query: &Query) -> ControlFlowInfo {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, body, &parsed.source[..]);

    let mut info = ControlFlowInfo::default();

    while let Some(m) = matches.next() {
        for capture in m.captures {
            let name = query.capture_names()[capture.index as usize];
            match name {
                "if" => info.if_count += 1,
                "for" | "while" | "loop" => info.loop_count += 1,
                "match" => info.switch_count += 1,
                "match_arm" => info.case_count += 1,
                "and" => info.and_count += 1,
                "or" => info.or_count += 1,
                "try" => info.catch_count += 1, // ? operator adds a branch
                _ => {}
            }
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(source: &str) -> FactSheet {
        let analyzer = RustAnalyzer::new();
        let parsed = analyzer.parse("test.rs", source.as_bytes()).unwrap();
        analyzer.extract_facts(&parsed).unwrap()
    }

    #[test]
    fn test_extract_functions() {
        let source = r#"
fn main() {
    println!("hello");
}

pub fn helper(x: i32) -> i32 {
    x + 1
}
"#;
        let facts = facts(source);

        assert_eq!(facts.functions.len(), 2);
        assert_eq!(facts.functions[0].name, "main");
        assert_eq!(facts.functions[1].name, "helper");
        assert!(!facts.functions[1].has_only_trivial_body);
    }

    #[test]
    fn test_extract_methods() {
        let source = r#"
struct Config {
    name: String,
}

impl Config {
    fn new(name: String) -> Self {
        Self { name }
    }

    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }
}

trait Service {
    fn run(&self) -> Result<(), Error>;
}
"#;
        let facts = facts(source);

        let validate = facts.find_function("validate").unwrap();
        assert_eq!(validate.qualified_name, "Config.validate");
        assert!(validate.returns_constant_only);

        let run = facts.find_function("run").unwrap();
        assert_eq!(run.qualified_name, "Service.run");
        assert!(run.is_abstract);
    }

    #[test]
    fn test_complexity_simple() {
        let facts = facts("fn simple() -> i32 {\n    42\n}\n");
        let func = facts.find_function("simple").unwrap();
        assert_eq!(func.cyclomatic_complexity, 1);
        assert!(func.returns_constant_only);
    }

    #[test]
    fn test_complexity_with_branches() {
        let source = r#"
fn branchy(x: i32) -> i32 {
    if x > 0 {
        if x > 10 {
            100
        } else {
            10
        }
    } else {
        0
    }
}
"#;
        let facts = facts(source);
        // 1 base + 2 if = 3
        assert_eq!(facts.find_function("branchy").unwrap().cyclomatic_complexity, 3);
    }

    #[test]
    fn test_complexity_with_match() {
        let source = r#"
fn matcher(x: Option<i32>) -> i32 {
    match x {
        Some(v) if v > 0 => v,
        Some(_) => 0,
        None => -1,
    }
}
"#;
        let facts = facts(source);
        // 1 base + 3 arms
        assert!(facts.find_function("matcher").unwrap().cyclomatic_complexity >= 4);
    }

    #[test]
    fn test_stub_detection_empty() {
        let facts = facts("fn empty() {\n}\n");
        let func = facts.find_function("empty").unwrap();
        assert!(func.is_empty);
        assert!(!func.has_only_trivial_body);
    }

    #[test]
    fn test_stub_detection_macros() {
        let source = r#"
fn a() {
    unimplemented!()
}

fn b() {
    todo!("add implementation")
}

fn c() {
    panic!("not implemented")
}

fn d() {
    panic!("index out of range")
}
"#;
        let facts = facts(source);
        assert!(facts.find_function("a").unwrap().raises_not_implemented);
        assert!(facts.find_function("b").unwrap().raises_not_implemented);
        assert!(facts.find_function("c").unwrap().raises_not_implemented);
        assert!(!facts.find_function("d").unwrap().raises_not_implemented);
    }

    #[test]
    fn test_comment_only_body_is_trivial() {
        let facts = facts("fn with_todo() {\n    // TODO: implement this\n}\n");
        let func = facts.find_function("with_todo").unwrap();
        assert!(!func.is_empty);
        assert!(func.has_only_trivial_body);
    }

    #[test]
    fn test_doc_comment_attaches_to_function() {
        let source = r#"
// unrelated

/// Docs.
/// More docs.
#[inline]
fn documented() {}
"#;
        let facts = facts(source);
        assert_eq!(facts.find_function("documented").unwrap().doc_start_line, 4);
    }

    #[test]
    fn test_literal_bindings() {
        let source = r#"
const MAX_CONNECTIONS: usize = 100;

fn user() -> User {
    let token = "abc";
    User {
        id: "12345".to_string(),
        password: String::from("changeme"),
    }
}
"#;
        let facts = facts(source);
        let binding = |value: &str| {
            facts
                .literals
                .iter()
                .find(|l| l.value == value)
                .and_then(|l| l.context.binding.clone())
        };
        assert_eq!(binding("100").as_deref(), Some("MAX_CONNECTIONS"));
        assert_eq!(binding("abc").as_deref(), Some("token"));
        assert_eq!(binding("12345").as_deref(), Some("id"));
        assert_eq!(binding("changeme").as_deref(), Some("password"));

        let id = facts.literals.iter().find(|l| l.value == "12345").unwrap();
        assert_eq!(id.context.function, Some(0));
    }

    #[test]
    fn test_literal_containers() {
        let source = r#"
fn ids() -> Vec<&'static str> {
    let ids = vec!["11111", "22222", "33333"];
    ids
}
"#;
        let facts = facts(source);
        let list = facts
            .literals
            .iter()
            .find(|l| l.kind == LiteralKind::List)
            .unwrap();
        assert_eq!(list.context.binding.as_deref(), Some("ids"));
        assert_eq!(facts.container_elements(list.span.start_byte).count(), 3);
    }

    #[test]
    fn test_extract_imports() {
        let source = r#"
use std::io::{self, Read};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use crate::analysis::Span;
use local::Thing;
use totally_made_up_sdk;
extern crate alloc;

mod local;
"#;
        let facts = facts(source);
        let tops: Vec<(&str, bool)> = facts
            .imports
            .iter()
            .map(|i| (i.top_level(), i.is_relative))
            .collect();

        assert!(tops.contains(&("std", false)));
        assert!(tops.contains(&("serde", false)));
        assert!(tops.contains(&("tokio", false)));
        assert!(tops.contains(&("crate", true)));
        assert!(tops.contains(&("local", true)));
        assert!(tops.contains(&("totally_made_up_sdk", false)));
        assert!(tops.contains(&("alloc", false)));

        let runtime = facts
            .imports
            .iter()
            .find(|i| i.module_name == "tokio::runtime")
            .unwrap();
        assert_eq!(runtime.imported_symbol.as_deref(), Some("Runtime"));
        assert_eq!(runtime.span.start_line, 4);
    }

    #[test]
    fn test_comments_in_order() {
        let analyzer = RustAnalyzer::new();
        let source = "// first\nfn a() {\n    /* second */\n}\n";
        let parsed = analyzer.parse("test.rs", source.as_bytes()).unwrap();
        let comments = analyzer.comments(&parsed);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].start_line, 1);
        assert_eq!(comments[1].start_line, 3);
    }
}
