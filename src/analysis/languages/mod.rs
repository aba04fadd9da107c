//! Language-specific analyzer implementations.

mod python;
mod rust_lang;

pub use python::PythonAnalyzer;
pub use rust_lang::RustAnalyzer;

use std::collections::BTreeMap;
use std::fmt::Display;

use once_cell::sync::OnceCell;
use tree_sitter::Node;

use super::{
    FactSheet, FunctionFact, ImportFact, Language, LanguageAnalyzer, LiteralFact, LiteralKind,
    ParseError,
};

/// Static storage for Python analyzer.
static PYTHON_ANALYZER: OnceCell<PythonAnalyzer> = OnceCell::new();

/// Static storage for Rust analyzer.
static RUST_ANALYZER: OnceCell<RustAnalyzer> = OnceCell::new();

/// Get the analyzer for a language.
pub fn analyzer_for(language: Language) -> &'static dyn LanguageAnalyzer {
    match language {
        Language::Python => PYTHON_ANALYZER.get_or_init(PythonAnalyzer::new),
        Language::Rust => RUST_ANALYZER.get_or_init(RustAnalyzer::new),
    }
}

/// Get an analyzer for the given file extension.
///
/// Returns None if no analyzer is registered for the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    Language::from_extension(ext).map(analyzer_for)
}

/// Messages in a panic or exception that mark it as a placeholder.
pub(crate) const NOT_IMPLEMENTED_PHRASES: &[&str] = &[
    "not implemented",
    "not yet implemented",
    "unimplemented",
    "todo",
];

pub(crate) fn grammar_error(language: Language, err: impl Display) -> ParseError {
    ParseError::Grammar {
        language,
        message: err.to_string(),
    }
}

/// Named children that are not comments.
pub(crate) fn significant_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| !matches!(n.kind(), "comment" | "line_comment" | "block_comment"))
        .collect()
}

/// Whether any direct child is a comment.
pub(crate) fn has_comment_child(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|n| matches!(n.kind(), "comment" | "line_comment" | "block_comment"));
    found
}

/// Strip string prefixes, quotes and raw-string hashes from a literal.
pub(crate) fn unquote(raw: &str) -> String {
    let Some(start) = raw.find(['"', '\'']) else {
        return raw.to_string();
    };
    let body = raw.trim_end_matches('#');
    for delim in ["\"\"\"", "'''", "\"", "'"] {
        if raw[start..].starts_with(delim)
            && body.len() >= start + 2 * delim.len()
            && body.ends_with(delim)
        {
            return body[start + delim.len()..body.len() - delim.len()].to_string();
        }
    }
    raw.to_string()
}

/// Last identifier-like token of a binding target (`self.password` -> `password`).
pub(crate) fn binding_name(text: &str) -> Option<String> {
    text.rsplit(|c: char| !(c.is_alphanumeric() || c == '_'))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accumulates facts during a tree walk and produces an ordered sheet.
pub(crate) struct FactCollector {
    sheet: FactSheet,
    containers: BTreeMap<usize, LiteralFact>,
}

impl FactCollector {
    pub(crate) fn new(path: &str, language: Language) -> Self {
        Self {
            sheet: FactSheet::empty(path, language),
            containers: BTreeMap::new(),
        }
    }

    pub(crate) fn push_function(&mut self, function: FunctionFact) -> usize {
        self.sheet.functions.push(function);
        self.sheet.functions.len() - 1
    }

    pub(crate) fn push_literal(&mut self, literal: LiteralFact) {
        self.sheet.literals.push(literal);
    }

    /// Record a container that becomes a list fact once an element refers to it.
    pub(crate) fn container(&mut self, literal: LiteralFact) {
        debug_assert_eq!(literal.kind, LiteralKind::List);
        self.containers.entry(literal.span.start_byte).or_insert(literal);
    }

    pub(crate) fn push_import(&mut self, import: ImportFact) {
        self.sheet.imports.push(import);
    }

    pub(crate) fn local_module(&mut self, name: &str) {
        self.sheet.local_modules.insert(name.to_string());
    }

    pub(crate) fn finish(mut self) -> FactSheet {
        let referenced: Vec<usize> = self
            .sheet
            .literals
            .iter()
            .filter_map(|l| l.context.container)
            .collect();
        for start in referenced {
            if let Some(list) = self.containers.remove(&start) {
                self.sheet.literals.push(list);
            }
        }
        self.sheet
            .literals
            .sort_by(|a, b| (a.span.start_byte, a.kind).cmp(&(b.span.start_byte, b.kind)));
        self.sheet.imports.sort_by_key(|i| i.span.start_byte);

        let local_modules = &self.sheet.local_modules;
        for import in &mut self.sheet.imports {
            if !import.is_relative && local_modules.contains(import.top_level()) {
                import.is_relative = true;
            }
        }
        self.sheet
    }
}
