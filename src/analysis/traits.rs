//! Core traits for language analysis.

use thiserror::Error;

use super::{FactSheet, Language};

/// Why a unit could not be turned into a fact sheet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{path}: unsupported language '{language}'")]
    UnsupportedLanguage { path: String, language: String },

    #[error("{path}:{line}: syntax error")]
    Syntax { path: String, line: usize },

    #[error("{language} grammar error: {message}")]
    Grammar { language: Language, message: String },
}

impl ParseError {
    /// Line the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// This is kept separate from FactSheet to allow reusing the tree
/// for multiple analysis passes without re-parsing.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The unit path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// First line (1-indexed) holding an ERROR or MISSING node.
    pub fn first_error_line(&self) -> Option<usize> {
        let root = self.tree.root_node();
        if !root.has_error() {
            return None;
        }
        let mut cursor = root.walk();
        let mut stack = vec![root];
        let mut first: Option<usize> = None;
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                let line = node.start_position().row + 1;
                first = Some(first.map_or(line, |f| f.min(line)));
                continue;
            }
            if node.has_error() {
                stack.extend(node.children(&mut cursor));
            }
        }
        first.or(Some(root.start_position().row + 1))
    }
}

/// A comment (or docstring) and the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentText {
    pub start_line: usize,
    pub text: String,
}

/// Language-specific analyzer trait.
///
/// Each language implements this trait to provide AST-backed fact
/// extraction. Marker scanning is language-independent and happens in
/// [`super::Extractor`] over the comments returned here.
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create parsers as
/// needed.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language this analyzer handles.
    fn language(&self) -> Language;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse source text into a tree-sitter tree.
    ///
    /// Partial parse errors are still returned as a valid tree with ERROR
    /// nodes; the caller decides whether to reject them.
    fn parse(&self, path: &str, source: &[u8]) -> Result<ParsedFile, ParseError>;

    /// Extract functions, literals, imports and local modules.
    ///
    /// Markers are left empty; they are filled in by the extractor.
    fn extract_facts(&self, parsed: &ParsedFile) -> Result<FactSheet, ParseError>;

    /// All comments and docstrings, in source order.
    fn comments(&self, parsed: &ParsedFile) -> Vec<CommentText>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
