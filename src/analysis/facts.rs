//! Fact structures extracted from a source unit.
//!
//! A [`FactSheet`] is recomputed from scratch for every unit and never
//! mutated after extraction. Detectors only ever read it.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::Serialize;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    /// Whether `line` falls inside this span.
    pub fn contains_line(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Languages with a registered analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Rust,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Rust => "rust",
        }
    }

    /// Resolve a language tag such as `"python"` or `"rs"`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Language::Python),
            "rust" | "rs" => Some(Language::Rust),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" | "pyi" => Some(Language::Python),
            "rs" => Some(Language::Rust),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source file handed to the scanner. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    path: String,
    text: String,
    language: String,
}

impl SourceUnit {
    /// Build a unit with an explicit language tag.
    pub fn new(path: impl Into<String>, text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            language: language.into(),
        }
    }

    /// Build a unit whose language tag is inferred from the file extension.
    ///
    /// Returns `None` when the extension belongs to no supported language.
    pub fn detect(path: impl Into<String>, text: impl Into<String>) -> Option<Self> {
        let path = path.into();
        let language = Path::new(&path)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Language::from_extension)?;
        Some(Self::new(path, text, language.as_str()))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The raw language tag this unit was created with.
    pub fn language_tag(&self) -> &str {
        &self.language
    }
}

/// Control flow information for cyclomatic complexity calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlowInfo {
    /// Number of if statements / expressions (including `elif`).
    pub if_count: usize,
    /// Number of for/while/loop constructs.
    pub loop_count: usize,
    /// Number of match statements.
    pub switch_count: usize,
    /// Number of case clauses / match arms.
    pub case_count: usize,
    /// Number of && / `and` operators.
    pub and_count: usize,
    /// Number of || / `or` operators.
    pub or_count: usize,
    /// Number of conditional expressions.
    pub ternary_count: usize,
    /// Number of except clauses and `?` operators.
    pub catch_count: usize,
}

impl ControlFlowInfo {
    /// Calculate cyclomatic complexity.
    ///
    /// CC = 1 + decision_points
    /// Decision points: if, loops, case arms, &&, ||, ternaries, catch/`?`.
    /// A `match` itself is not a decision point; its arms are.
    pub fn cyclomatic_complexity(&self) -> u32 {
        let decision_points = self.if_count
            + self.loop_count
            + self.case_count
            + self.and_count
            + self.or_count
            + self.ternary_count
            + self.catch_count;

        1 + decision_points as u32
    }
}

/// Facts about a single function or method.
#[derive(Debug, Clone)]
pub struct FunctionFact {
    /// Bare function name.
    pub name: String,
    /// `Type.name` for methods, otherwise the bare name.
    pub qualified_name: String,
    /// Span of the whole definition (signature and body).
    pub span: Span,
    /// First line of the doc comments or attributes attached to the function.
    pub doc_start_line: usize,
    /// Number of lines the body spans.
    pub body_line_count: usize,
    /// Statements in the body, excluding comments and docstrings.
    pub statement_count: usize,
    pub control_flow: ControlFlowInfo,
    pub cyclomatic_complexity: u32,
    /// Body has no statements and no comments at all.
    pub is_empty: bool,
    /// Body is only pass-equivalent no-ops, docstrings and comments.
    pub has_only_trivial_body: bool,
    /// Body unconditionally raises a not-implemented signal.
    pub raises_not_implemented: bool,
    /// Body only returns a constant value.
    pub returns_constant_only: bool,
    /// Declared abstract (`@abstractmethod`) or a trait method without a body.
    pub is_abstract: bool,
    /// Work markers found in the body or attached doc comment.
    pub comment_markers: BTreeSet<String>,
}

impl FunctionFact {
    /// Whether `line` is within the function or its attached documentation.
    pub fn covers_line(&self, line: usize) -> bool {
        self.doc_start_line <= line && line <= self.span.end_line
    }
}

/// Kind of a literal fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LiteralKind {
    String,
    Number,
    List,
}

/// Where a literal sits in the code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralContext {
    /// Field, variable, keyword or key name the literal is bound to.
    pub binding: Option<String>,
    /// Start byte of the enclosing container literal, if any.
    pub container: Option<usize>,
    /// Index into [`FactSheet::functions`] of the enclosing function.
    pub function: Option<usize>,
}

/// A string, numeric or list literal.
///
/// `value` holds the unquoted contents for strings and the source text for
/// numbers and lists.
#[derive(Debug, Clone)]
pub struct LiteralFact {
    pub value: String,
    pub kind: LiteralKind,
    pub span: Span,
    pub context: LiteralContext,
}

/// An import statement. One fact per imported module.
#[derive(Debug, Clone)]
pub struct ImportFact {
    /// Dotted (`os.path`) or path (`serde::de`) module name.
    pub module_name: String,
    /// Symbol imported from the module, if any.
    pub imported_symbol: Option<String>,
    /// `from . import x`, `use crate::...`, `use super::...`, local `mod`.
    pub is_relative: bool,
    pub span: Span,
}

impl ImportFact {
    /// The top-level package name that owns this import.
    pub fn top_level(&self) -> &str {
        self.module_name
            .split(|c| c == '.' || c == ':')
            .find(|s| !s.is_empty())
            .unwrap_or(&self.module_name)
    }
}

/// One work-marker occurrence (TODO, FIXME, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerFact {
    pub marker: String,
    /// The trimmed comment line containing the marker.
    pub text: String,
    pub line: usize,
    /// Index of the innermost function owning the marker.
    pub function: Option<usize>,
}

/// All facts extracted from a single source unit.
#[derive(Debug, Clone)]
pub struct FactSheet {
    pub path: String,
    pub language: Language,
    /// Functions in source order.
    pub functions: Vec<FunctionFact>,
    /// Literals in source order.
    pub literals: Vec<LiteralFact>,
    /// Imports in source order.
    pub imports: Vec<ImportFact>,
    /// Marker occurrences in source order.
    pub markers: Vec<MarkerFact>,
    /// Names declared as local modules (`mod foo;`).
    pub local_modules: BTreeSet<String>,
}

impl FactSheet {
    /// Create empty facts for a unit.
    pub fn empty(path: &str, language: Language) -> Self {
        Self {
            path: path.to_string(),
            language,
            functions: Vec::new(),
            literals: Vec::new(),
            imports: Vec::new(),
            markers: Vec::new(),
            local_modules: BTreeSet::new(),
        }
    }

    /// Find a function by bare name.
    pub fn find_function(&self, name: &str) -> Option<&FunctionFact> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Index of the innermost function covering `line`.
    pub fn function_at_line(&self, line: usize) -> Option<usize> {
        self.functions
            .iter()
            .enumerate()
            .filter(|(_, f)| f.covers_line(line))
            .max_by_key(|(_, f)| f.span.start_byte)
            .map(|(i, _)| i)
    }

    /// Elements of the container literal that starts at `container`.
    pub fn container_elements(&self, container: usize) -> impl Iterator<Item = &LiteralFact> {
        self.literals
            .iter()
            .filter(move |l| l.context.container == Some(container))
    }
}
