//! AST-backed code analysis module.
//!
//! This module provides a language-agnostic interface for extracting "facts"
//! from source code using tree-sitter. Facts include:
//! - Functions with body shape, complexity and attached work markers
//! - String, numeric and list literals with their binding context
//! - Imports/dependencies
//! - Work-marker comments (TODO, FIXME, ...)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ SourceUnit      │────▶│ Extractor    │────▶│ FactSheet     │
//! └─────────────────┘     │ (Python,     │     │ (Functions,   │
//!                         │  Rust)       │     │  Literals,    │
//!                         └──────────────┘     │  Imports, ...)│
//!                                              └───────────────┘
//!                                                      │
//!                                                      ▼
//!                                              ┌───────────────┐
//!                                              │ Detectors     │
//!                                              └───────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/`
//! 2. Implement the `LanguageAnalyzer` trait
//! 3. Add a variant to [`Language`] and register the analyzer in `languages/mod.rs`

mod extractor;
mod facts;
mod languages;
mod traits;

pub use extractor::{Extractor, DEFAULT_MARKERS};
pub use facts::{
    ControlFlowInfo, FactSheet, FunctionFact, ImportFact, Language, LiteralContext, LiteralFact,
    LiteralKind, MarkerFact, SourceUnit, Span,
};
pub use languages::{analyzer_for, get_analyzer, PythonAnalyzer, RustAnalyzer};
pub use traits::{CommentText, LanguageAnalyzer, ParseError, ParsedFile};
