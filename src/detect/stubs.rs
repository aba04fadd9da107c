//! Stub/hollow function detection over extracted function facts.
//!
//! Detects functions that appear to be stubs or placeholder implementations:
//! - Empty function bodies
//! - Bodies that only raise a not-implemented signal
//! - Bodies with only pass-equivalent no-ops, docstrings and comments
//! - Bodies returning a constant while carrying a work marker
//!
//! Every work-marker occurrence is reported as well, at a higher severity
//! when it sits inside a function that is itself a stub.

use crate::analysis::{FactSheet, FunctionFact};

use super::{Detector, Finding, FindingKind, LineSpan, Severity};

/// Kind of hollow/stub body detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HollowBodyKind {
    /// Empty function body (no statements, no comments).
    Empty,
    /// Body only raises NotImplementedError / todo!() / unimplemented!().
    NotImplemented,
    /// Body only holds pass, `...`, a docstring, comments or a bare return.
    Trivial,
    /// Body only returns a constant and the function carries a work marker.
    ConstantReturn,
}

impl HollowBodyKind {
    /// Get a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            HollowBodyKind::Empty => "empty function body",
            HollowBodyKind::NotImplemented => "only raises a not-implemented error",
            HollowBodyKind::Trivial => "only contains a no-op, docstring or comments",
            HollowBodyKind::ConstantReturn => "only returns a constant next to a work marker",
        }
    }
}

impl std::fmt::Display for HollowBodyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Configuration for stub detection.
#[derive(Debug, Clone)]
pub struct StubDetectorConfig {
    /// Skip functions with these exact names.
    pub skip_functions: Vec<String>,
    /// Functions at or above this complexity have real logic and are never stubs.
    pub real_logic_complexity: u32,
}

impl Default for StubDetectorConfig {
    fn default() -> Self {
        Self {
            skip_functions: vec!["main".to_string(), "__init__".to_string()],
            real_logic_complexity: 3,
        }
    }
}

/// Stub detector that analyzes function bodies for hollow implementations.
pub struct StubDetector {
    config: StubDetectorConfig,
}

impl StubDetector {
    /// Create a new stub detector with default configuration.
    pub fn new() -> Self {
        Self::with_config(StubDetectorConfig::default())
    }

    /// Create a stub detector with custom configuration.
    pub fn with_config(config: StubDetectorConfig) -> Self {
        Self { config }
    }

    /// Classify a function as a stub type, if applicable.
    pub fn classify(&self, function: &FunctionFact) -> Option<HollowBodyKind> {
        if function.is_abstract || self.config.skip_functions.contains(&function.name) {
            return None;
        }
        if function.cyclomatic_complexity >= self.config.real_logic_complexity {
            return None;
        }

        // Check in order of severity
        if function.is_empty {
            return Some(HollowBodyKind::Empty);
        }
        if function.raises_not_implemented {
            return Some(HollowBodyKind::NotImplemented);
        }
        if function.has_only_trivial_body {
            return Some(HollowBodyKind::Trivial);
        }
        if function.returns_constant_only && !function.comment_markers.is_empty() {
            return Some(HollowBodyKind::ConstantReturn);
        }
        None
    }
}

impl Default for StubDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StubDetector {
    fn name(&self) -> &'static str {
        "stubs"
    }

    fn detect(&self, sheet: &FactSheet) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut flagged = vec![false; sheet.functions.len()];

        for (index, function) in sheet.functions.iter().enumerate() {
            let Some(kind) = self.classify(function) else {
                continue;
            };
            flagged[index] = true;
            findings.push(Finding::new(
                FindingKind::Stub,
                Severity::Warning,
                &sheet.path,
                LineSpan::new(function.span.start_line, function.span.end_line),
                format!("function '{}' is a stub: {}", function.qualified_name, kind),
                function.qualified_name.clone(),
            ));
        }

        for marker in &sheet.markers {
            let owner = marker.function.map(|i| &sheet.functions[i]);
            let in_stub = marker.function.is_some_and(|i| flagged[i]);
            let message = match owner {
                Some(function) => format!(
                    "{} marker in function '{}'",
                    marker.marker, function.qualified_name
                ),
                None => format!("{} marker", marker.marker),
            };
            findings.push(Finding::new(
                FindingKind::Stub,
                if in_stub { Severity::Warning } else { Severity::Info },
                &sheet.path,
                LineSpan::line(marker.line),
                message,
                marker.text.clone(),
            ));
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Extractor, SourceUnit};

    fn detect(path: &str, source: &str) -> Vec<Finding> {
        let language = if path.ends_with(".py") { "python" } else { "rust" };
        let unit = SourceUnit::new(path, source, language);
        let sheet = Extractor::default().extract(&unit).unwrap();
        StubDetector::new().detect(&sheet)
    }

    fn stub_evidence(findings: &[Finding]) -> Vec<&str> {
        findings
            .iter()
            .filter(|f| f.message().starts_with("function"))
            .map(|f| f.evidence())
            .collect()
    }

    #[test]
    fn test_detects_python_stubs() {
        let source = r#"
def empty_pass():
    pass

def raises():
    raise NotImplementedError()

def real(x):
    return compute(x)
"#;
        let findings = detect("a.py", source);
        assert_eq!(stub_evidence(&findings), vec!["empty_pass", "raises"]);
        assert!(findings.iter().all(|f| f.severity() == Severity::Warning));
    }

    #[test]
    fn test_single_call_is_not_stub() {
        let findings = detect("a.rs", "fn run() {\n    server::start();\n}\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_constant_return_needs_marker() {
        let source = r#"
fn plain() -> bool {
    true
}

// HACK: skip validation
fn marked() -> bool {
    true
}
"#;
        let findings = detect("a.rs", source);
        assert_eq!(stub_evidence(&findings), vec!["marked"]);

        let marker = findings
            .iter()
            .find(|f| f.message().starts_with("HACK"))
            .unwrap();
        assert_eq!(marker.severity(), Severity::Warning);
        assert_eq!(marker.line_start(), 6);
    }

    #[test]
    fn test_marker_outside_stub_is_info() {
        let source = r#"
def compute(items):
    # TODO: cache this
    total = 0
    for item in items:
        total += item
    return total
"#;
        let findings = detect("a.py", source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity(), Severity::Info);
        assert_eq!(findings[0].evidence(), "# TODO: cache this");
    }

    #[test]
    fn test_skips_abstract_and_main() {
        let source = r#"
from abc import abstractmethod

class Base:
    @abstractmethod
    def run(self):
        raise NotImplementedError

def main():
    pass
"#;
        assert!(stub_evidence(&detect("a.py", source)).is_empty());
    }

    #[test]
    fn test_real_logic_is_never_stub() {
        let detector = StubDetector::with_config(StubDetectorConfig {
            skip_functions: vec![],
            real_logic_complexity: 1,
        });
        let unit = SourceUnit::new("a.py", "def f():\n    pass\n", "python");
        let sheet = Extractor::default().extract(&unit).unwrap();
        assert!(detector.detect(&sheet).is_empty());
    }
}
