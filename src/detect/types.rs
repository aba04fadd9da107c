//! Core types for detection results.

use serde::{Deserialize, Serialize};

/// Severity levels for findings, ordered `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// The closed set of finding kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    #[serde(rename = "stub")]
    Stub,
    #[serde(rename = "mock")]
    Mock,
    #[serde(rename = "hallucinated_dependency")]
    HallucinatedDependency,
    #[serde(rename = "complexity_notice")]
    ComplexityNotice,
    #[serde(rename = "lookup_unavailable")]
    LookupUnavailable,
    #[serde(rename = "diagnostic")]
    Diagnostic,
}

impl FindingKind {
    pub const ALL: [FindingKind; 6] = [
        FindingKind::Stub,
        FindingKind::Mock,
        FindingKind::HallucinatedDependency,
        FindingKind::ComplexityNotice,
        FindingKind::LookupUnavailable,
        FindingKind::Diagnostic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::Stub => "stub",
            FindingKind::Mock => "mock",
            FindingKind::HallucinatedDependency => "hallucinated_dependency",
            FindingKind::ComplexityNotice => "complexity_notice",
            FindingKind::LookupUnavailable => "lookup_unavailable",
            FindingKind::Diagnostic => "diagnostic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        FindingKind::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive, 1-indexed line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn line(line: usize) -> Self {
        Self::new(line, line)
    }
}

/// A single detected issue. Built complete by one detector and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    unit_path: String,
    kind: FindingKind,
    severity: Severity,
    line_start: usize,
    line_end: usize,
    message: String,
    evidence: String,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        severity: Severity,
        unit_path: impl Into<String>,
        span: LineSpan,
        message: impl Into<String>,
        evidence: impl Into<String>,
    ) -> Self {
        Self {
            unit_path: unit_path.into(),
            kind,
            severity,
            line_start: span.start,
            line_end: span.end,
            message: message.into(),
            evidence: evidence.into(),
        }
    }

    pub fn unit_path(&self) -> &str {
        &self.unit_path
    }

    pub fn kind(&self) -> FindingKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn span(&self) -> LineSpan {
        LineSpan::new(self.line_start, self.line_end)
    }

    pub fn line_start(&self) -> usize {
        self.line_start
    }

    pub fn line_end(&self) -> usize {
        self.line_end
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn evidence(&self) -> &str {
        &self.evidence
    }

    /// Identity used to merge overlapping findings from different detectors.
    pub(crate) fn dedup_key(&self) -> (String, FindingKind, usize, usize, String) {
        (
            self.unit_path.clone(),
            self.kind,
            self.line_start,
            self.line_end,
            self.evidence.clone(),
        )
    }

    /// Total order: path, line, kind name, then every remaining field.
    pub(crate) fn ordering_key(&self) -> (&str, usize, &'static str, usize, Severity, &str, &str) {
        (
            &self.unit_path,
            self.line_start,
            self.kind.as_str(),
            self.line_end,
            self.severity,
            &self.evidence,
            &self.message,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!("WARNING".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_kind_names() {
        for kind in FindingKind::ALL {
            assert_eq!(FindingKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(FindingKind::parse("mock_data"), None);
    }

    #[test]
    fn test_finding_json_shape() {
        let finding = Finding::new(
            FindingKind::HallucinatedDependency,
            Severity::Error,
            "src/app.py",
            LineSpan::line(12),
            "module 'totally_made_up_sdk' not found in pypi",
            "totally_made_up_sdk",
        );
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["unit_path"], "src/app.py");
        assert_eq!(json["kind"], "hallucinated_dependency");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["line_start"], 12);
        assert_eq!(json["line_end"], 12);
        assert_eq!(json["evidence"], "totally_made_up_sdk");
    }

    #[test]
    fn test_line_span_never_inverted() {
        let span = LineSpan::new(10, 4);
        assert_eq!(span.start, 10);
        assert_eq!(span.end, 10);
    }
}
