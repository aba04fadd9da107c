//! Cyclomatic complexity notices.

use crate::analysis::FactSheet;

use super::{Detector, Finding, FindingKind, LineSpan, Severity};

/// Emits a [`FindingKind::ComplexityNotice`] for functions above a threshold.
pub struct ComplexityScorer {
    threshold: u32,
}

impl ComplexityScorer {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }
}

impl Detector for ComplexityScorer {
    fn name(&self) -> &'static str {
        "complexity"
    }

    fn detect(&self, sheet: &FactSheet) -> Vec<Finding> {
        sheet
            .functions
            .iter()
            .filter(|f| f.cyclomatic_complexity > self.threshold)
            .map(|f| {
                Finding::new(
                    FindingKind::ComplexityNotice,
                    Severity::Info,
                    &sheet.path,
                    LineSpan::new(f.span.start_line, f.span.end_line),
                    format!(
                        "function '{}' has cyclomatic complexity {} (threshold {})",
                        f.qualified_name, f.cyclomatic_complexity, self.threshold
                    ),
                    f.qualified_name.clone(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Extractor, SourceUnit};

    const SOURCE: &str = r#"
def simple(x):
    return x + 1

def branchy(x, y):
    if x and y:
        return 1
    if x or y:
        return 2
    for i in range(x):
        if i:
            return 3
    return 4
"#;

    fn detect(threshold: u32) -> Vec<Finding> {
        let unit = SourceUnit::new("a.py", SOURCE, "python");
        let sheet = Extractor::default().extract(&unit).unwrap();
        ComplexityScorer::new(threshold).detect(&sheet)
    }

    #[test]
    fn test_notice_above_threshold() {
        // branchy: 1 + 3 if + and + or + for = 7
        let findings = detect(5);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].evidence(), "branchy");
        assert_eq!(findings[0].severity(), Severity::Info);
        assert_eq!(findings[0].line_start(), 5);
        assert!(findings[0].message().contains("complexity 7"));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(detect(7).is_empty());
        assert_eq!(detect(6).len(), 1);
    }
}
