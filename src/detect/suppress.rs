//! Inline suppression of findings via comments.
//!
//! Supports suppression comments like:
//! - `// hollowcheck:ignore <kind> - <reason>`
//! - `# hollowcheck:ignore-next-line <kind> - <reason>`
//! - `/* hollowcheck:ignore-file <kind> - <reason> */`
//!
//! `<kind>` is a finding kind name (`stub`, `mock`, ...) or `*` for all.

use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;

use super::{Finding, FindingKind};
use crate::analysis::SourceUnit;

/// File-level directives only count within this many leading lines unless
/// they sit in the file's leading comment block.
const FILE_DIRECTIVE_WINDOW: usize = 10;

/// How a suppression applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionType {
    /// Applies to findings starting on the same line
    Line,
    /// Applies to findings starting on the next line
    NextLine,
    /// Applies to the entire unit
    File,
}

/// An inline suppression directive.
#[derive(Debug, Clone, Serialize)]
pub struct Suppression {
    /// Kind name or "*"
    pub rule: String,
    pub reason: String,
    pub unit_path: String,
    /// Line of the directive (0 for file-level)
    pub line: usize,
    pub suppression_type: SuppressionType,
}

/// A finding that was suppressed, with the directive that matched it.
#[derive(Debug, Clone, Serialize)]
pub struct SuppressedFinding {
    pub finding: Finding,
    pub suppression: Suppression,
}

lazy_static::lazy_static! {
    static ref SUPPRESSION_PATTERNS: Vec<Regex> = vec![
        // Block comment style: /* hollowcheck:... */
        Regex::new(r"/\*\s*hollowcheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*?))?\s*\*/").unwrap(),
        // Rust style: // hollowcheck:...
        Regex::new(r"//\s*hollowcheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*))?").unwrap(),
        // Python style: # hollowcheck:...
        Regex::new(r"#\s*hollowcheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*))?").unwrap(),
    ];
}

/// Parse suppression directives from a unit's text.
pub fn parse_suppressions(unit_path: &str, content: &str) -> Vec<Suppression> {
    let mut suppressions = Vec::new();
    let mut in_header = true;

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx + 1;
        let trimmed = line.trim();

        if in_header && !is_comment_or_empty(trimmed) {
            in_header = false;
        }

        let Some(caps) = SUPPRESSION_PATTERNS.iter().find_map(|p| p.captures(line)) else {
            continue;
        };
        let directive = caps.get(1).map_or("", |m| m.as_str());
        let rule = caps.get(2).map_or("", |m| m.as_str());
        let reason = caps
            .get(3)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        let suppression_type = match directive {
            "ignore-file" => {
                if !in_header && line_number > FILE_DIRECTIVE_WINDOW {
                    continue;
                }
                SuppressionType::File
            }
            "ignore-next-line" => SuppressionType::NextLine,
            "ignore" => {
                // Alone on its line, the directive covers the following line.
                let start = caps.get(0).map_or(0, |m| m.start());
                if line[..start].trim().is_empty() {
                    SuppressionType::NextLine
                } else {
                    SuppressionType::Line
                }
            }
            _ => continue,
        };

        suppressions.push(Suppression {
            rule: rule.to_string(),
            reason,
            unit_path: unit_path.to_string(),
            line: if suppression_type == SuppressionType::File {
                0
            } else {
                line_number
            },
            suppression_type,
        });
    }

    suppressions
}

fn is_comment_or_empty(line: &str) -> bool {
    line.is_empty()
        || ["//", "#", "/*", "*", "\"\"\""]
            .iter()
            .any(|prefix| line.starts_with(prefix))
}

/// Check if a finding matches a suppression.
pub fn matches_suppression(finding: &Finding, suppression: &Suppression) -> bool {
    if finding.unit_path() != suppression.unit_path {
        return false;
    }

    if suppression.rule != "*" && FindingKind::parse(&suppression.rule) != Some(finding.kind()) {
        return false;
    }

    match suppression.suppression_type {
        SuppressionType::File => true,
        SuppressionType::Line => finding.line_start() == suppression.line,
        SuppressionType::NextLine => finding.line_start() == suppression.line + 1,
    }
}

/// Separate findings into active and suppressed.
pub fn filter_suppressed(
    findings: Vec<Finding>,
    suppressions: &HashMap<String, Vec<Suppression>>,
) -> (Vec<Finding>, Vec<SuppressedFinding>) {
    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for finding in findings {
        let matched = suppressions
            .get(finding.unit_path())
            .and_then(|list| list.iter().find(|s| matches_suppression(&finding, s)));
        match matched {
            Some(suppression) => suppressed.push(SuppressedFinding {
                suppression: suppression.clone(),
                finding,
            }),
            None => active.push(finding),
        }
    }

    (active, suppressed)
}

/// Collect suppressions from all units, keyed by unit path.
pub fn collect_suppressions(units: &[SourceUnit]) -> HashMap<String, Vec<Suppression>> {
    units
        .iter()
        .filter_map(|unit| {
            let found = parse_suppressions(unit.path(), unit.text());
            (!found.is_empty()).then(|| (unit.path().to_string(), found))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{LineSpan, Severity};

    fn finding(kind: FindingKind, line: usize) -> Finding {
        Finding::new(kind, Severity::Warning, "app.py", LineSpan::line(line), "msg", "ev")
    }

    #[test]
    fn test_parse_python_style() {
        let content = r#"# hollowcheck:ignore-file mock - fixture data

def handler():
    pass  # hollowcheck:ignore stub - intentional
"#;
        let suppressions = parse_suppressions("app.py", content);
        assert_eq!(suppressions.len(), 2);
        assert_eq!(suppressions[0].suppression_type, SuppressionType::File);
        assert_eq!(suppressions[0].rule, "mock");
        assert_eq!(suppressions[0].reason, "fixture data");
        assert_eq!(suppressions[1].suppression_type, SuppressionType::Line);
        assert_eq!(suppressions[1].line, 4);
    }

    #[test]
    fn test_parse_standalone_ignore_is_next_line() {
        let content = "fn main() {\n    // hollowcheck:ignore mock\n    let key = \"changeme\";\n}\n";
        let suppressions = parse_suppressions("main.rs", content);
        assert_eq!(suppressions.len(), 1);
        assert_eq!(suppressions[0].suppression_type, SuppressionType::NextLine);
        assert_eq!(suppressions[0].line, 2);
    }

    #[test]
    fn test_parse_block_comment() {
        let content = "/* hollowcheck:ignore-next-line * - generated */\nfn a() {}\n";
        let suppressions = parse_suppressions("gen.rs", content);
        assert_eq!(suppressions.len(), 1);
        assert_eq!(suppressions[0].rule, "*");
        assert_eq!(suppressions[0].reason, "generated");
    }

    #[test]
    fn test_late_file_directive_ignored() {
        let mut content = String::from("import os\n");
        for _ in 0..12 {
            content.push_str("x = 1\n");
        }
        content.push_str("# hollowcheck:ignore-file stub\n");
        assert!(parse_suppressions("late.py", &content).is_empty());
    }

    #[test]
    fn test_matches_suppression() {
        let f = finding(FindingKind::Mock, 5);
        let make = |rule: &str, line, suppression_type| Suppression {
            rule: rule.to_string(),
            reason: String::new(),
            unit_path: "app.py".to_string(),
            line,
            suppression_type,
        };

        assert!(matches_suppression(&f, &make("mock", 0, SuppressionType::File)));
        assert!(matches_suppression(&f, &make("mock", 4, SuppressionType::NextLine)));
        assert!(matches_suppression(&f, &make("*", 5, SuppressionType::Line)));
        assert!(!matches_suppression(&f, &make("stub", 0, SuppressionType::File)));
        assert!(!matches_suppression(&f, &make("mock", 6, SuppressionType::Line)));
    }

    #[test]
    fn test_filter_suppressed() {
        let units = vec![SourceUnit::new(
            "app.py",
            "x = 1\n# hollowcheck:ignore-next-line mock - demo\ny = 2\n",
            "python",
        )];
        let suppressions = collect_suppressions(&units);
        let (active, suppressed) = filter_suppressed(
            vec![finding(FindingKind::Mock, 3), finding(FindingKind::Mock, 1)],
            &suppressions,
        );
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].line_start(), 1);
        assert_eq!(suppressed.len(), 1);
        assert_eq!(suppressed[0].suppression.reason, "demo");
    }
}
