//! Aggregation and output formatting for scan results.
//!
//! The aggregator turns raw findings from every detector and unit into one
//! [`Report`]: suppressions applied, duplicates merged, order fixed.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: 2.1.0 log for code-scanning integrations

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};

use colored::*;
use serde::Serialize;

use crate::detect::{
    filter_suppressed, Finding, FindingKind, Severity, SuppressedFinding, Suppression,
    SuppressionType,
};

/// Counts over the final finding set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Every kind is present, zero or not.
    pub by_kind: BTreeMap<FindingKind, usize>,
    /// Every severity is present, zero or not.
    pub by_severity: BTreeMap<Severity, usize>,
    pub units_scanned: usize,
    pub units_skipped: usize,
    pub suppressed: usize,
}

/// The result of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub version: &'static str,
    /// Ordered by (unit path, line, kind name), then every other field.
    pub findings: Vec<Finding>,
    pub summary: Summary,
    #[serde(skip)]
    pub suppressed: Vec<SuppressedFinding>,
}

impl Report {
    /// Merge raw findings into a report.
    ///
    /// Findings that share unit, kind, span and evidence collapse into one,
    /// keeping the highest severity.
    pub fn aggregate(
        findings: Vec<Finding>,
        suppressions: &HashMap<String, Vec<Suppression>>,
        units_scanned: usize,
        units_skipped: usize,
    ) -> Self {
        let (active, mut suppressed) = filter_suppressed(findings, suppressions);

        let mut merged: BTreeMap<_, Finding> = BTreeMap::new();
        for finding in active {
            match merged.get(&finding.dedup_key()) {
                Some(existing) if !outranks(&finding, existing) => {}
                _ => {
                    merged.insert(finding.dedup_key(), finding);
                }
            }
        }

        let mut findings: Vec<Finding> = merged.into_values().collect();
        findings.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));
        suppressed.sort_by(|a, b| a.finding.ordering_key().cmp(&b.finding.ordering_key()));

        let mut by_kind: BTreeMap<FindingKind, usize> =
            FindingKind::ALL.into_iter().map(|k| (k, 0)).collect();
        let mut by_severity: BTreeMap<Severity, usize> =
            [Severity::Info, Severity::Warning, Severity::Error]
                .into_iter()
                .map(|s| (s, 0))
                .collect();
        for finding in &findings {
            *by_kind.entry(finding.kind()).or_default() += 1;
            *by_severity.entry(finding.severity()).or_default() += 1;
        }

        Self {
            version: env!("CARGO_PKG_VERSION"),
            findings,
            summary: Summary {
                by_kind,
                by_severity,
                units_scanned,
                units_skipped,
                suppressed: suppressed.len(),
            },
            suppressed,
        }
    }

    pub fn count(&self, kind: FindingKind) -> usize {
        self.summary.by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn has_errors(&self) -> bool {
        self.summary
            .by_severity
            .get(&Severity::Error)
            .is_some_and(|n| *n > 0)
    }

    /// Findings of one kind, in report order.
    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind() == kind)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `a` replaces `b` when it is more severe; ties go to the smaller message
/// so the winner does not depend on detector order.
fn outranks(a: &Finding, b: &Finding) -> bool {
    (a.severity(), std::cmp::Reverse(a.message())) > (b.severity(), std::cmp::Reverse(b.message()))
}

/// Write a report in JSON format.
pub fn write_json<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    let json = report.to_json().map_err(io::Error::other)?;
    writeln!(out, "{}", json)
}

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const INFO_URI: &str = "https://github.com/zen-systems/hollowcheck";

#[derive(Serialize)]
struct SarifLog<'a> {
    version: &'static str,
    #[serde(rename = "$schema")]
    schema: &'static str,
    runs: Vec<SarifRun<'a>>,
}

#[derive(Serialize)]
struct SarifRun<'a> {
    tool: SarifTool,
    results: Vec<SarifResult<'a>>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    information_uri: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: &'static str,
    name: &'static str,
    short_description: SarifText<'static>,
    full_description: SarifText<'static>,
    default_configuration: SarifRuleConfig,
}

#[derive(Serialize)]
struct SarifRuleConfig {
    level: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult<'a> {
    rule_id: &'static str,
    rule_index: usize,
    level: &'static str,
    message: SarifText<'a>,
    locations: Vec<SarifLocation<'a>>,
}

#[derive(Serialize)]
struct SarifText<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation<'a> {
    physical_location: SarifPhysicalLocation<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation<'a> {
    artifact_location: SarifArtifact<'a>,
    region: SarifRegion,
}

#[derive(Serialize)]
struct SarifArtifact<'a> {
    uri: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: usize,
    end_line: usize,
}

/// Rule metadata for one finding kind: name, short and full description,
/// default severity.
fn rule_info(kind: FindingKind) -> (&'static str, &'static str, &'static str, Severity) {
    match kind {
        FindingKind::Stub => (
            "Stub",
            "Detects stub bodies and TODO/FIXME/HACK/XXX markers",
            "Identifies functions whose body does no work (pass, todo!(), raising not-implemented) and comments marking unfinished code.",
            Severity::Warning,
        ),
        FindingKind::Mock => (
            "MockData",
            "Detects mock/placeholder data like example.com, fake IDs",
            "Identifies hardcoded placeholder values such as example-domain emails, lorem ipsum, masked phone numbers, default secrets and sequential IDs.",
            Severity::Warning,
        ),
        FindingKind::HallucinatedDependency => (
            "HallucinatedDependency",
            "Detects imports of packages that don't exist in public registries",
            "Identifies imports whose top-level package is neither standard library, local, nor published on its registry (PyPI, crates.io).",
            Severity::Error,
        ),
        FindingKind::ComplexityNotice => (
            "Complexity",
            "Reports functions above the cyclomatic complexity threshold",
            "Counts decision points per function and reports those whose cyclomatic complexity exceeds the configured threshold.",
            Severity::Info,
        ),
        FindingKind::LookupUnavailable => (
            "LookupUnavailable",
            "An import could not be verified against its registry",
            "The registry lookup for an imported package failed, timed out, or was skipped, so the import was neither confirmed nor flagged.",
            Severity::Info,
        ),
        FindingKind::Diagnostic => (
            "Diagnostic",
            "A unit could not be fully analyzed",
            "A source unit failed to parse or a detector failed on it; findings for that unit may be incomplete.",
            Severity::Warning,
        ),
    }
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

/// Write a report as a SARIF 2.1.0 log with one rule per finding kind.
pub fn write_sarif<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    let rules = FindingKind::ALL
        .into_iter()
        .map(|kind| {
            let (name, short, full, severity) = rule_info(kind);
            SarifRule {
                id: kind.as_str(),
                name,
                short_description: SarifText { text: short },
                full_description: SarifText { text: full },
                default_configuration: SarifRuleConfig {
                    level: sarif_level(severity),
                },
            }
        })
        .collect();

    let results = report
        .findings
        .iter()
        .map(|f| SarifResult {
            rule_id: f.kind().as_str(),
            rule_index: FindingKind::ALL.iter().position(|k| *k == f.kind()).unwrap_or(0),
            level: sarif_level(f.severity()),
            message: SarifText { text: f.message() },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifact { uri: f.unit_path() },
                    region: SarifRegion {
                        start_line: f.line_start(),
                        end_line: f.line_end(),
                    },
                },
            }],
        })
        .collect();

    let log = SarifLog {
        version: SARIF_VERSION,
        schema: SARIF_SCHEMA,
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "hollowcheck",
                    version: report.version,
                    information_uri: INFO_URI,
                    rules,
                },
            },
            results,
        }],
    };
    let json = serde_json::to_string_pretty(&log).map_err(io::Error::other)?;
    writeln!(out, "{}", json)
}

/// Write a report in pretty (human-readable) format.
pub fn write_pretty<W: Write>(
    out: &mut W,
    path: &str,
    report: &Report,
    show_suppressed: bool,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {} v{}", "hollowcheck".cyan().bold(), report.version)?;
    writeln!(out)?;
    writeln!(out, "  {}{}", "Scanning: ".dimmed(), path)?;
    writeln!(
        out,
        "  {}{} scanned, {} skipped",
        "Units:    ".dimmed(),
        report.summary.units_scanned,
        report.summary.units_skipped
    )?;
    writeln!(out)?;

    if !report.findings.is_empty() {
        write_findings(out, &report.findings)?;
        writeln!(out)?;
    }

    if !report.suppressed.is_empty() {
        write_suppressed_summary(out, &report.suppressed, show_suppressed)?;
        writeln!(out)?;
    }

    write_breakdown(out, report)?;
    writeln!(out)?;

    if report.has_errors() {
        writeln!(out, "  {}", "✗ FAIL".red())?;
    } else {
        writeln!(out, "  {}", "✓ PASS".green())?;
    }
    writeln!(out)
}

fn write_findings<W: Write>(out: &mut W, findings: &[Finding]) -> io::Result<()> {
    writeln!(out, "  {} ({}):", "Findings".bold(), findings.len())?;
    writeln!(out)?;

    for f in findings {
        let location = if f.line_end() > f.line_start() {
            format!(":{}-{}", f.line_start(), f.line_end())
        } else {
            format!(":{}", f.line_start())
        };
        writeln!(
            out,
            "    {}   {:<24}{}{}",
            severity_tag(f.severity()),
            f.kind().as_str().dimmed(),
            f.unit_path().blue(),
            location.dimmed()
        )?;
        writeln!(out, "            {}", f.message())?;
        writeln!(out)?;
    }
    Ok(())
}

fn severity_tag(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "ERROR".red(),
        Severity::Warning => "WARN ".yellow(),
        Severity::Info => "INFO ".blue(),
    }
}

fn write_breakdown<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    writeln!(out, "  {}", "Summary:".bold())?;
    for (kind, count) in &report.summary.by_kind {
        if *count > 0 {
            let plural = if *count != 1 { "s" } else { "" };
            writeln!(out, "    {:<24} {} finding{}", kind.as_str(), count, plural)?;
        }
    }
    let by_severity = &report.summary.by_severity;
    writeln!(
        out,
        "    {} errors, {} warnings, {} info",
        by_severity.get(&Severity::Error).copied().unwrap_or(0),
        by_severity.get(&Severity::Warning).copied().unwrap_or(0),
        by_severity.get(&Severity::Info).copied().unwrap_or(0),
    )
}

fn write_suppressed_summary<W: Write>(
    out: &mut W,
    suppressed: &[SuppressedFinding],
    show_details: bool,
) -> io::Result<()> {
    writeln!(out, "  {} ({}):", "Suppressed".dimmed(), suppressed.len())?;

    if !show_details {
        writeln!(out, "    {}", "(use --show-suppressed to see details)".dimmed())?;
        return Ok(());
    }

    writeln!(out)?;
    for sf in suppressed {
        let f = &sf.finding;
        let s = &sf.suppression;
        let location = if s.suppression_type == SuppressionType::File {
            ":* (file)".to_string()
        } else {
            format!(":{}", f.line_start())
        };
        writeln!(
            out,
            "    {:<24}{}{}",
            f.kind().as_str().dimmed(),
            f.unit_path().blue(),
            location.dimmed()
        )?;
        if !s.reason.is_empty() {
            writeln!(out, "            {}", format!("reason: {:?}", s.reason).dimmed())?;
        }
    }
    Ok(())
}
