//! Scan orchestration.
//!
//! A scan runs in three phases:
//!
//! 1. Per-unit extraction plus the pure detectors, in parallel on the rayon
//!    pool. A unit that fails to parse is skipped with a diagnostic; a
//!    detector that panics is recorded as a diagnostic for that unit.
//! 2. Dependency resolution for every surviving unit, on tokio, through
//!    the scanner's package index.
//! 3. Aggregation into an ordered [`Report`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analysis::{Extractor, FactSheet, SourceUnit};
use crate::cancel::ScanControl;
use crate::config::{ConfigError, ScanConfig};
use crate::registry::{PackageIndex, PackageLookup, RegistryCache};
use crate::report::Report;

use super::{
    collect_suppressions, local_module_names, modules_by_kind, ComplexityScorer, DependencyDetector,
    Finding, FindingKind, ImportAllowlist, LineSpan, Severity, StubDetector, UnitDetector,
};

/// Extraction plus the detectors that need nothing but a fact sheet.
struct UnitPipeline {
    extractor: Extractor,
    detectors: Vec<UnitDetector>,
}

/// What phase 1 produced for one unit.
struct UnitOutcome {
    sheet: Option<FactSheet>,
    findings: Vec<Finding>,
}

impl UnitPipeline {
    fn run(&self, units: &[SourceUnit]) -> Vec<UnitOutcome> {
        units.par_iter().map(|unit| self.analyze(unit)).collect()
    }

    fn analyze(&self, unit: &SourceUnit) -> UnitOutcome {
        let extracted = panic::catch_unwind(AssertUnwindSafe(|| self.extractor.extract(unit)));
        let sheet = match extracted {
            Ok(Ok(sheet)) => sheet,
            Ok(Err(e)) => {
                warn!(path = unit.path(), error = %e, "skipping unit");
                return UnitOutcome {
                    sheet: None,
                    findings: vec![Finding::new(
                        FindingKind::Diagnostic,
                        Severity::Warning,
                        unit.path(),
                        LineSpan::line(e.line().unwrap_or(1)),
                        format!("unit skipped: {}", e),
                        "parse_error",
                    )],
                };
            }
            Err(payload) => {
                return UnitOutcome {
                    sheet: None,
                    findings: vec![panic_finding(unit.path(), "extractor", payload)],
                };
            }
        };

        let mut findings = Vec::new();
        for detector in &self.detectors {
            match panic::catch_unwind(AssertUnwindSafe(|| detector.detect(&sheet))) {
                Ok(found) => findings.extend(found),
                Err(payload) => findings.push(panic_finding(unit.path(), detector.name(), payload)),
            }
        }
        debug!(path = unit.path(), findings = findings.len(), "unit analyzed");

        UnitOutcome {
            sheet: Some(sheet),
            findings,
        }
    }
}

fn panic_finding(path: &str, stage: &str, payload: Box<dyn Any + Send>) -> Finding {
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    warn!(path, stage, %reason, "detector panicked");
    Finding::new(
        FindingKind::Diagnostic,
        Severity::Warning,
        path,
        LineSpan::line(1),
        format!("{} failed on this unit: {}", stage, reason),
        stage,
    )
}

/// Executes every detector over a set of units.
///
/// Owns the package index, so repeated scans with one scanner reuse its
/// cached registry answers.
pub struct Scanner {
    pipeline: Arc<UnitPipeline>,
    index: PackageIndex,
    allowlist: ImportAllowlist,
    lookup_concurrency: usize,
}

impl Scanner {
    /// Validate the config and build the detectors and the index.
    pub fn new(config: &ScanConfig, lookup: Arc<dyn PackageLookup>) -> Result<Self, ConfigError> {
        config.validate()?;

        let detectors = vec![
            UnitDetector::Stub(StubDetector::with_config(config.stub_config())),
            UnitDetector::Mock(config.mock_detector()?),
            UnitDetector::Complexity(ComplexityScorer::new(config.complexity_threshold)),
        ];
        let pipeline = UnitPipeline {
            extractor: config.extractor()?,
            detectors,
        };

        Ok(Self {
            pipeline: Arc::new(pipeline),
            index: PackageIndex::new(lookup, config.stdlib()?, config.index_config()),
            allowlist: config.allowlist()?,
            lookup_concurrency: config.max_concurrent_lookups * 2,
        })
    }

    /// Persist registry answers across runs.
    pub fn with_disk_cache(mut self, cache: RegistryCache) -> Self {
        self.index = self.index.with_disk_cache(cache);
        self
    }

    /// Treat these module names as local to the project.
    pub fn allow_modules<I: IntoIterator<Item = String>>(mut self, names: I) -> Self {
        self.allowlist.extend_exact(names);
        self
    }

    pub fn index(&self) -> &PackageIndex {
        &self.index
    }

    /// Scan units and build the report.
    ///
    /// Honors the deadline and cancellation token in `control`: dependency
    /// resolutions still pending when it expires end as lookup failures.
    pub async fn scan(&self, units: &[SourceUnit], control: &ScanControl) -> Report {
        let pipeline = Arc::clone(&self.pipeline);
        let owned: Vec<SourceUnit> = units.to_vec();
        let outcomes = match tokio::task::spawn_blocking(move || pipeline.run(&owned)).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                warn!(error = %e, "unit analysis task failed");
                units
                    .iter()
                    .map(|unit| UnitOutcome {
                        sheet: None,
                        findings: vec![Finding::new(
                            FindingKind::Diagnostic,
                            Severity::Warning,
                            unit.path(),
                            LineSpan::line(1),
                            format!("analysis aborted: {}", e),
                            "runner",
                        )],
                    })
                    .collect()
            }
        };

        let mut findings = Vec::new();
        let mut sheets = Vec::new();
        let mut skipped = 0;
        for outcome in outcomes {
            findings.extend(outcome.findings);
            match outcome.sheet {
                Some(sheet) => sheets.push(sheet),
                None => skipped += 1,
            }
        }

        let local_names = local_module_names(units.iter().map(SourceUnit::path));
        let dependency_findings = DependencyDetector::new(&self.index, &self.allowlist)
            .with_concurrency(self.lookup_concurrency)
            .detect(&sheets, &local_names, control)
            .await;
        for (kind, modules) in modules_by_kind(&dependency_findings) {
            debug!(%kind, ?modules, "dependency findings");
        }
        findings.extend(dependency_findings);

        let report = Report::aggregate(findings, &collect_suppressions(units), units.len(), skipped);
        info!(
            units = units.len(),
            skipped,
            findings = report.findings.len(),
            suppressed = report.summary.suppressed,
            "scan complete"
        );
        report
    }

    /// Run [`Scanner::scan`] on a fresh tokio runtime.
    pub fn scan_blocking(&self, units: &[SourceUnit], control: &ScanControl) -> std::io::Result<Report> {
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        Ok(runtime.block_on(self.scan(units, control)))
    }
}

/// One-shot scan with a fresh scanner.
pub async fn scan(
    units: &[SourceUnit],
    config: &ScanConfig,
    lookup: Arc<dyn PackageLookup>,
    control: &ScanControl,
) -> Result<Report, ConfigError> {
    let scanner = Scanner::new(config, lookup)?;
    Ok(scanner.scan(units, control).await)
}

/// Blocking variant of [`scan`] for callers without a runtime.
pub fn scan_blocking(
    units: &[SourceUnit],
    config: &ScanConfig,
    lookup: Arc<dyn PackageLookup>,
    control: &ScanControl,
) -> anyhow::Result<Report> {
    let scanner = Scanner::new(config, lookup)?;
    Ok(scanner.scan_blocking(units, control)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Ecosystem, LookupOutcome, OfflineLookup};
    use futures::future::BoxFuture;

    struct AllReal;

    impl PackageLookup for AllReal {
        fn exists<'a>(&'a self, _ecosystem: Ecosystem, _module: &'a str) -> BoxFuture<'a, LookupOutcome> {
            Box::pin(async { LookupOutcome::Real })
        }
    }

    fn scanner() -> Scanner {
        Scanner::new(&ScanConfig::default(), Arc::new(AllReal)).unwrap()
    }

    #[tokio::test]
    async fn test_parse_error_skips_unit() {
        let units = vec![
            SourceUnit::new("bad.py", "def broken(:\n    pass\n", "python"),
            SourceUnit::new("ok.py", "def f():\n    pass\n", "python"),
        ];
        let report = scanner().scan(&units, &ScanControl::new()).await;

        assert_eq!(report.summary.units_scanned, 2);
        assert_eq!(report.summary.units_skipped, 1);
        let diag: Vec<_> = report.of_kind(FindingKind::Diagnostic).collect();
        assert_eq!(diag.len(), 1);
        assert_eq!(diag[0].unit_path(), "bad.py");
        assert_eq!(report.count(FindingKind::Stub), 1);
    }

    #[tokio::test]
    async fn test_unsupported_language_is_diagnostic() {
        let units = vec![SourceUnit::new("main.go", "package main\n", "go")];
        let report = scanner().scan(&units, &ScanControl::new()).await;
        assert_eq!(report.count(FindingKind::Diagnostic), 1);
        assert_eq!(report.summary.units_skipped, 1);
    }

    #[test]
    fn test_detector_panic_becomes_diagnostic() {
        let pipeline = UnitPipeline {
            extractor: Extractor::default(),
            detectors: vec![
                UnitDetector::Fault("boom"),
                UnitDetector::Complexity(ComplexityScorer::new(0)),
            ],
        };
        let outcome = pipeline.analyze(&SourceUnit::new("a.py", "def f():\n    return 1\n", "python"));

        assert!(outcome.sheet.is_some());
        let kinds: Vec<FindingKind> = outcome.findings.iter().map(Finding::kind).collect();
        assert_eq!(kinds, vec![FindingKind::Diagnostic, FindingKind::ComplexityNotice]);
        assert!(outcome.findings[0].message().contains("boom"));
    }

    #[tokio::test]
    async fn test_invalid_config_is_fatal() {
        let config = ScanConfig {
            complexity_threshold: 0,
            ..Default::default()
        };
        assert!(scan(&[], &config, Arc::new(OfflineLookup), &ScanControl::new()).await.is_err());
    }

    #[test]
    fn test_scan_blocking() {
        let units = vec![SourceUnit::new("a.rs", "fn f() { todo!() }\n", "rust")];
        let report = scan_blocking(&units, &ScanConfig::default(), Arc::new(AllReal), &ScanControl::new()).unwrap();
        assert_eq!(report.count(FindingKind::Stub), 1);
    }
}
