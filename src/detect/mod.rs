//! Detectors over extracted facts.
//!
//! Each detector consumes one [`FactSheet`] and produces complete
//! [`Finding`]s. The dependency detector is the exception: it is async and
//! consults the shared package index.

mod complexity;
mod dependencies;
mod mocks;
mod runner;
mod stdlib;
mod stubs;
mod suppress;
mod types;

use crate::analysis::FactSheet;

pub use complexity::ComplexityScorer;
pub use dependencies::{local_module_names, modules_by_kind, DependencyDetector, ImportAllowlist};
pub use mocks::{MockDetector, MockDetectorConfig, MockLiteralRule};
pub use runner::{scan, scan_blocking, Scanner};
pub use stdlib::StdlibAllowList;
pub use stubs::{HollowBodyKind, StubDetector, StubDetectorConfig};
pub use suppress::{
    collect_suppressions, filter_suppressed, matches_suppression, parse_suppressions,
    SuppressedFinding, Suppression, SuppressionType,
};
pub use types::{Finding, FindingKind, LineSpan, Severity};

/// A pure, per-unit detector.
pub trait Detector: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Findings for one unit.
    fn detect(&self, sheet: &FactSheet) -> Vec<Finding>;
}

/// The closed set of per-unit detectors a scan runs.
pub enum UnitDetector {
    Stub(StubDetector),
    Mock(MockDetector),
    Complexity(ComplexityScorer),
    /// Panics on every unit; exercises panic isolation in the runner.
    #[cfg(test)]
    Fault(&'static str),
}

impl UnitDetector {
    pub fn name(&self) -> &'static str {
        match self {
            UnitDetector::Stub(d) => d.name(),
            UnitDetector::Mock(d) => d.name(),
            UnitDetector::Complexity(d) => d.name(),
            #[cfg(test)]
            UnitDetector::Fault(_) => "fault",
        }
    }

    pub fn detect(&self, sheet: &FactSheet) -> Vec<Finding> {
        match self {
            UnitDetector::Stub(d) => d.detect(sheet),
            UnitDetector::Mock(d) => d.detect(sheet),
            UnitDetector::Complexity(d) => d.detect(sheet),
            #[cfg(test)]
            UnitDetector::Fault(message) => panic!("{}", message),
        }
    }
}
