//! Hollowcheck - static analysis for hollow implementations.
//!
//! Hollowcheck flags code that looks complete but lacks real functionality:
//! stub bodies, unfinished work markers, mock or placeholder data, imports of
//! packages that do not exist in any registry, and functions whose
//! complexity deserves a second look.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter extraction of per-unit facts
//! - `detect`: detectors over those facts, plus the scan runner
//! - `registry`: package registry clients and the shared package index
//! - `config`: YAML configuration and its defaults
//! - `report`: aggregation and output formatting (pretty, JSON)
//! - `cancel`: deadlines and cancellation for a scan
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hollowcheck::{scan_blocking, OfflineLookup, ScanConfig, ScanControl, SourceUnit};
//!
//! let units = vec![SourceUnit::new("app.py", "def f():\n    pass\n", "python")];
//! let report = scan_blocking(&units, &ScanConfig::default(), Arc::new(OfflineLookup), &ScanControl::new())?;
//! assert!(report.findings.len() > 0);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod analysis;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod detect;
pub mod logging;
pub mod registry;
pub mod report;

pub use analysis::{FactSheet, Language, SourceUnit};
pub use cancel::{CancellationToken, ScanControl};
pub use config::{ConfigError, ScanConfig};
pub use detect::{scan, scan_blocking, Finding, FindingKind, LineSpan, Scanner, Severity};
pub use registry::{Ecosystem, LookupOutcome, OfflineLookup, PackageLookup, RegistryClient};
pub use report::{Report, Summary};
