// hollowcheck:ignore-file mock - test fixtures use made-up package names
//! Detection of hallucinated dependencies.
//!
//! For each distinct top-level module a unit imports:
//!
//! 1. **Skip**: stdlib modules, allowlisted names, relative imports and
//!    names that resolve to files in the scanned tree.
//! 2. **Resolve**: everything else goes through the [`PackageIndex`], which
//!    caches answers and merges concurrent lookups for the same module.
//!
//! Modules the registry does not know become `HallucinatedDependency`
//! errors. Modules that could not be checked become `LookupUnavailable`
//! notices instead; the two are never merged.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use futures::stream::{self, StreamExt};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::analysis::{FactSheet, ImportFact};
use crate::cancel::ScanControl;
use crate::registry::{DependencyRecord, Ecosystem, PackageIndex, ResolutionState};

use super::{Finding, FindingKind, LineSpan, Severity};

/// Import names that never need registry verification.
#[derive(Debug, Clone)]
pub struct ImportAllowlist {
    globs: GlobSet,
    exact: BTreeSet<String>,
}

impl ImportAllowlist {
    /// Build from glob patterns (`company_*`) and plain names.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        let mut exact = BTreeSet::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            exact.insert(pattern.to_string());
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            globs: builder.build()?,
            exact,
        })
    }

    pub fn empty() -> Self {
        Self {
            globs: GlobSet::empty(),
            exact: BTreeSet::new(),
        }
    }

    /// Add plain names (no glob syntax).
    pub fn extend_exact<I: IntoIterator<Item = String>>(&mut self, names: I) {
        self.exact.extend(names);
    }

    pub fn is_allowlisted(&self, module: &str) -> bool {
        self.exact.contains(module) || self.globs.is_match(module)
    }
}

impl Default for ImportAllowlist {
    fn default() -> Self {
        Self::empty()
    }
}

/// Module names provided by the scanned tree itself: file stems and the
/// directories that contain them.
pub fn local_module_names<'a, I>(paths: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names = BTreeSet::new();
    for path in paths {
        let path = Path::new(path);
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.insert(stem.to_string());
        }
        for dir in path.ancestors().skip(1) {
            if let Some(name) = dir.file_name().and_then(|s| s.to_str()) {
                names.insert(name.to_string());
            }
        }
    }
    names
}

/// Checks imports against the package index.
pub struct DependencyDetector<'a> {
    index: &'a PackageIndex,
    allowlist: &'a ImportAllowlist,
    concurrency: usize,
}

impl<'a> DependencyDetector<'a> {
    pub fn new(index: &'a PackageIndex, allowlist: &'a ImportAllowlist) -> Self {
        Self {
            index,
            allowlist,
            concurrency: 16,
        }
    }

    /// Maximum resolutions awaited at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Detect hallucinated dependencies across all fact sheets.
    pub async fn detect(
        &self,
        sheets: &[FactSheet],
        local_names: &BTreeSet<String>,
        control: &ScanControl,
    ) -> Vec<Finding> {
        // First checked import of each distinct top-level module, per unit.
        let mut wanted: Vec<(&FactSheet, Ecosystem, &str, &ImportFact)> = Vec::new();
        for sheet in sheets {
            let ecosystem = Ecosystem::for_language(sheet.language);
            let mut seen = BTreeSet::new();
            for import in &sheet.imports {
                let module = import.top_level();
                if self.should_skip(ecosystem, module, import, local_names) {
                    continue;
                }
                if !seen.insert(module) {
                    continue;
                }
                wanted.push((sheet, ecosystem, module, import));
            }
        }

        let keys: BTreeSet<(Ecosystem, String)> = wanted
            .iter()
            .map(|(_, e, m, _)| (*e, m.to_string()))
            .collect();
        if keys.is_empty() {
            return Vec::new();
        }
        debug!(modules = keys.len(), "resolving imports");

        let index = self.index;
        let records: HashMap<(Ecosystem, String), DependencyRecord> = stream::iter(keys)
            .map(|(ecosystem, module)| async move {
                let record = index.resolve(ecosystem, &module, control).await;
                ((ecosystem, module), record)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        wanted
            .into_iter()
            .filter_map(|(sheet, ecosystem, module, import)| {
                let record = records.get(&(ecosystem, module.to_string()))?;
                finding_for(sheet, import, module, record)
            })
            .collect()
    }

    fn should_skip(
        &self,
        ecosystem: Ecosystem,
        module: &str,
        import: &ImportFact,
        local_names: &BTreeSet<String>,
    ) -> bool {
        module.is_empty()
            || import.is_relative
            || self.index.stdlib().contains(ecosystem, module)
            || self.allowlist.is_allowlisted(module)
            || local_names.contains(module)
    }
}

fn finding_for(
    sheet: &FactSheet,
    import: &ImportFact,
    module: &str,
    record: &DependencyRecord,
) -> Option<Finding> {
    let span = LineSpan::line(import.span.start_line);
    match record.state {
        ResolutionState::Stdlib | ResolutionState::KnownReal => None,
        ResolutionState::KnownFake | ResolutionState::UnknownPending => Some(Finding::new(
            FindingKind::HallucinatedDependency,
            Severity::Error,
            &sheet.path,
            span,
            format!(
                "module '{}' does not exist in {} ({})",
                module, record.ecosystem, record.state
            ),
            module,
        )),
        ResolutionState::LookupFailed => Some(Finding::new(
            FindingKind::LookupUnavailable,
            Severity::Info,
            &sheet.path,
            span,
            format!(
                "could not verify module '{}' in {}: {}",
                module,
                record.ecosystem,
                record.detail.as_deref().unwrap_or("lookup failed")
            ),
            module,
        )),
    }
}

/// Dependency findings grouped by kind, as module names.
pub fn modules_by_kind(findings: &[Finding]) -> BTreeMap<FindingKind, BTreeSet<String>> {
    let mut out: BTreeMap<FindingKind, BTreeSet<String>> = BTreeMap::new();
    for finding in findings {
        if matches!(
            finding.kind(),
            FindingKind::HallucinatedDependency | FindingKind::LookupUnavailable
        ) {
            out.entry(finding.kind())
                .or_default()
                .insert(finding.evidence().to_string());
        }
    }
    out
}
