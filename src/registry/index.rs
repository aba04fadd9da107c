// hollowcheck:ignore-file mock - fake package names exercise the lookup paths
//! Known-package index with single-flight lookups.
//!
//! One [`PackageIndex`] is owned per scanner and shared by reference with
//! the dependency detector. For every `(ecosystem, module)` key it holds
//! either a resolved record or the single in-flight lookup that will produce
//! one; concurrent resolutions of the same key join that lookup.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::{Ecosystem, LookupOutcome, PackageLookup, PackageStatus, RegistryCache};
use crate::cancel::ScanControl;
use crate::detect::StdlibAllowList;

/// Where a module's resolution ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    Stdlib,
    KnownReal,
    KnownFake,
    /// The registry kept answering without a definitive yes or no.
    UnknownPending,
    /// Transport failure, timeout, or cancellation.
    LookupFailed,
}

impl ResolutionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionState::Stdlib => "stdlib",
            ResolutionState::KnownReal => "known-real",
            ResolutionState::KnownFake => "known-fake",
            ResolutionState::UnknownPending => "unknown-pending",
            ResolutionState::LookupFailed => "lookup-failed",
        }
    }
}

impl std::fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution of one `(ecosystem, module)` key.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyRecord {
    pub ecosystem: Ecosystem,
    pub module_name: String,
    pub state: ResolutionState,
    pub last_checked: SystemTime,
    /// Last error or registry answer for non-definitive states.
    pub detail: Option<String>,
}

impl DependencyRecord {
    fn new(ecosystem: Ecosystem, module: &str, state: ResolutionState, detail: Option<String>) -> Self {
        Self {
            ecosystem,
            module_name: module.to_string(),
            state,
            last_checked: SystemTime::now(),
            detail,
        }
    }
}

/// Lookup policy for the index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Timeout for a single lookup attempt.
    pub lookup_timeout: Duration,
    /// Retries after the first attempt.
    pub retry_budget: u32,
    /// Delay before retry `n` is `retry_backoff * n`.
    pub retry_backoff: Duration,
    /// How long known-real / known-fake answers stay fresh.
    pub positive_ttl: Duration,
    /// How long failed or inconclusive answers stay fresh.
    pub failure_ttl: Duration,
    pub max_concurrent_lookups: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_millis(5000),
            retry_budget: 2,
            retry_backoff: Duration::from_millis(250),
            positive_ttl: Duration::from_secs(24 * 3600),
            failure_ttl: Duration::from_secs(60),
            max_concurrent_lookups: 8,
        }
    }
}

type SharedLookup = Shared<BoxFuture<'static, DependencyRecord>>;
type Key = (Ecosystem, String);

enum Slot {
    Ready { record: DependencyRecord, fresh_until: Instant },
    Pending(SharedLookup),
}

/// Cached, rate-limited, single-flight package index.
pub struct PackageIndex {
    lookup: Arc<dyn PackageLookup>,
    stdlib: StdlibAllowList,
    disk: Option<RegistryCache>,
    config: IndexConfig,
    semaphore: Arc<Semaphore>,
    slots: Arc<Mutex<HashMap<Key, Slot>>>,
    lookups: Arc<AtomicUsize>,
}

impl PackageIndex {
    pub fn new(lookup: Arc<dyn PackageLookup>, stdlib: StdlibAllowList, config: IndexConfig) -> Self {
        let permits = config.max_concurrent_lookups.max(1);
        Self {
            lookup,
            stdlib,
            disk: None,
            config,
            semaphore: Arc::new(Semaphore::new(permits)),
            slots: Arc::new(Mutex::new(HashMap::new())),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Persist definitive answers to (and read them from) a disk cache.
    pub fn with_disk_cache(mut self, cache: RegistryCache) -> Self {
        self.disk = Some(cache);
        self
    }

    pub fn stdlib(&self) -> &StdlibAllowList {
        &self.stdlib
    }

    /// Number of calls made to the lookup capability so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Resolve a module, joining any lookup already in flight for it.
    ///
    /// Returns `LookupFailed` without waiting further once `control` expires;
    /// that record is not cached, so a later scan retries the key.
    pub async fn resolve(&self, ecosystem: Ecosystem, module: &str, control: &ScanControl) -> DependencyRecord {
        if self.stdlib.contains(ecosystem, module) {
            return DependencyRecord::new(ecosystem, module, ResolutionState::Stdlib, None);
        }

        let key = (ecosystem, module.to_string());
        let pending = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            match slots.get(&key) {
                Some(Slot::Ready { record, fresh_until }) if Instant::now() < *fresh_until => {
                    return record.clone();
                }
                Some(Slot::Pending(fut)) => fut.clone(),
                _ => {
                    if control.is_expired() {
                        return cancelled(ecosystem, module);
                    }
                    let fut = self.start_lookup(key.clone());
                    slots.insert(key, Slot::Pending(fut.clone()));
                    fut
                }
            }
        };

        if control.is_expired() {
            return cancelled(ecosystem, module);
        }

        tokio::select! {
            biased;
            record = pending => record,
            _ = control.expired() => {
                debug!(%ecosystem, module, "resolution abandoned at deadline");
                cancelled(ecosystem, module)
            }
        }
    }

    fn start_lookup(&self, key: Key) -> SharedLookup {
        let lookup = Arc::clone(&self.lookup);
        let semaphore = Arc::clone(&self.semaphore);
        let slots = Arc::clone(&self.slots);
        let lookups = Arc::clone(&self.lookups);
        let disk = self.disk.clone();
        let config = self.config.clone();

        async move {
            let (ecosystem, module) = (key.0, key.1.as_str());

            if let Some((status, checked)) = disk.as_ref().and_then(|d| d.get(ecosystem, module)) {
                let state = match status {
                    PackageStatus::Exists => ResolutionState::KnownReal,
                    _ => ResolutionState::KnownFake,
                };
                let mut record = DependencyRecord::new(ecosystem, module, state, None);
                record.last_checked = checked;
                store(&slots, &key, &record, config.positive_ttl);
                return record;
            }

            let record = run_lookup(&*lookup, &semaphore, &lookups, &config, ecosystem, module).await;

            let ttl = match record.state {
                ResolutionState::KnownReal | ResolutionState::KnownFake => {
                    if let Some(disk) = &disk {
                        let status = if record.state == ResolutionState::KnownReal {
                            PackageStatus::Exists
                        } else {
                            PackageStatus::NotFound
                        };
                        disk.set(ecosystem, module, &status);
                    }
                    config.positive_ttl
                }
                _ => config.failure_ttl,
            };
            store(&slots, &key, &record, ttl);
            record
        }
        .boxed()
        .shared()
    }
}

/// Attempt the lookup up to `1 + retry_budget` times.
async fn run_lookup(
    lookup: &dyn PackageLookup,
    semaphore: &Semaphore,
    lookups: &AtomicUsize,
    config: &IndexConfig,
    ecosystem: Ecosystem,
    module: &str,
) -> DependencyRecord {
    let mut last = LookupOutcome::Error("no lookup attempted".to_string());

    for attempt in 0..=config.retry_budget {
        if attempt > 0 {
            tokio::time::sleep(config.retry_backoff * attempt).await;
        }

        let outcome = {
            let Ok(_permit) = semaphore.acquire().await else {
                break;
            };
            lookups.fetch_add(1, Ordering::SeqCst);
            // The call sits inside the future so a panic while building it is caught too.
            let attempt_future =
                AssertUnwindSafe(async { lookup.exists(ecosystem, module).await }).catch_unwind();
            match tokio::time::timeout(config.lookup_timeout, attempt_future).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(payload)) => {
                    LookupOutcome::Error(format!("lookup panicked: {}", panic_reason(payload.as_ref())))
                }
                Err(_) => LookupOutcome::Error(format!(
                    "timed out after {}ms",
                    config.lookup_timeout.as_millis()
                )),
            }
        };

        match outcome {
            LookupOutcome::Real => {
                return DependencyRecord::new(ecosystem, module, ResolutionState::KnownReal, None)
            }
            LookupOutcome::Fake => {
                return DependencyRecord::new(ecosystem, module, ResolutionState::KnownFake, None)
            }
            LookupOutcome::Indeterminate(ref reason) | LookupOutcome::Error(ref reason) => {
                debug!(%ecosystem, module, attempt, reason = %reason, "lookup attempt inconclusive");
            }
        }
        last = outcome;
    }

    match last {
        LookupOutcome::Indeterminate(reason) => {
            DependencyRecord::new(ecosystem, module, ResolutionState::UnknownPending, Some(reason))
        }
        LookupOutcome::Error(reason) => {
            warn!(%ecosystem, module, reason = %reason, "package lookup failed");
            DependencyRecord::new(ecosystem, module, ResolutionState::LookupFailed, Some(reason))
        }
        // Definitive outcomes return from the loop.
        LookupOutcome::Real | LookupOutcome::Fake => {
            DependencyRecord::new(ecosystem, module, ResolutionState::LookupFailed, None)
        }
    }
}

fn store(slots: &Mutex<HashMap<Key, Slot>>, key: &Key, record: &DependencyRecord, ttl: Duration) {
    let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
    slots.insert(
        key.clone(),
        Slot::Ready {
            record: record.clone(),
            fresh_until: Instant::now() + ttl,
        },
    );
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn cancelled(ecosystem: Ecosystem, module: &str) -> DependencyRecord {
    DependencyRecord::new(
        ecosystem,
        module,
        ResolutionState::LookupFailed,
        Some("scan cancelled or past its deadline".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers from a fixed table and counts calls.
    struct TableLookup {
        calls: AtomicUsize,
        delay: Duration,
        answer: fn(&str) -> LookupOutcome,
    }

    impl TableLookup {
        fn new(answer: fn(&str) -> LookupOutcome) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                answer,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl PackageLookup for TableLookup {
        fn exists<'a>(&'a self, _ecosystem: Ecosystem, module: &'a str) -> BoxFuture<'a, LookupOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                tokio::time::sleep(self.delay).await;
                (self.answer)(module)
            })
        }
    }

    fn real_if_requests(module: &str) -> LookupOutcome {
        if module == "requests" {
            LookupOutcome::Real
        } else {
            LookupOutcome::Fake
        }
    }

    fn fast_config() -> IndexConfig {
        IndexConfig {
            lookup_timeout: Duration::from_millis(200),
            retry_budget: 2,
            retry_backoff: Duration::from_millis(1),
            ..IndexConfig::default()
        }
    }

    fn index(lookup: Arc<dyn PackageLookup>) -> PackageIndex {
        PackageIndex::new(lookup, StdlibAllowList::embedded(), fast_config())
    }

    #[tokio::test]
    async fn test_stdlib_never_looked_up() {
        let lookup = Arc::new(TableLookup::new(real_if_requests));
        let index = index(lookup.clone());
        let record = index.resolve(Ecosystem::PyPI, "os", &ScanControl::new()).await;
        assert_eq!(record.state, ResolutionState::Stdlib);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_real_and_fake_are_cached() {
        let lookup = Arc::new(TableLookup::new(real_if_requests));
        let index = index(lookup.clone());
        let control = ScanControl::new();

        assert_eq!(index.resolve(Ecosystem::PyPI, "requests", &control).await.state, ResolutionState::KnownReal);
        assert_eq!(index.resolve(Ecosystem::PyPI, "made_up", &control).await.state, ResolutionState::KnownFake);
        assert_eq!(index.resolve(Ecosystem::PyPI, "requests", &control).await.state, ResolutionState::KnownReal);
        assert_eq!(index.lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_single_flight() {
        let lookup = Arc::new(TableLookup::new(real_if_requests).with_delay(Duration::from_millis(50)));
        let index = Arc::new(index(lookup.clone()));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let index = Arc::clone(&index);
            handles.push(tokio::spawn(async move {
                index.resolve(Ecosystem::Crates, "brand_new_crate", &ScanControl::new()).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().state, ResolutionState::KnownFake);
        }
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_exhaust_retry_budget() {
        let lookup = Arc::new(TableLookup::new(|_| LookupOutcome::Error("boom".into())));
        let index = index(lookup.clone());

        let record = index.resolve(Ecosystem::PyPI, "flaky", &ScanControl::new()).await;
        assert_eq!(record.state, ResolutionState::LookupFailed);
        assert_eq!(record.detail.as_deref(), Some("boom"));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_indeterminate_becomes_unknown_pending() {
        let lookup = Arc::new(TableLookup::new(|_| LookupOutcome::Indeterminate("HTTP 410".into())));
        let index = index(lookup);

        let record = index.resolve(Ecosystem::PyPI, "gone", &ScanControl::new()).await;
        assert_eq!(record.state, ResolutionState::UnknownPending);
    }

    #[tokio::test]
    async fn test_attempt_timeout_is_a_failure() {
        let lookup = Arc::new(TableLookup::new(real_if_requests).with_delay(Duration::from_secs(30)));
        let mut config = fast_config();
        config.lookup_timeout = Duration::from_millis(10);
        config.retry_budget = 0;
        let index = PackageIndex::new(lookup, StdlibAllowList::embedded(), config);

        let record = index.resolve(Ecosystem::PyPI, "requests", &ScanControl::new()).await;
        assert_eq!(record.state, ResolutionState::LookupFailed);
    }

    #[tokio::test]
    async fn test_expired_control_fails_fast() {
        let lookup = Arc::new(TableLookup::new(real_if_requests).with_delay(Duration::from_secs(30)));
        let index = index(lookup.clone());
        let control = ScanControl::new().with_deadline(Instant::now());

        let record = tokio::time::timeout(
            Duration::from_secs(5),
            index.resolve(Ecosystem::PyPI, "requests", &control),
        )
        .await
        .unwrap();
        assert_eq!(record.state, ResolutionState::LookupFailed);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disk_cache_skips_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let disk = RegistryCache::at(dir.path(), Duration::from_secs(3600));
        disk.set(Ecosystem::PyPI, "requests", &PackageStatus::Exists);

        let lookup = Arc::new(TableLookup::new(|_| LookupOutcome::Fake));
        let index = index(lookup.clone()).with_disk_cache(disk);

        let record = index.resolve(Ecosystem::PyPI, "requests", &ScanControl::new()).await;
        assert_eq!(record.state, ResolutionState::KnownReal);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    struct PanickingLookup;

    impl PackageLookup for PanickingLookup {
        fn exists<'a>(&'a self, _ecosystem: Ecosystem, _module: &'a str) -> BoxFuture<'a, LookupOutcome> {
            panic!("registry client bug")
        }
    }

    #[tokio::test]
    async fn test_panicking_lookup_becomes_failure() {
        let index = index(Arc::new(PanickingLookup));

        let record = index.resolve(Ecosystem::PyPI, "somepkg", &ScanControl::new()).await;
        assert_eq!(record.state, ResolutionState::LookupFailed);
        assert!(record.detail.as_deref().unwrap_or("").contains("registry client bug"));
        assert_eq!(index.lookup_count(), 3);
    }
}
