//! Registry clients and the known-package index.
//!
//! Provides async clients for checking if packages exist in:
//! - PyPI (Python Package Index)
//! - crates.io (Rust crates)
//!
//! Lookups go through the [`PackageLookup`] capability so the index can be
//! driven by a real registry, an offline stand-in, or a fake in tests.

mod cache;
mod crates;
mod index;
mod pypi;

pub use cache::RegistryCache;
pub use index::{DependencyRecord, IndexConfig, PackageIndex, ResolutionState};

use std::time::Duration;

use futures::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::analysis::Language;

/// Errors that can occur during registry checks.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited by registry")]
    RateLimited,
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Result of checking if a package exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageStatus {
    /// Package exists in the registry
    Exists,
    /// Package does not exist (404)
    NotFound,
    /// The registry answered with an unexpected client status (410, 451, ...)
    Unknown(String),
}

/// Outcome of one existence check, as seen by the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Real,
    Fake,
    /// The registry answered, but not with a definitive yes or no.
    Indeterminate(String),
    /// Transient failure; the caller may retry.
    Error(String),
}

impl From<Result<PackageStatus, RegistryError>> for LookupOutcome {
    fn from(result: Result<PackageStatus, RegistryError>) -> Self {
        match result {
            Ok(PackageStatus::Exists) => LookupOutcome::Real,
            Ok(PackageStatus::NotFound) => LookupOutcome::Fake,
            Ok(PackageStatus::Unknown(reason)) => LookupOutcome::Indeterminate(reason),
            Err(e) => LookupOutcome::Error(e.to_string()),
        }
    }
}

/// GET a registry document and read existence off the status code.
async fn fetch_status(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<PackageStatus, RegistryError> {
    debug!(%url, "registry lookup");
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                RegistryError::Timeout
            } else {
                RegistryError::Network(e)
            }
        })?;
    status_for(response.status().as_u16())
}

fn status_for(status: u16) -> Result<PackageStatus, RegistryError> {
    match status {
        200 => Ok(PackageStatus::Exists),
        404 => Ok(PackageStatus::NotFound),
        429 => Err(RegistryError::RateLimited),
        500..=599 => Err(RegistryError::Unavailable(format!("HTTP {}", status))),
        _ => Ok(PackageStatus::Unknown(format!("HTTP {}", status))),
    }
}

/// Package ecosystems with a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    PyPI,
    Crates,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::PyPI => "pypi",
            Ecosystem::Crates => "crates",
        }
    }

    /// The ecosystem a language's imports resolve against.
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Python => Ecosystem::PyPI,
            Language::Rust => Ecosystem::Crates,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pypi" | "python" => Some(Ecosystem::PyPI),
            "crates" | "crates.io" | "rust" => Some(Ecosystem::Crates),
            _ => None,
        }
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capability answering "does package X exist in ecosystem Y?".
pub trait PackageLookup: Send + Sync {
    fn exists<'a>(&'a self, ecosystem: Ecosystem, module: &'a str) -> BoxFuture<'a, LookupOutcome>;
}

/// Registry client backed by the public package indexes.
pub struct RegistryClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl RegistryClient {
    /// Create a new registry client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hollowcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, timeout })
    }

    /// Check if a package exists in the specified registry.
    pub async fn check_package(
        &self,
        ecosystem: Ecosystem,
        package: &str,
    ) -> Result<PackageStatus, RegistryError> {
        match ecosystem {
            Ecosystem::PyPI => pypi::check(&self.http, package, self.timeout).await,
            Ecosystem::Crates => crates::check(&self.http, package, self.timeout).await,
        }
    }
}

impl PackageLookup for RegistryClient {
    fn exists<'a>(&'a self, ecosystem: Ecosystem, module: &'a str) -> BoxFuture<'a, LookupOutcome> {
        Box::pin(async move { self.check_package(ecosystem, module).await.into() })
    }
}

/// Lookup used with `--offline`: every check fails without touching the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineLookup;

impl PackageLookup for OfflineLookup {
    fn exists<'a>(&'a self, _ecosystem: Ecosystem, _module: &'a str) -> BoxFuture<'a, LookupOutcome> {
        Box::pin(async { LookupOutcome::Error("registry lookups disabled (offline)".to_string()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecosystem_for_language() {
        assert_eq!(Ecosystem::for_language(Language::Python), Ecosystem::PyPI);
        assert_eq!(Ecosystem::for_language(Language::Rust), Ecosystem::Crates);
        assert_eq!(Ecosystem::parse("crates.io"), Some(Ecosystem::Crates));
        assert_eq!(Ecosystem::parse("npm"), None);
    }

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(LookupOutcome::from(Ok(PackageStatus::Exists)), LookupOutcome::Real);
        assert_eq!(LookupOutcome::from(Ok(PackageStatus::NotFound)), LookupOutcome::Fake);
        assert_eq!(
            LookupOutcome::from(Ok(PackageStatus::Unknown("HTTP 410".into()))),
            LookupOutcome::Indeterminate("HTTP 410".into())
        );
        assert_eq!(
            LookupOutcome::from(Err(RegistryError::RateLimited)),
            LookupOutcome::Error("rate limited by registry".to_string())
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(200).unwrap(), PackageStatus::Exists);
        assert_eq!(status_for(404).unwrap(), PackageStatus::NotFound);
        assert_eq!(status_for(410).unwrap(), PackageStatus::Unknown("HTTP 410".to_string()));
        assert!(matches!(status_for(429), Err(RegistryError::RateLimited)));
        assert!(matches!(status_for(503), Err(RegistryError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_offline_lookup_always_errors() {
        let outcome = OfflineLookup.exists(Ecosystem::PyPI, "requests").await;
        assert!(matches!(outcome, LookupOutcome::Error(_)));
    }
}
