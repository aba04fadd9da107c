// hollowcheck:ignore-file mock - cache fixtures use made-up package names
//! File-based cache for registry lookup results.
//!
//! Only definitive answers (exists / not found) are persisted. Entries live in
//! `~/.cache/hollowcheck/registry/`, one file per `ecosystem:package` key.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use directories::ProjectDirs;
use tracing::debug;

use super::{Ecosystem, PackageStatus};

/// On-disk cache of registry results, shared across runs.
#[derive(Debug, Clone)]
pub struct RegistryCache {
    dir: PathBuf,
    ttl: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheEntry {
    status: PackageStatus,
    timestamp: u64, // Unix timestamp in seconds
}

impl RegistryCache {
    /// Cache under the user cache directory. `None` when no home directory
    /// can be determined.
    pub fn new(ttl: Duration) -> Option<Self> {
        let dir = ProjectDirs::from("", "", "hollowcheck")?
            .cache_dir()
            .join("registry");
        Some(Self::at(dir, ttl))
    }

    /// Cache rooted at an explicit directory.
    pub fn at(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            debug!(dir = %dir.display(), error = %e, "could not create registry cache dir");
        }
        Self { dir, ttl }
    }

    fn cache_key(ecosystem: Ecosystem, package: &str) -> String {
        format!("{}:{}", ecosystem.as_str(), package)
    }

    fn cache_file_path(&self, key: &str) -> PathBuf {
        let filename = key.replace([':', '/', '\\'], "_");
        self.dir.join(format!("{}.cache", filename))
    }

    /// Get a cached definitive status with the time it was recorded, if fresh.
    pub fn get(&self, ecosystem: Ecosystem, package: &str) -> Option<(PackageStatus, SystemTime)> {
        let key = Self::cache_key(ecosystem, package);
        let content = fs::read_to_string(self.cache_file_path(&key)).ok()?;
        let entry = parse_cache_entry(&content)?;

        let age = current_timestamp().saturating_sub(entry.timestamp);
        if age >= self.ttl.as_secs() {
            return None;
        }

        let checked = UNIX_EPOCH + Duration::from_secs(entry.timestamp);
        Some((entry.status, checked))
    }

    /// Store a definitive status. Unknown statuses are not persisted.
    pub fn set(&self, ecosystem: Ecosystem, package: &str, status: &PackageStatus) {
        if matches!(status, PackageStatus::Unknown(_)) {
            return;
        }

        let key = Self::cache_key(ecosystem, package);
        let entry = CacheEntry {
            status: status.clone(),
            timestamp: current_timestamp(),
        };
        let path = self.cache_file_path(&key);
        if let Err(e) = fs::write(&path, format_cache_entry(&entry)) {
            debug!(path = %path.display(), error = %e, "could not write registry cache entry");
        }
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

fn format_cache_entry(entry: &CacheEntry) -> String {
    let status_str = match &entry.status {
        PackageStatus::Exists => "exists",
        PackageStatus::NotFound => "notfound",
        PackageStatus::Unknown(msg) => return format!("unknown:{}:{}", entry.timestamp, msg),
    };
    format!("{}:{}", status_str, entry.timestamp)
}

fn parse_cache_entry(content: &str) -> Option<CacheEntry> {
    let parts: Vec<&str> = content.trim().splitn(3, ':').collect();
    if parts.len() < 2 {
        return None;
    }

    let timestamp = parts[1].parse().ok()?;
    let status = match parts[0] {
        "exists" => PackageStatus::Exists,
        "notfound" => PackageStatus::NotFound,
        "unknown" => PackageStatus::Unknown(parts.get(2).unwrap_or(&"unknown error").to_string()),
        _ => return None,
    };

    Some(CacheEntry { status, timestamp })
}
