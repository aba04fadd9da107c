//! Scan configuration.
//!
//! Loaded from `hollowcheck.yaml` (or `.hollowcheck.yaml`). Every key is
//! optional; missing keys take the defaults below.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{Extractor, DEFAULT_MARKERS};
use crate::detect::{
    ImportAllowlist, MockDetector, MockDetectorConfig, MockLiteralRule, StdlibAllowList,
    StubDetectorConfig,
};
use crate::registry::{Ecosystem, IndexConfig};

/// File names searched for, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["hollowcheck.yaml", ".hollowcheck.yaml"];

/// Configuration problems. Always fatal, and always raised before any unit
/// is scanned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid {field} pattern {pattern:?}: {source}")]
    Regex {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid {field} glob: {source}")]
    Glob {
        field: &'static str,
        #[source]
        source: globset::Error,
    },
    #[error("{field} {message}")]
    OutOfRange { field: &'static str, message: String },
    #[error("unknown ecosystem {0:?} in stdlib_extra (expected \"pypi\" or \"crates\")")]
    UnknownEcosystem(String),
}

/// A user mock rule as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MockRuleConfig {
    pub pattern: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Top-level scan configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScanConfig {
    /// Functions above this complexity get a notice (default: 10)
    #[serde(default = "default_complexity_threshold")]
    pub complexity_threshold: u32,
    /// Functions at or above this complexity are never stubs (default: 3)
    #[serde(default = "default_real_logic_complexity")]
    pub real_logic_complexity: u32,
    /// Work markers looked for in comments (default: TODO, FIXME, HACK, XXX)
    #[serde(default = "default_markers")]
    pub stub_marker_set: Vec<String>,
    /// Function names never reported as stubs
    #[serde(default = "default_skip_functions")]
    pub skip_functions: Vec<String>,
    /// Extra regexes flagging literals as mock data
    #[serde(default)]
    pub mock_literal_rules: Vec<MockRuleConfig>,
    /// Reserved example domains
    #[serde(default = "default_example_domains")]
    pub example_domains: Vec<String>,
    #[serde(default = "default_min_sequence_len")]
    pub min_sequence_len: usize,
    #[serde(default = "default_min_id_digits")]
    pub min_id_digits: usize,
    /// Per-attempt registry timeout in milliseconds (default: 5000)
    #[serde(default = "default_lookup_timeout_ms", alias = "dependency_lookup_timeout")]
    pub dependency_lookup_timeout_ms: u64,
    /// Retries after the first failed lookup (default: 2)
    #[serde(default = "default_retry_budget")]
    pub dependency_retry_budget: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,
    /// How long registry answers are cached, in hours (default: 24)
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u32,
    /// How long failed lookups are cached, in seconds (default: 60)
    #[serde(default = "default_failure_ttl_secs")]
    pub failure_ttl_secs: u64,
    /// Persist registry answers under the user cache directory
    #[serde(default = "default_true")]
    pub disk_cache: bool,
    /// Module names or glob patterns never checked against a registry
    #[serde(default)]
    pub allowlist: Vec<String>,
    /// Extra standard-library names per ecosystem (`pypi`, `crates`)
    #[serde(default)]
    pub stdlib_extra: BTreeMap<String, Vec<String>>,
    /// Glob patterns for paths to skip during traversal
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

fn default_complexity_threshold() -> u32 {
    10
}

fn default_real_logic_complexity() -> u32 {
    3
}

fn default_markers() -> Vec<String> {
    DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect()
}

fn default_skip_functions() -> Vec<String> {
    StubDetectorConfig::default().skip_functions
}

fn default_example_domains() -> Vec<String> {
    MockDetectorConfig::default().example_domains
}

fn default_min_sequence_len() -> usize {
    3
}

fn default_min_id_digits() -> usize {
    5
}

fn default_lookup_timeout_ms() -> u64 {
    5000
}

fn default_retry_budget() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_max_concurrent_lookups() -> usize {
    8
}

fn default_cache_ttl_hours() -> u32 {
    24
}

fn default_failure_ttl_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            complexity_threshold: default_complexity_threshold(),
            real_logic_complexity: default_real_logic_complexity(),
            stub_marker_set: default_markers(),
            skip_functions: default_skip_functions(),
            mock_literal_rules: Vec::new(),
            example_domains: default_example_domains(),
            min_sequence_len: default_min_sequence_len(),
            min_id_digits: default_min_id_digits(),
            dependency_lookup_timeout_ms: default_lookup_timeout_ms(),
            dependency_retry_budget: default_retry_budget(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_concurrent_lookups: default_max_concurrent_lookups(),
            cache_ttl_hours: default_cache_ttl_hours(),
            failure_ttl_secs: default_failure_ttl_secs(),
            disk_cache: true,
            allowlist: Vec::new(),
            stdlib_extra: BTreeMap::new(),
            excluded_paths: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content, path)
    }

    /// Find a config file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Load the config discovered in `dir`, or defaults when there is none.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        match Self::discover(dir) {
            Some(path) => Self::parse_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Check ranges and compile every pattern.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(self.complexity_threshold >= 1, "complexity_threshold", "must be at least 1")?;
        require(self.real_logic_complexity >= 1, "real_logic_complexity", "must be at least 1")?;
        require(self.min_sequence_len >= 2, "min_sequence_len", "must be at least 2")?;
        require(self.min_id_digits >= 1, "min_id_digits", "must be at least 1")?;
        require(
            self.dependency_lookup_timeout_ms >= 1,
            "dependency_lookup_timeout_ms",
            "must be positive",
        )?;
        require(self.dependency_retry_budget <= 10, "dependency_retry_budget", "must be at most 10")?;
        require(self.max_concurrent_lookups >= 1, "max_concurrent_lookups", "must be at least 1")?;

        self.extractor()?;
        self.mock_detector()?;
        self.allowlist()?;
        self.stdlib()?;
        globset_for(&self.excluded_paths, "excluded_paths")?;
        Ok(())
    }

    pub fn extractor(&self) -> Result<Extractor, ConfigError> {
        Extractor::new(&self.stub_marker_set).map_err(|source| ConfigError::Regex {
            field: "stub_marker_set",
            pattern: self.stub_marker_set.join(", "),
            source,
        })
    }

    pub fn stub_config(&self) -> StubDetectorConfig {
        StubDetectorConfig {
            skip_functions: self.skip_functions.clone(),
            real_logic_complexity: self.real_logic_complexity,
        }
    }

    pub fn mock_detector(&self) -> Result<MockDetector, ConfigError> {
        // Compile rules one by one first so the error names the bad pattern.
        for rule in &self.mock_literal_rules {
            regex::Regex::new(&rule.pattern).map_err(|source| ConfigError::Regex {
                field: "mock_literal_rules",
                pattern: rule.pattern.clone(),
                source,
            })?;
        }
        let config = MockDetectorConfig {
            example_domains: self.example_domains.clone(),
            min_sequence_len: self.min_sequence_len,
            min_id_digits: self.min_id_digits,
            rules: self
                .mock_literal_rules
                .iter()
                .map(|r| MockLiteralRule {
                    pattern: r.pattern.clone(),
                    description: r.description.clone(),
                })
                .collect(),
        };
        MockDetector::new(config).map_err(|source| ConfigError::Regex {
            field: "example_domains",
            pattern: self.example_domains.join(", "),
            source,
        })
    }

    pub fn allowlist(&self) -> Result<ImportAllowlist, ConfigError> {
        ImportAllowlist::new(&self.allowlist).map_err(|source| ConfigError::Glob {
            field: "allowlist",
            source,
        })
    }

    pub fn stdlib(&self) -> Result<StdlibAllowList, ConfigError> {
        let mut list = StdlibAllowList::embedded();
        for (name, modules) in &self.stdlib_extra {
            let ecosystem =
                Ecosystem::parse(name).ok_or_else(|| ConfigError::UnknownEcosystem(name.clone()))?;
            list.extend(ecosystem, modules.iter().cloned());
        }
        Ok(list)
    }

    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            lookup_timeout: Duration::from_millis(self.dependency_lookup_timeout_ms),
            retry_budget: self.dependency_retry_budget,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            positive_ttl: self.cache_ttl(),
            failure_ttl: Duration::from_secs(self.failure_ttl_secs),
            max_concurrent_lookups: self.max_concurrent_lookups,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.cache_ttl_hours) * 3600)
    }

    /// Matcher for `excluded_paths`.
    pub fn excluded_paths(&self) -> Result<globset::GlobSet, ConfigError> {
        globset_for(&self.excluded_paths, "excluded_paths")
    }
}

fn require(ok: bool, field: &'static str, message: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            message: message.to_string(),
        })
    }
}

fn globset_for(patterns: &[String], field: &'static str) -> Result<globset::GlobSet, ConfigError> {
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in patterns {
        let glob = globset::Glob::new(pattern).map_err(|source| ConfigError::Glob { field, source })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|source| ConfigError::Glob { field, source })
}

/// Written by `hollowcheck init`.
pub const DEFAULT_CONFIG_YAML: &str = r#"# hollowcheck configuration
# Every key is optional; the values below are the defaults.

# Functions above this cyclomatic complexity get an informational notice.
complexity_threshold: 10

# Functions at or above this complexity are never reported as stubs.
real_logic_complexity: 3

# Work markers looked for in comments and docstrings.
stub_marker_set: [TODO, FIXME, HACK, XXX]

# Function names never reported as stubs.
skip_functions: [main, __init__]

# Extra regexes that flag string literals as mock data.
mock_literal_rules: []
#  - pattern: "acme-test-[0-9]+"
#    description: "internal test tenant"

example_domains: [example.com, example.org, example.net]
min_sequence_len: 3
min_id_digits: 5

# Registry verification of imports.
dependency_lookup_timeout_ms: 5000
dependency_retry_budget: 2
retry_backoff_ms: 250
max_concurrent_lookups: 8
cache_ttl_hours: 24
failure_ttl_secs: 60
disk_cache: true

# Module names or globs never checked against a registry.
allowlist: []

# Extra standard-library names, keyed by ecosystem (pypi, crates).
stdlib_extra: {}

# Paths skipped during traversal.
excluded_paths: []
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_yaml_matches_defaults() {
        let parsed = ScanConfig::from_yaml(DEFAULT_CONFIG_YAML, Path::new("init")).unwrap();
        assert_eq!(parsed, ScanConfig::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let yaml = r#"
complexity_threshold: 4
dependency_lookup_timeout: 1500
allowlist: ["corp_*"]
mock_literal_rules:
  - pattern: "acme-[0-9]+"
"#;
        let config = ScanConfig::from_yaml(yaml, Path::new("t.yaml")).unwrap();
        assert_eq!(config.complexity_threshold, 4);
        assert_eq!(config.dependency_lookup_timeout_ms, 1500);
        assert_eq!(config.dependency_retry_budget, 2);
        assert_eq!(config.stub_marker_set, vec!["TODO", "FIXME", "HACK", "XXX"]);
        assert_eq!(config.mock_literal_rules[0].description, None);
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let config = ScanConfig {
            mock_literal_rules: vec![MockRuleConfig {
                pattern: "(unclosed".to_string(),
                description: None,
            }],
            ..Default::default()
        };
        match config.validate() {
            Err(ConfigError::Regex { field, pattern, .. }) => {
                assert_eq!(field, "mock_literal_rules");
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("expected regex error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        let config = ScanConfig {
            min_sequence_len: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "min_sequence_len", .. })
        ));
    }

    #[test]
    fn test_unknown_stdlib_ecosystem_rejected() {
        let mut config = ScanConfig::default();
        config.stdlib_extra.insert("npm".into(), vec!["fs".into()]);
        assert!(matches!(config.validate(), Err(ConfigError::UnknownEcosystem(_))));

        let mut config = ScanConfig::default();
        config.stdlib_extra.insert("pypi".into(), vec!["_vendored".into()]);
        assert!(config.stdlib().unwrap().contains(Ecosystem::PyPI, "_vendored"));
    }

    #[test]
    fn test_discover() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ScanConfig::discover(dir.path()).is_none());
        assert_eq!(ScanConfig::load_from_dir(dir.path()).unwrap(), ScanConfig::default());

        fs::write(dir.path().join(".hollowcheck.yaml"), "min_id_digits: 4\n").unwrap();
        let config = ScanConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.min_id_digits, 4);
    }

    #[test]
    fn test_bad_yaml_is_config_error() {
        let err = ScanConfig::from_yaml("complexity_threshold: [", Path::new("bad.yaml")).unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }
}
