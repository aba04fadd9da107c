//! crates.io registry client.
//!
//! Reads the sparse index (`https://index.crates.io`) rather than the web
//! API, which asks automated clients to stay off it. Index files are keyed
//! by the exact published name, and a `use` path always spells `-` as `_`,
//! so `tree_sitter` is tried as `tree_sitter` and then as `tree-sitter`.

use std::time::Duration;

use reqwest::Client;

use super::{fetch_status, PackageStatus, RegistryError};

const SPARSE_INDEX: &str = "https://index.crates.io";

/// Check if a crate exists on crates.io.
pub async fn check(
    client: &Client,
    crate_name: &str,
    timeout: Duration,
) -> Result<PackageStatus, RegistryError> {
    let mut last = PackageStatus::NotFound;
    for candidate in candidate_names(crate_name) {
        last = fetch_status(client, &index_url(&candidate), timeout).await?;
        if last == PackageStatus::Exists {
            break;
        }
    }
    Ok(last)
}

/// Published names a `use` path segment may refer to.
fn candidate_names(crate_name: &str) -> Vec<String> {
    let lower = crate_name.to_ascii_lowercase();
    let hyphenated = lower.replace('_', "-");
    if hyphenated == lower {
        vec![lower]
    } else {
        vec![lower, hyphenated]
    }
}

/// Sparse index location: `1/a`, `2/ab`, `3/a/abc`, `se/rd/serde`.
fn index_url(name: &str) -> String {
    let prefix = match name.len() {
        0 => String::new(),
        1 => "1".to_string(),
        2 => "2".to_string(),
        3 => format!("3/{}", &name[..1]),
        _ => format!("{}/{}", &name[..2], &name[2..4]),
    };
    format!("{}/{}/{}", SPARSE_INDEX, prefix, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_url() {
        assert_eq!(index_url("a"), "https://index.crates.io/1/a");
        assert_eq!(index_url("cc"), "https://index.crates.io/2/cc");
        assert_eq!(index_url("syn"), "https://index.crates.io/3/s/syn");
        assert_eq!(index_url("serde"), "https://index.crates.io/se/rd/serde");
        assert_eq!(index_url("tree-sitter"), "https://index.crates.io/tr/ee/tree-sitter");
    }

    #[test]
    fn test_candidate_names() {
        assert_eq!(candidate_names("serde"), vec!["serde"]);
        assert_eq!(candidate_names("Tree_Sitter"), vec!["tree_sitter", "tree-sitter"]);
    }
}
