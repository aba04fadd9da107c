//! PyPI (Python Package Index) registry client.
//!
//! Checks package existence via: GET https://pypi.org/pypi/{package}/json

use std::time::Duration;

use reqwest::Client;

use super::{fetch_status, PackageStatus, RegistryError};

/// Import names whose distribution is published under a different name.
const IMPORT_ALIASES: &[(&str, &str)] = &[
    ("attr", "attrs"),
    ("bs4", "beautifulsoup4"),
    ("cv2", "opencv-python"),
    ("Crypto", "pycryptodome"),
    ("dateutil", "python-dateutil"),
    ("docx", "python-docx"),
    ("dotenv", "python-dotenv"),
    ("git", "gitpython"),
    ("google", "google-api-core"),
    ("jwt", "pyjwt"),
    ("magic", "python-magic"),
    ("MySQLdb", "mysqlclient"),
    ("OpenSSL", "pyopenssl"),
    ("PIL", "pillow"),
    ("serial", "pyserial"),
    ("skimage", "scikit-image"),
    ("sklearn", "scikit-learn"),
    ("usb", "pyusb"),
    ("yaml", "pyyaml"),
    ("zmq", "pyzmq"),
];

/// Check if a package exists on PyPI.
pub async fn check(
    client: &Client,
    module: &str,
    timeout: Duration,
) -> Result<PackageStatus, RegistryError> {
    let normalized = normalize_package_name(distribution_for(module));
    let url = format!("https://pypi.org/pypi/{}/json", normalized);

    fetch_status(client, &url, timeout).await
}

/// Distribution name for a top-level import name.
fn distribution_for(module: &str) -> &str {
    IMPORT_ALIASES
        .iter()
        .find(|(import, _)| *import == module)
        .map_or(module, |(_, dist)| dist)
}

/// Normalize a Python package name per PEP 503.
/// - Lowercase
/// - Replace consecutive runs of [-_.] with a single -
fn normalize_package_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_separator = false;

    for c in name.chars() {
        match c {
            '-' | '_' | '.' => {
                if !prev_separator {
                    result.push('-');
                    prev_separator = true;
                }
            }
            c => {
                result.push(c.to_ascii_lowercase());
                prev_separator = false;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_package_name() {
        assert_eq!(normalize_package_name("Requests"), "requests");
        assert_eq!(normalize_package_name("Flask_RESTful"), "flask-restful");
        assert_eq!(normalize_package_name("a__b--c..d"), "a-b-c-d");
    }

    #[test]
    fn test_distribution_for_aliases() {
        assert_eq!(distribution_for("yaml"), "pyyaml");
        assert_eq!(distribution_for("sklearn"), "scikit-learn");
        assert_eq!(distribution_for("PIL"), "pillow");
        assert_eq!(distribution_for("requests"), "requests");
    }
}
