// hollowcheck:ignore-file mock - placeholder dictionaries and test fixtures
//! Detection of mock and placeholder data in literals.
//!
//! Literals are classified into placeholder families: example domains and
//! emails, lorem ipsum, masked phone numbers, default secrets, fake-looking
//! identifiers, and sequential ID groups inside one container. Each literal
//! produces at most one finding.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::{FactSheet, LiteralFact, LiteralKind};

use super::{Detector, Finding, FindingKind, LineSpan, Severity};

lazy_static! {
    static ref LOREM_IPSUM: Regex = Regex::new(r"(?i)\blorem\s+ipsum\b").unwrap();
    static ref MASKED_PHONE: Regex =
        Regex::new(r"^\(?[xX#]{3}\)?[-. ]?[xX#]{3}[-. ][xX#]{4}$").unwrap();
    static ref FICTIONAL_PHONE: Regex =
        Regex::new(r"^(?:\+?1[-. ]?)?(?:\(?\d{3}\)?[-. ]?)?555[-. ]\d{4}$").unwrap();
    static ref EMAIL: Regex =
        Regex::new(r"^([A-Za-z0-9._%+-]+)@([A-Za-z0-9.-]+\.[A-Za-z]{2,})$").unwrap();
    static ref CREDENTIAL_NAME: Regex = Regex::new(
        r"(^|_)(password|passwd|pass|pwd|secret|token|api_key|apikey|credentials?|auth)($|_)"
    )
    .unwrap();
    static ref IDENTIFIER_NAME: Regex = Regex::new(r"(^|_)(id|ids|uid|pk)$").unwrap();
    static ref PHONE_NAME: Regex =
        Regex::new(r"(^|_)(phone|mobile|tel|telephone|cell)($|_)").unwrap();
    static ref EMAIL_NAME: Regex = Regex::new(r"(^|_)(e?mail|email_address)($|_)").unwrap();
}

/// Passwords and keys that only ever appear as defaults.
const DEFAULT_SECRETS: &[&str] = &[
    "changeme",
    "change_me",
    "changeit",
    "asdf1234",
    "passw0rd",
    "password123",
    "hunter2",
    "letmein",
    "qwerty123",
    "secret123",
    "admin123",
];

/// Mailbox names used in documentation-style addresses.
const PLACEHOLDER_EMAIL_USERS: &[&str] = &[
    "test", "user", "foo", "bar", "example", "admin", "john.doe", "jane.doe", "someone",
];

/// Domains that never host real mailboxes.
const PLACEHOLDER_EMAIL_DOMAINS: &[&str] = &[
    "test.com",
    "domain.com",
    "yourdomain.com",
    "mydomain.com",
    "email.com",
    "company.com",
];

/// A user supplied regex rule for literals.
#[derive(Debug, Clone)]
pub struct MockLiteralRule {
    pub pattern: String,
    pub description: Option<String>,
}

/// Configuration for mock detection.
#[derive(Debug, Clone)]
pub struct MockDetectorConfig {
    /// Reserved example domains (RFC 2606 style).
    pub example_domains: Vec<String>,
    /// Minimum number of ID-like values that form a suspicious sequence.
    pub min_sequence_len: usize,
    /// Minimum digits for a value in a container to count as ID-like.
    pub min_id_digits: usize,
    /// Extra user rules, checked before the built-in families.
    pub rules: Vec<MockLiteralRule>,
}

impl Default for MockDetectorConfig {
    fn default() -> Self {
        Self {
            example_domains: vec![
                "example.com".to_string(),
                "example.org".to_string(),
                "example.net".to_string(),
            ],
            min_sequence_len: 3,
            min_id_digits: 5,
            rules: Vec::new(),
        }
    }
}

/// Pre-compiled mock rule with metadata.
struct CompiledMockRule {
    regex: Regex,
    description: String,
}

/// Mock/placeholder detector over literal facts.
pub struct MockDetector {
    config: MockDetectorConfig,
    domain: Option<Regex>,
    rules: Vec<CompiledMockRule>,
}

impl MockDetector {
    /// Compile the configured domains and rules.
    pub fn new(config: MockDetectorConfig) -> Result<Self, regex::Error> {
        let domain = if config.example_domains.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = config
                .example_domains
                .iter()
                .map(|d| regex::escape(d))
                .collect();
            Some(Regex::new(&format!(
                r"(?i)(?:^|[@/.\s])(?:{})(?:$|[/:?#\s])",
                alternatives.join("|")
            ))?)
        };

        let rules = config
            .rules
            .iter()
            .map(|rule| {
                Ok(CompiledMockRule {
                    regex: Regex::new(&rule.pattern)?,
                    description: rule
                        .description
                        .clone()
                        .unwrap_or_else(|| format!("matches mock rule /{}/", rule.pattern)),
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            config,
            domain,
            rules,
        })
    }

    /// Classify one string or number literal.
    fn classify(&self, literal: &LiteralFact) -> Option<String> {
        let value = literal.value.trim();
        if value.is_empty() {
            return None;
        }
        let binding = literal.context.binding.as_deref().map(normalize_binding);
        let binding = binding.as_deref().unwrap_or("");

        if literal.kind == LiteralKind::String {
            if let Some(rule) = self.rules.iter().find(|r| r.regex.is_match(value)) {
                return Some(rule.description.clone());
            }
            if LOREM_IPSUM.is_match(value) {
                return Some("lorem ipsum placeholder text".to_string());
            }
            if let Some(caps) = EMAIL.captures(value) {
                let user = caps[1].to_lowercase();
                let domain = caps[2].to_lowercase();
                if self.is_example_domain(&domain) {
                    return Some("email address on an example domain".to_string());
                }
                if PLACEHOLDER_EMAIL_DOMAINS.contains(&domain.as_str()) {
                    return Some("placeholder email address".to_string());
                }
                if EMAIL_NAME.is_match(binding) && PLACEHOLDER_EMAIL_USERS.contains(&user.as_str())
                {
                    return Some("placeholder email address".to_string());
                }
            }
            if self.domain.as_ref().is_some_and(|d| d.is_match(value)) {
                return Some("example domain".to_string());
            }
            if MASKED_PHONE.is_match(value) || FICTIONAL_PHONE.is_match(value) {
                return Some("placeholder phone number".to_string());
            }
            if DEFAULT_SECRETS.contains(&value.to_lowercase().as_str()) {
                return Some("default secret".to_string());
            }
            if CREDENTIAL_NAME.is_match(binding) && is_weak_secret(value) {
                return Some(format!("weak secret bound to '{}'", binding));
            }
        }

        if IDENTIFIER_NAME.is_match(binding) && value.len() >= 3 && is_fake_digits(value) {
            return Some(format!("fake identifier bound to '{}'", binding));
        }
        if PHONE_NAME.is_match(binding) {
            let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.len() >= 7 && is_fake_digits(&digits) {
                return Some(format!("fake phone number bound to '{}'", binding));
            }
        }
        None
    }

    fn is_example_domain(&self, domain: &str) -> bool {
        self.config
            .example_domains
            .iter()
            .any(|d| domain == d || domain.ends_with(&format!(".{}", d)))
    }

    /// Find a run of ID-like values in the container forming a sequence.
    fn sequence_in(&self, sheet: &FactSheet, list: &LiteralFact) -> Option<Vec<String>> {
        let window = self.config.min_sequence_len.max(2);
        let mut run: Vec<(&str, u64)> = Vec::new();

        let elements = sheet.container_elements(list.span.start_byte);
        for element in elements {
            match self.id_value(element) {
                Some(parsed) => run.push((element.value.as_str(), parsed)),
                None => run.clear(),
            }
            if run.len() >= window {
                let candidate = &run[run.len() - window..];
                if is_sequence(candidate) {
                    return Some(candidate.iter().map(|(v, _)| v.to_string()).collect());
                }
            }
        }
        None
    }

    fn id_value(&self, element: &LiteralFact) -> Option<u64> {
        let value = element.value.trim();
        let digits_only = !value.is_empty() && value.chars().all(|c| c.is_ascii_digit());
        if !digits_only || value.len() < self.config.min_id_digits {
            return None;
        }
        value.parse().ok()
    }
}

impl Detector for MockDetector {
    fn name(&self) -> &'static str {
        "mocks"
    }

    fn detect(&self, sheet: &FactSheet) -> Vec<Finding> {
        let mut findings = Vec::new();

        for literal in &sheet.literals {
            let span = LineSpan::new(literal.span.start_line, literal.span.end_line);
            match literal.kind {
                LiteralKind::List => {
                    if let Some(values) = self.sequence_in(sheet, literal) {
                        let evidence = values.join(", ");
                        findings.push(Finding::new(
                            FindingKind::Mock,
                            Severity::Warning,
                            &sheet.path,
                            span,
                            format!("sequential or repeated placeholder IDs: [{}]", evidence),
                            evidence,
                        ));
                    }
                }
                LiteralKind::String | LiteralKind::Number => {
                    if let Some(description) = self.classify(literal) {
                        let evidence = truncate(&literal.value, 120);
                        findings.push(Finding::new(
                            FindingKind::Mock,
                            Severity::Warning,
                            &sheet.path,
                            span,
                            format!("{}: \"{}\"", description, evidence),
                            evidence,
                        ));
                    }
                }
            }
        }

        findings
    }
}

/// `apiKey` -> `api_key`, `API_KEY` -> `api_key`.
fn normalize_binding(name: &str) -> String {
    let has_lower = name.chars().any(|c| c.is_ascii_lowercase());
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if has_lower && c.is_ascii_uppercase() && i > 0 && !out.ends_with('_') {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Short all-lowercase alphanumeric token, the shape of a typed-in default.
fn is_weak_secret(value: &str) -> bool {
    value.len() <= 8
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// All-same digits (`00000`) or a strictly ascending/descending run (`12345`).
fn is_fake_digits(value: &str) -> bool {
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 3 || digits.len() != value.chars().count() {
        return false;
    }
    let steps: Vec<i64> = digits
        .windows(2)
        .map(|w| i64::from(w[1]) - i64::from(w[0]))
        .collect();
    steps.iter().all(|&s| s == 0) || steps.iter().all(|&s| s == 1) || steps.iter().all(|&s| s == -1)
}

/// Arithmetic progression (constant step, including repeats) or a series of
/// same-length repeated-digit values.
fn is_sequence(values: &[(&str, u64)]) -> bool {
    let numbers: Vec<i128> = values.iter().map(|(_, n)| i128::from(*n)).collect();
    let step = numbers[1] - numbers[0];
    if numbers.windows(2).all(|w| w[1] - w[0] == step) {
        return true;
    }
    let len = values[0].0.len();
    values.iter().all(|(v, _)| {
        v.len() == len && v.chars().all(|c| Some(c) == v.chars().next())
    })
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let cut: String = value.chars().take(max).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Extractor, SourceUnit};

    fn detect(path: &str, source: &str) -> Vec<Finding> {
        detect_with(path, source, MockDetectorConfig::default())
    }

    fn detect_with(path: &str, source: &str, config: MockDetectorConfig) -> Vec<Finding> {
        let unit = SourceUnit::detect(path, source).unwrap();
        let sheet = Extractor::default().extract(&unit).unwrap();
        MockDetector::new(config).unwrap().detect(&sheet)
    }

    fn evidence(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.evidence()).collect()
    }

    #[test]
    fn test_families() {
        let source = r#"
email = "test@example.com"
site = "https://api.example.com/v1"
text = "Lorem ipsum dolor sit amet"
phone = "xxx-xxx-xxxx"
fictional = "555-0199"
password = "changeme"
"#;
        let findings = detect("a.py", source);
        assert_eq!(
            evidence(&findings),
            vec![
                "test@example.com",
                "https://api.example.com/v1",
                "Lorem ipsum dolor sit amet",
                "xxx-xxx-xxxx",
                "555-0199",
                "changeme",
            ]
        );
        assert!(findings.iter().all(|f| f.kind() == FindingKind::Mock));
        assert!(findings.iter().all(|f| f.severity() == Severity::Warning));
    }

    #[test]
    fn test_unrelated_values_not_flagged() {
        let source = r#"
MAX_CONNECTIONS = 100
port = 8080
name = "foo"
url = "https://docs.python.org/3/"
counter_id = "48213"
sample = "notexample.com"
"#;
        assert!(detect("a.py", source).is_empty());
    }

    #[test]
    fn test_bound_identifiers() {
        let source = r#"
user = User(id="12345", order_id="00000", ref_id="40721")
"#;
        let findings = detect("a.py", source);
        assert_eq!(evidence(&findings), vec!["12345", "00000"]);
        assert!(findings[0].message().contains("fake identifier bound to 'id'"));
    }

    #[test]
    fn test_credential_binding() {
        let source = r#"
fn config() -> Config {
    Config {
        api_key: "sk_live_Zq81".to_string(),
        apiToken: "abc123".to_string(),
        label: "abc123".to_string(),
    }
}
"#;
        let findings = detect("a.rs", source);
        assert_eq!(evidence(&findings), vec!["abc123"]);
        assert!(findings[0].message().contains("api_token"));
    }

    #[test]
    fn test_sequences_in_containers() {
        let source = r#"
fn ids() -> Vec<&'static str> {
    vec!["11111", "22222", "33333"]
}

fn more() -> [u64; 3] {
    [40000, 40001, 40002]
}

fn real() -> [u64; 3] {
    [48213, 91822, 10394]
}

fn small() -> [u32; 4] {
    [1, 2, 3, 4]
}
"#;
        let findings = detect("a.rs", source);
        assert_eq!(
            evidence(&findings),
            vec!["11111, 22222, 33333", "40000, 40001, 40002"]
        );
    }

    #[test]
    fn test_sequence_windows_are_per_container() {
        let source = r#"
a = ["10000", "20000"]
b = ["30000", "99999"]
"#;
        assert!(detect("a.py", source).is_empty());
    }

    #[test]
    fn test_user_rules() {
        let config = MockDetectorConfig {
            rules: vec![MockLiteralRule {
                pattern: r"^ACME-\d+$".to_string(),
                description: Some("internal placeholder SKU".to_string()),
            }],
            ..MockDetectorConfig::default()
        };
        let findings = detect_with("a.py", "sku = \"ACME-0001\"\n", config);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message().starts_with("internal placeholder SKU"));
    }

    #[test]
    fn test_invalid_rule_is_error() {
        let config = MockDetectorConfig {
            rules: vec![MockLiteralRule {
                pattern: "(".to_string(),
                description: None,
            }],
            ..MockDetectorConfig::default()
        };
        assert!(MockDetector::new(config).is_err());
    }

    #[test]
    fn test_fake_digit_shapes() {
        assert!(is_fake_digits("12345"));
        assert!(is_fake_digits("54321"));
        assert!(is_fake_digits("000"));
        assert!(!is_fake_digits("12"));
        assert!(!is_fake_digits("40721"));
        assert!(!is_fake_digits("12a45"));
    }

    #[test]
    fn test_normalize_binding() {
        assert_eq!(normalize_binding("apiKey"), "api_key");
        assert_eq!(normalize_binding("API_KEY"), "api_key");
        assert_eq!(normalize_binding("user_id"), "user_id");
    }
}
