//! Turns a [`SourceUnit`] into a [`FactSheet`].

use regex::Regex;
use tracing::debug;

use super::languages::analyzer_for;
use super::{FactSheet, Language, MarkerFact, ParseError, SourceUnit};

/// Default work markers looked for in comments and docstrings.
pub const DEFAULT_MARKERS: &[&str] = &["TODO", "FIXME", "HACK", "XXX"];

/// Structural extractor. Deterministic and free of side effects.
#[derive(Debug, Clone)]
pub struct Extractor {
    markers: Option<Regex>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKERS.iter().copied())
            .unwrap_or(Self { markers: None })
    }
}

impl Extractor {
    /// Build an extractor matching the given markers as whole words.
    ///
    /// Matching is case-sensitive, so `todo` in prose is not a marker.
    pub fn new<I, S>(markers: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = markers
            .into_iter()
            .map(|m| m.as_ref().trim().to_string())
            .filter(|m| !m.is_empty())
            .map(|m| regex::escape(&m))
            .collect();
        if alternatives.is_empty() {
            return Ok(Self { markers: None });
        }
        let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
        Ok(Self {
            markers: Some(Regex::new(&pattern)?),
        })
    }

    /// Parse the unit and collect its facts.
    ///
    /// Fails when the language is unsupported or the text does not parse
    /// cleanly.
    pub fn extract(&self, unit: &SourceUnit) -> Result<FactSheet, ParseError> {
        let language = Language::from_tag(unit.language_tag()).ok_or_else(|| {
            ParseError::UnsupportedLanguage {
                path: unit.path().to_string(),
                language: unit.language_tag().to_string(),
            }
        })?;
        let analyzer = analyzer_for(language);
        let parsed = analyzer.parse(unit.path(), unit.text().as_bytes())?;
        if let Some(line) = parsed.first_error_line() {
            return Err(ParseError::Syntax {
                path: unit.path().to_string(),
                line,
            });
        }

        let mut sheet = analyzer.extract_facts(&parsed)?;

        if let Some(markers) = &self.markers {
            for comment in analyzer.comments(&parsed) {
                for (offset, text) in comment.text.lines().enumerate() {
                    let line = comment.start_line + offset;
                    for found in markers.find_iter(text) {
                        sheet.markers.push(MarkerFact {
                            marker: found.as_str().to_string(),
                            text: text.trim().to_string(),
                            line,
                            function: sheet.function_at_line(line),
                        });
                    }
                }
            }
        }
        sheet.markers.sort_by_key(|m| m.line);
        for marker in &sheet.markers {
            if let Some(index) = marker.function {
                sheet.functions[index]
                    .comment_markers
                    .insert(marker.marker.clone());
            }
        }

        debug!(
            path = unit.path(),
            functions = sheet.functions.len(),
            literals = sheet.literals.len(),
            imports = sheet.imports.len(),
            markers = sheet.markers.len(),
            "extracted facts"
        );
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_attach_to_functions() {
        let source = r#"
/// TODO: implement actual processing logic
pub fn process(input: &str) -> Result<(), ()> {
    // FIXME: placeholder
    Ok(())
}

// XXX: file level note
"#;
        let unit = SourceUnit::new("a.rs", source, "rust");
        let sheet = Extractor::default().extract(&unit).unwrap();

        let markers: Vec<(&str, usize, Option<usize>)> = sheet
            .markers
            .iter()
            .map(|m| (m.marker.as_str(), m.line, m.function))
            .collect();
        assert_eq!(
            markers,
            vec![("TODO", 2, Some(0)), ("FIXME", 4, Some(0)), ("XXX", 8, None)]
        );
        let func = &sheet.functions[0];
        assert!(func.comment_markers.contains("TODO"));
        assert!(func.comment_markers.contains("FIXME"));
        assert!(!func.comment_markers.contains("XXX"));
    }

    #[test]
    fn test_markers_are_case_sensitive_words() {
        let source = "# todo list and TODOS\n# NOTE: fine\n# TODO(alice): real\n";
        let unit = SourceUnit::new("a.py", source, "python");
        let sheet = Extractor::default().extract(&unit).unwrap();
        assert_eq!(sheet.markers.len(), 1);
        assert_eq!(sheet.markers[0].line, 3);
    }

    #[test]
    fn test_custom_marker_set() {
        let unit = SourceUnit::new("a.py", "# NOTE: x\n# TODO: y\n", "python");
        let extractor = Extractor::new(["NOTE"]).unwrap();
        let sheet = extractor.extract(&unit).unwrap();
        assert_eq!(sheet.markers.len(), 1);
        assert_eq!(sheet.markers[0].marker, "NOTE");
    }

    #[test]
    fn test_markers_in_strings_are_ignored() {
        let unit = SourceUnit::new("a.rs", "fn f() -> &'static str { \"TODO\" }\n", "rust");
        let sheet = Extractor::default().extract(&unit).unwrap();
        assert!(sheet.markers.is_empty());
    }

    #[test]
    fn test_syntax_error() {
        let unit = SourceUnit::new("bad.py", "def broken(:\n    pass\n", "python");
        let err = Extractor::default().extract(&unit).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_unsupported_language() {
        let unit = SourceUnit::new("main.go", "package main", "go");
        let err = Extractor::default().extract(&unit).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let source = "import os\n\ndef f():\n    x = [1, 2, 3]\n    return x\n";
        let unit = SourceUnit::new("a.py", source, "python");
        let extractor = Extractor::default();
        let a = extractor.extract(&unit).unwrap();
        let b = extractor.extract(&unit).unwrap();
        assert_eq!(format!("{:?}", a), format!("{:?}", b));
    }
}
