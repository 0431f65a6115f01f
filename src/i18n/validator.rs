//! Translation quality validation module.
//!
//! Checks that a translated string kept the parts of the source that must
//! survive translation untouched: template placeholders, URLs, markup and
//! line structure (when formatting is preserved), and glossary terms.

use crate::types::TranslationRequest;
use regex::Regex;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that break rendering (e.g. a dropped `{price}` placeholder)
    pub errors: Vec<String>,

    /// Non-critical differences worth logging
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator for translation quality.
pub struct TranslationValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static HTML_TAG_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    /// Validate one translated variant against the request it answers.
    pub fn validate(request: &TranslationRequest, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::new();
        let original = request.text.as_str();

        if translated.trim().is_empty() {
            report.errors.push("Translation is empty".to_string());
            return report;
        }

        let mut orig_placeholders = Self::extract_placeholders(original);
        let mut trans_placeholders = Self::extract_placeholders(translated);
        orig_placeholders.sort();
        trans_placeholders.sort();
        if orig_placeholders != trans_placeholders {
            report.errors.push(format!(
                "Placeholder mismatch: original has {:?}, translation has {:?}",
                orig_placeholders, trans_placeholders
            ));
        }

        let orig_urls = Self::extract_urls(original);
        let trans_urls = Self::extract_urls(translated);
        if orig_urls != trans_urls {
            report.warnings.push(format!(
                "URL mismatch: original has {} URLs, translation has {} URLs",
                orig_urls.len(),
                trans_urls.len()
            ));
        }

        if request.preserve_formatting {
            let orig_tags = Self::extract_html_tags(original);
            let trans_tags = Self::extract_html_tags(translated);
            if orig_tags != trans_tags {
                report.warnings.push(format!(
                    "Markup mismatch: original has {:?}, translation has {:?}",
                    orig_tags, trans_tags
                ));
            }

            let orig_lines = original.lines().count();
            let trans_lines = translated.lines().count();
            if orig_lines != trans_lines {
                report.warnings.push(format!(
                    "Line count mismatch: original has {}, translation has {}",
                    orig_lines, trans_lines
                ));
            }
        }

        let original_lower = original.to_lowercase();
        for (term, forced) in &request.glossary {
            if original_lower.contains(&term.to_lowercase()) && !translated.contains(forced.as_str())
            {
                report.warnings.push(format!(
                    "Glossary term '{}' was not rendered as '{}'",
                    term, forced
                ));
            }
        }

        report
    }

    /// Extract `{name}` / `{{name}}` template placeholders
    fn extract_placeholders(text: &str) -> Vec<String> {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{\{?\s*[a-zA-Z0-9_.]+\s*\}?\}").unwrap());

        regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn extract_urls(text: &str) -> Vec<String> {
        let regex = URL_REGEX.get_or_init(|| Regex::new(r"https?://[^\s)\]]+").unwrap());

        regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Extract HTML tag names in document order (`<b>`, `</b>`, `<br/>`)
    fn extract_html_tags(text: &str) -> Vec<String> {
        let regex =
            HTML_TAG_REGEX.get_or_init(|| Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)[^>]*>").unwrap());

        regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(0).map(|m| m.as_str().to_string()))
            .collect()
    }
}
