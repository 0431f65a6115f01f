//! Request, result and batch types shared by the engine and its providers.

use crate::error::{Result, TranslationError};
use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Forced term translations, e.g. `"cold brew" -> "Cold Brew"`.
pub type Glossary = BTreeMap<String, String>;

/// What kind of text is being translated. Steers register and phrasing in
/// the prompt; never changes the shape of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationContext {
    MenuItem,
    Description,
    ServiceText,
    Instruction,
    LegalText,
    UiLabel,
    Ingredient,
    #[default]
    General,
}

impl TranslationContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationContext::MenuItem => "menu_item",
            TranslationContext::Description => "description",
            TranslationContext::ServiceText => "service_text",
            TranslationContext::Instruction => "instruction",
            TranslationContext::LegalText => "legal_text",
            TranslationContext::UiLabel => "ui_label",
            TranslationContext::Ingredient => "ingredient",
            TranslationContext::General => "general",
        }
    }
}

impl fmt::Display for TranslationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationContext {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self> {
        let context = match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "menu_item" => TranslationContext::MenuItem,
            "description" => TranslationContext::Description,
            "service_text" => TranslationContext::ServiceText,
            "instruction" => TranslationContext::Instruction,
            "legal_text" => TranslationContext::LegalText,
            "ui_label" => TranslationContext::UiLabel,
            "ingredient" => TranslationContext::Ingredient,
            "general" => TranslationContext::General,
            _ => {
                return Err(TranslationError::InvalidRequest(format!(
                    "unknown translation context '{}'",
                    s
                )))
            }
        };
        Ok(context)
    }
}

/// One piece of source text to translate into one or more languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: Language,
    /// Caller order is kept; duplicates are ignored.
    pub target_languages: Vec<Language>,
    #[serde(default)]
    pub context: TranslationContext,
    #[serde(default)]
    pub preserve_formatting: bool,
    #[serde(default)]
    pub glossary: Glossary,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        source_language: Language,
        target_languages: impl IntoIterator<Item = Language>,
    ) -> Self {
        let mut targets: Vec<Language> = Vec::new();
        for lang in target_languages {
            if !targets.contains(&lang) {
                targets.push(lang);
            }
        }

        Self {
            text: text.into(),
            source_language,
            target_languages: targets,
            context: TranslationContext::default(),
            preserve_formatting: false,
            glossary: Glossary::new(),
        }
    }

    pub fn with_context(mut self, context: TranslationContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_preserve_formatting(mut self, preserve: bool) -> Self {
        self.preserve_formatting = preserve;
        self
    }

    pub fn with_glossary_term(mut self, term: impl Into<String>, forced: impl Into<String>) -> Self {
        self.glossary.insert(term.into(), forced.into());
        self
    }

    pub fn with_glossary(mut self, glossary: Glossary) -> Self {
        self.glossary = glossary;
        self
    }

    /// Target languages in caller order without duplicates.
    ///
    /// The fields are public, so a caller may have pushed a duplicate after
    /// construction.
    pub fn targets(&self) -> Vec<Language> {
        let mut targets = Vec::with_capacity(self.target_languages.len());
        for &lang in &self.target_languages {
            if !targets.contains(&lang) {
                targets.push(lang);
            }
        }
        targets
    }

    /// Reject requests no provider should ever see.
    pub fn validate(&self) -> Result<()> {
        if self.target_languages.is_empty() {
            return Err(TranslationError::InvalidRequest(
                "at least one target language is required".to_string(),
            ));
        }
        if self.text.trim().is_empty() {
            return Err(TranslationError::InvalidRequest(
                "source text is blank".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of translating one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub original: String,
    pub source_language: Language,
    /// Subset of the requested targets. A language the backend failed on is
    /// simply absent.
    pub translations: BTreeMap<Language, String>,
    /// Identifier of the provider that produced the translations
    pub provider: String,
    /// Whether this answer was served from the engine cache
    pub cached: bool,
    /// Spend attributed to this call in USD, when known. Results served from
    /// the cache carry `None`: nothing was spent on them.
    pub cost: Option<f64>,
}

impl TranslationResult {
    pub fn get(&self, language: Language) -> Option<&str> {
        self.translations.get(&language).map(String::as_str)
    }

    /// Requested targets the provider did not return.
    pub fn missing_languages(&self, request: &TranslationRequest) -> Vec<Language> {
        request
            .targets()
            .into_iter()
            .filter(|lang| !self.translations.contains_key(lang))
            .collect()
    }

    pub fn is_complete(&self, request: &TranslationRequest) -> bool {
        self.missing_languages(request).is_empty()
    }
}

/// What to do when one item of a batch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchErrorPolicy {
    /// Stop at the first failing item and return its error.
    #[default]
    Abort,
    /// Record the failure in `BatchResult::failures` and keep going.
    Continue,
}

#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    pub requests: Vec<TranslationRequest>,
    pub on_error: BatchErrorPolicy,
}

impl BatchRequest {
    pub fn new(requests: Vec<TranslationRequest>) -> Self {
        Self {
            requests,
            on_error: BatchErrorPolicy::Abort,
        }
    }

    pub fn continue_on_error(mut self) -> Self {
        self.on_error = BatchErrorPolicy::Continue;
        self
    }
}

/// A batch item that failed under `BatchErrorPolicy::Continue`.
#[derive(Debug)]
pub struct BatchFailure {
    /// Position of the failing request in the batch input
    pub index: usize,
    pub error: TranslationError,
}

/// Outcome of a batch.
///
/// `results` is compacted: it holds only the successful items, in input
/// order, so under `BatchErrorPolicy::Continue` its positions shift past
/// every failure. Use [`BatchResult::result_for`] to look an item up by its
/// input index.
#[derive(Debug)]
pub struct BatchResult {
    /// Successful results, in input order, with failed items left out
    pub results: Vec<TranslationResult>,
    /// Sum of the known per-result costs; unknown costs count as zero
    pub total_cost: f64,
    /// Wall-clock duration of the whole batch
    pub processing_time: Duration,
    pub failures: Vec<BatchFailure>,
}

impl BatchResult {
    pub fn new(results: Vec<TranslationResult>, processing_time: Duration) -> Self {
        let total_cost = total_cost(&results);
        Self {
            results,
            total_cost,
            processing_time,
            failures: Vec::new(),
        }
    }

    pub fn with_failures(mut self, failures: Vec<BatchFailure>) -> Self {
        self.failures = failures;
        self
    }

    /// Result of the request at `index` in the batch input, `None` when that
    /// item failed or the index is out of range.
    pub fn result_for(&self, index: usize) -> Option<&TranslationResult> {
        if self.failure_for(index).is_some() {
            return None;
        }
        let failed_before = self.failures.iter().filter(|f| f.index < index).count();
        self.results.get(index - failed_before)
    }

    /// Error of the request at `index`, if it failed.
    pub fn failure_for(&self, index: usize) -> Option<&TranslationError> {
        self.failures
            .iter()
            .find(|f| f.index == index)
            .map(|f| &f.error)
    }
}

fn total_cost(results: &[TranslationResult]) -> f64 {
    results.iter().filter_map(|result| result.cost).sum()
}
