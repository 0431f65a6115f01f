//! Language type: validated language code.
//!
//! A `Language` can only be constructed for codes present in the registry,
//! so every value carries a `&'static str` owned by the registry table.

use crate::error::{Result, TranslationError};
use crate::i18n::{LanguageConfig, LanguageRegistry};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A validated language code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "vi")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const ITALIAN: Language = Language { code: "it" };
    pub const VIETNAMESE: Language = Language { code: "vi" };
    pub const KOREAN: Language = Language { code: "ko" };
    pub const JAPANESE: Language = Language { code: "ja" };
    pub const CHINESE: Language = Language { code: "zh" };
    pub const THAI: Language = Language { code: "th" };
    pub const FRENCH: Language = Language { code: "fr" };
    pub const SPANISH: Language = Language { code: "es" };
    pub const ARABIC: Language = Language { code: "ar" };

    /// Create a Language from a language code string.
    ///
    /// Codes are matched case-insensitively after trimming, so `" VI "`
    /// resolves to Vietnamese.
    pub fn from_code(code: &str) -> Result<Language> {
        let normalized = code.trim().to_ascii_lowercase();
        LanguageRegistry::get()
            .get_by_code(&normalized)
            .map(|config| Language { code: config.code })
            .ok_or_else(|| TranslationError::UnknownLanguage(code.to_string()))
    }

    /// The canonical (preferred source) language.
    pub fn canonical() -> Language {
        Language {
            code: LanguageRegistry::get().canonical().code,
        }
    }

    /// Every supported language, in registry order.
    pub fn all() -> Vec<Language> {
        LanguageRegistry::get()
            .list_all()
            .iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is not registered. Construction only goes through
    /// `from_code` or the constants above, so this cannot happen.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// English name of the language, as used in prompts.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_rtl(&self) -> bool {
        self.config().rtl
    }

    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }

    /// Sort key placing languages in registry order.
    pub(crate) fn registry_rank(&self) -> usize {
        LanguageRegistry::get()
            .position(self.code)
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl FromStr for Language {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self> {
        Language::from_code(s)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Language::from_code(&code).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_constant() {
        assert_eq!(Language::ENGLISH.code(), "en");
        assert_eq!(Language::ENGLISH.name(), "English");
        assert!(Language::ENGLISH.is_canonical());
    }

    #[test]
    fn test_constants_are_registered() {
        for lang in [
            Language::ENGLISH,
            Language::ITALIAN,
            Language::VIETNAMESE,
            Language::KOREAN,
            Language::JAPANESE,
            Language::CHINESE,
            Language::THAI,
            Language::FRENCH,
            Language::SPANISH,
            Language::ARABIC,
        ] {
            assert!(
                LanguageRegistry::get().is_supported(lang.code()),
                "{} missing from registry",
                lang
            );
        }
    }

    #[test]
    fn test_from_code_vietnamese() {
        let language = Language::from_code("vi").expect("Should succeed");
        assert_eq!(language, Language::VIETNAMESE);
        assert_eq!(language.native_name(), "Tiếng Việt");
    }

    #[test]
    fn test_from_code_normalizes_case_and_whitespace() {
        assert_eq!(Language::from_code(" KO ").ok(), Some(Language::KOREAN));
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("tlh");
        assert!(matches!(result, Err(TranslationError::UnknownLanguage(code)) if code == "tlh"));
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_canonical_returns_english() {
        assert_eq!(Language::canonical(), Language::ENGLISH);
    }

    #[test]
    fn test_all_starts_with_english() {
        let all = Language::all();
        assert_eq!(all.len(), 20);
        assert_eq!(all[0], Language::ENGLISH);
    }

    #[test]
    fn test_arabic_is_rtl() {
        assert!(Language::ARABIC.is_rtl());
        assert!(!Language::KOREAN.is_rtl());
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::THAI.to_string(), "th");
    }

    #[test]
    fn test_parse_via_from_str() {
        let lang: Language = "ja".parse().expect("Should parse");
        assert_eq!(lang, Language::JAPANESE);
    }

    #[test]
    fn test_serde_uses_code_string() {
        let json = serde_json::to_string(&Language::KOREAN).expect("serialize");
        assert_eq!(json, "\"ko\"");

        let lang: Language = serde_json::from_str("\"fr\"").expect("deserialize");
        assert_eq!(lang, Language::FRENCH);

        assert!(serde_json::from_str::<Language>("\"xx\"").is_err());
    }

    #[test]
    fn test_registry_rank() {
        assert_eq!(Language::ENGLISH.registry_rank(), 0);
        assert!(Language::VIETNAMESE.registry_rank() < Language::KOREAN.registry_rank());
    }
}
