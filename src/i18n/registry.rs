//! Language registry: Single source of truth for all supported languages.
//!
//! Menus, descriptions and UI labels can only be translated into languages
//! listed here. The table is static and lives behind a `OnceLock` singleton;
//! it is read-only after initialization.

use std::sync::OnceLock;

/// Display metadata for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "vi", "ko")
    pub code: &'static str,

    /// English name of the language, used in provider prompts
    pub name: &'static str,

    /// Native name of the language (e.g., "Tiếng Việt", "한국어")
    pub native_name: &'static str,

    /// Flag emoji shown in language pickers
    pub flag: &'static str,

    /// Whether the script is written right-to-left
    pub rtl: bool,

    /// Whether this is the canonical/source language (only one should be true)
    pub is_canonical: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All supported languages, in registry order.
    ///
    /// Registry order is also the fallback order used when picking a source
    /// language out of a partially translated record.
    pub fn list_all(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Position of a language in registry order.
    pub fn position(&self, code: &str) -> Option<usize> {
        self.languages.iter().position(|lang| lang.code == code)
    }

    /// Get the canonical language configuration.
    ///
    /// # Panics
    /// Panics if the static table does not define exactly one canonical
    /// language (a programming error in `default_languages`).
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }

    /// Check if a language code is supported.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// Codes of all right-to-left languages.
    pub fn rtl_codes(&self) -> Vec<&'static str> {
        self.languages
            .iter()
            .filter(|lang| lang.rtl)
            .map(|lang| lang.code)
            .collect()
    }
}

macro_rules! lang {
    ($code:literal, $name:literal, $native:literal, $flag:literal) => {
        lang!($code, $name, $native, $flag, rtl = false)
    };
    ($code:literal, $name:literal, $native:literal, $flag:literal, rtl = $rtl:literal) => {
        LanguageConfig {
            code: $code,
            name: $name,
            native_name: $native,
            flag: $flag,
            rtl: $rtl,
            is_canonical: false,
        }
    };
}

/// Languages offered to venues, English first.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            flag: "🇬🇧",
            rtl: false,
            is_canonical: true,
        },
        lang!("it", "Italian", "Italiano", "🇮🇹"),
        lang!("vi", "Vietnamese", "Tiếng Việt", "🇻🇳"),
        lang!("ko", "Korean", "한국어", "🇰🇷"),
        lang!("ja", "Japanese", "日本語", "🇯🇵"),
        lang!("ru", "Russian", "Русский", "🇷🇺"),
        lang!("zh", "Chinese (Simplified)", "简体中文", "🇨🇳"),
        lang!("th", "Thai", "ไทย", "🇹🇭"),
        lang!("fr", "French", "Français", "🇫🇷"),
        lang!("es", "Spanish", "Español", "🇪🇸"),
        lang!("pt", "Portuguese", "Português", "🇵🇹"),
        lang!("de", "German", "Deutsch", "🇩🇪"),
        lang!("tr", "Turkish", "Türkçe", "🇹🇷"),
        lang!("ar", "Arabic", "العربية", "🇸🇦", rtl = true),
        lang!("hi", "Hindi", "हिन्दी", "🇮🇳"),
        lang!("id", "Indonesian", "Bahasa Indonesia", "🇮🇩"),
        lang!("ms", "Malay", "Bahasa Melayu", "🇲🇾"),
        lang!("nl", "Dutch", "Nederlands", "🇳🇱"),
        lang!("pl", "Polish", "Polski", "🇵🇱"),
        lang!("sv", "Swedish", "Svenska", "🇸🇪"),
    ]
}
