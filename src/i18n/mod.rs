//! Internationalization (i18n) module for multi-language content.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Validated `Language` code type
//! - `multilang`: Sparse per-language text records with fallback lookup
//! - `validator`: Translation quality validation
//! - `metrics`: Per-engine translation counters and spend
//!
//! # Example
//!
//! ```rust,ignore
//! use menu_translator::i18n::{Language, MultiLangText};
//!
//! let name = MultiLangText::new()
//!     .with(Language::ENGLISH, "Latte")
//!     .with(Language::VIETNAMESE, "Latte Sữa");
//!
//! assert_eq!(name.missing(&[Language::VIETNAMESE, Language::KOREAN]), vec![Language::KOREAN]);
//! ```

mod language;
mod metrics;
mod multilang;
mod registry;
mod validator;

pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use multilang::MultiLangText;
pub use registry::{LanguageConfig, LanguageRegistry};
pub use validator::{TranslationValidator, ValidationReport};
