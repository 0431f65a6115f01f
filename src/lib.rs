//! Translation routing and caching for multilingual hospitality content.
//!
//! Menu items, descriptions and service text are translated into many
//! languages by a pluggable LLM provider. The engine caches results, sums
//! spend across batches and can fill only the missing languages of a
//! partially localized record.

pub mod cache;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod i18n;
pub mod pricing;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod types;

pub use config::{CredentialSource, EngineConfig, EnvCredentials};
pub use engine::{EngineOptions, TranslationEngine};
pub use error::{Result, TranslationError};
pub use i18n::{Language, MultiLangText};
pub use provider::{ProviderId, TranslationProvider};
pub use types::{
    BatchErrorPolicy, BatchRequest, BatchResult, TranslationContext, TranslationRequest,
    TranslationResult,
};
