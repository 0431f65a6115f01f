use crate::cache::DEFAULT_TTL;
use crate::error::{Result, TranslationError};
use crate::provider::{ProviderId, ProviderSettings};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// Where API keys and settings are read from.
pub trait CredentialSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Process environment. Binaries load `.env` with `dotenvy` first.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub provider: ProviderId,
    /// API key for `provider`; checked when the engine is built
    pub credential: Option<String>,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub settings: ProviderSettings,
}

impl EngineConfig {
    /// Config for `provider` with every other setting at its default.
    pub fn new(provider: ProviderId, credential: impl Into<String>) -> Self {
        Self {
            provider,
            credential: Some(credential.into()),
            cache_enabled: true,
            cache_ttl: DEFAULT_TTL,
            settings: ProviderSettings::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_source(&EnvCredentials)
    }

    pub fn from_source(source: &dyn CredentialSource) -> Result<Self> {
        let provider = match non_blank(source, "TRANSLATION_PROVIDER") {
            Some(value) => value.parse()?,
            None => ProviderId::FastCheap,
        };

        Ok(Self {
            provider,
            credential: non_blank(source, provider.credential_key()),

            // Cache
            cache_enabled: parse_or(source, "TRANSLATION_CACHE_ENABLED", true, parse_bool)?,
            cache_ttl: Duration::from_secs(parse_or(
                source,
                "TRANSLATION_CACHE_TTL_SECS",
                DEFAULT_TTL.as_secs(),
                u64::from_str,
            )?),

            // Provider
            settings: ProviderSettings {
                model: non_blank(source, "TRANSLATION_MODEL"),
                base_url: non_blank(source, "TRANSLATION_API_URL"),
                timeout: Duration::from_secs(parse_or(
                    source,
                    "TRANSLATION_TIMEOUT_SECS",
                    30,
                    u64::from_str,
                )?),
            },
        })
    }

    /// Engine options without the provider choice.
    pub(crate) fn options(&self) -> crate::engine::EngineOptions {
        crate::engine::EngineOptions {
            cache_enabled: self.cache_enabled,
            cache_ttl: self.cache_ttl,
            settings: self.settings.clone(),
        }
    }
}

fn non_blank(source: &dyn CredentialSource, key: &str) -> Option<String> {
    source
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `key` when set, `default` otherwise. A value that is set but does
/// not parse is an error rather than a silent default.
fn parse_or<T, E, F>(source: &dyn CredentialSource, key: &str, default: T, parse: F) -> Result<T>
where
    F: Fn(&str) -> std::result::Result<T, E>,
    E: std::fmt::Display,
{
    match non_blank(source, key) {
        Some(value) => parse(&value)
            .map_err(|e| TranslationError::Config(format!("{}='{}': {}", key, value, e))),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}
