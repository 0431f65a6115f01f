//! Translation providers: one adapter per LLM backend.
//!
//! The engine only ever talks to `dyn TranslationProvider`. Concrete adapters
//! are chosen from the closed `ProviderId` set at construction time.

pub mod anthropic;
pub mod openai;

use crate::error::{Result, TranslationError};
use crate::pricing::{known_model_pricing, Pricing};
use crate::types::{BatchResult, TranslationRequest, TranslationResult};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

/// Contract every translation backend implements.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Identifier stamped into every result this provider produces
    fn id(&self) -> &str;

    /// List price used for estimates and as the usage-less fallback
    fn pricing(&self) -> Pricing;

    /// Translate one request into all of its target languages.
    ///
    /// Fails with `ProviderUnavailable` when the backend cannot be reached or
    /// refuses the call, and with `ResponseParseError` when its reply cannot
    /// be decoded. Languages the backend skipped are absent from the result.
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult>;

    /// Translate several requests. Overrides must return the same results in
    /// the same order as this sequential default.
    async fn translate_batch(&self, requests: &[TranslationRequest]) -> Result<BatchResult> {
        let started = Instant::now();
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.translate(request).await?);
        }
        Ok(BatchResult::new(results, started.elapsed()))
    }

    /// Call-free cost estimate in USD.
    fn estimate_cost(&self, request: &TranslationRequest) -> f64 {
        self.pricing().estimate(request)
    }

    /// Cheap liveness probe. Never errors; `false` on any failure.
    async fn is_available(&self) -> bool;
}

/// Known backend tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    /// OpenAI gpt-4o-mini: fast and cheap
    FastCheap,
    /// Anthropic Claude Sonnet: slower, higher fidelity
    Premium,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::FastCheap, ProviderId::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::FastCheap => "fast-cheap",
            ProviderId::Premium => "premium",
        }
    }

    /// Credential source key holding this tier's API key
    pub fn credential_key(&self) -> &'static str {
        match self {
            ProviderId::FastCheap => "OPENAI_API_KEY",
            ProviderId::Premium => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::FastCheap => "gpt-4o-mini",
            ProviderId::Premium => "claude-sonnet-4-5",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::FastCheap => "https://api.openai.com/v1",
            ProviderId::Premium => "https://api.anthropic.com/v1",
        }
    }

    /// Price of the tier's default model
    pub fn default_pricing(&self) -> Pricing {
        match self {
            ProviderId::FastCheap => Pricing::new(0.15, 0.60),
            ProviderId::Premium => Pricing::new(3.00, 15.00),
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast-cheap" | "fast_cheap" | "fast" | "openai" => Ok(ProviderId::FastCheap),
            "premium" | "anthropic" => Ok(ProviderId::Premium),
            _ => Err(TranslationError::UnknownProvider(s.to_string())),
        }
    }
}

/// Per-adapter settings shared by every tier.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Model override; tier default when `None`
    pub model: Option<String>,
    /// API base URL override (e.g. a proxy or a mock server)
    pub base_url: Option<String>,
    /// Whole-request timeout; expiry surfaces as `ProviderUnavailable`
    pub timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            model: None,
            base_url: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ProviderSettings {
    pub(crate) fn model_for(&self, id: ProviderId) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| id.default_model().to_string())
    }

    pub(crate) fn base_url_for(&self, id: ProviderId) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(id.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    pub(crate) fn pricing_for(&self, id: ProviderId) -> Pricing {
        known_model_pricing(&self.model_for(id)).unwrap_or_else(|| id.default_pricing())
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| TranslationError::Config(format!("failed to build HTTP client: {}", e)))
    }
}

/// Build the adapter for `id`.
///
/// Fails with `MissingCredential` when the credential is absent or blank.
pub fn build_provider(
    id: ProviderId,
    credential: Option<&str>,
    settings: &ProviderSettings,
) -> Result<Arc<dyn TranslationProvider>> {
    let credential = credential
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| TranslationError::MissingCredential {
            provider: id,
            key: id.credential_key().to_string(),
        })?;

    let provider: Arc<dyn TranslationProvider> = match id {
        ProviderId::FastCheap => Arc::new(OpenAiProvider::new(credential, settings)?),
        ProviderId::Premium => Arc::new(AnthropicProvider::new(credential, settings)?),
    };
    Ok(provider)
}

/// Map a transport failure (connect, TLS, timeout, body read) for `provider`.
pub(crate) fn transport_error(provider: &str, error: reqwest::Error) -> TranslationError {
    let message = if error.is_timeout() {
        format!("request timed out: {}", error)
    } else {
        format!("request failed: {}", error)
    };
    TranslationError::ProviderUnavailable {
        provider: provider.to_string(),
        status: None,
        message,
    }
}

/// Turn a non-2xx response into `ProviderUnavailable`, keeping the body for
/// diagnostics.
pub(crate) async fn status_error(provider: &str, response: reqwest::Response) -> TranslationError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
    TranslationError::ProviderUnavailable {
        provider: provider.to_string(),
        status: Some(status.as_u16()),
        message: format!("{} API error ({}): {}", provider, status, body),
    }
}

pub(crate) fn parse_error(provider: &str, message: impl Into<String>) -> TranslationError {
    TranslationError::ResponseParseError {
        provider: provider.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_provider_id_from_str() {
        assert_eq!("fast-cheap".parse::<ProviderId>().ok(), Some(ProviderId::FastCheap));
        assert_eq!("OpenAI".parse::<ProviderId>().ok(), Some(ProviderId::FastCheap));
        assert_eq!(" premium ".parse::<ProviderId>().ok(), Some(ProviderId::Premium));
        assert_eq!("anthropic".parse::<ProviderId>().ok(), Some(ProviderId::Premium));
    }

    #[test]
    fn test_provider_id_unknown() {
        let result = "deepl".parse::<ProviderId>();
        assert!(matches!(result, Err(TranslationError::UnknownProvider(id)) if id == "deepl"));
    }

    #[test]
    fn test_provider_id_display_round_trips() {
        for id in ProviderId::ALL {
            assert_eq!(id.to_string().parse::<ProviderId>().ok(), Some(id));
        }
    }

    #[test]
    fn test_build_provider_requires_credential() {
        let settings = ProviderSettings::default();

        let missing = build_provider(ProviderId::Premium, None, &settings);
        assert!(matches!(
            missing,
            Err(TranslationError::MissingCredential { provider: ProviderId::Premium, ref key })
                if key == "ANTHROPIC_API_KEY"
        ));

        let blank = build_provider(ProviderId::FastCheap, Some("   "), &settings);
        assert!(matches!(blank, Err(TranslationError::MissingCredential { .. })));
    }

    #[test]
    fn test_build_provider_selects_adapter() {
        let settings = ProviderSettings::default();

        let fast = build_provider(ProviderId::FastCheap, Some("sk-test"), &settings)
            .expect("Should build");
        assert_eq!(fast.id(), "openai");

        let premium = build_provider(ProviderId::Premium, Some("sk-ant-test"), &settings)
            .expect("Should build");
        assert_eq!(premium.id(), "anthropic");
    }

    #[test]
    fn test_settings_resolve_defaults_and_overrides() {
        let defaults = ProviderSettings::default();
        assert_eq!(defaults.model_for(ProviderId::FastCheap), "gpt-4o-mini");
        assert_eq!(
            defaults.base_url_for(ProviderId::Premium),
            "https://api.anthropic.com/v1"
        );

        let custom = ProviderSettings {
            model: Some("gpt-4o".to_string()),
            base_url: Some("http://localhost:9000/v1/".to_string()),
            ..ProviderSettings::default()
        };
        assert_eq!(custom.base_url_for(ProviderId::FastCheap), "http://localhost:9000/v1");
        assert_eq!(custom.pricing_for(ProviderId::FastCheap), Pricing::new(2.50, 10.00));
    }

    #[test]
    fn test_unknown_model_uses_tier_pricing() {
        let settings = ProviderSettings {
            model: Some("my-finetune".to_string()),
            ..ProviderSettings::default()
        };
        assert_eq!(
            settings.pricing_for(ProviderId::Premium),
            ProviderId::Premium.default_pricing()
        );
    }

    /// Provider that echoes the text with a language prefix
    struct EchoProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TranslationProvider for EchoProvider {
        fn id(&self) -> &str {
            "echo"
        }

        fn pricing(&self) -> Pricing {
            Pricing::new(1.0, 2.0)
        }

        async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TranslationResult {
                original: request.text.clone(),
                source_language: request.source_language,
                translations: request
                    .targets()
                    .into_iter()
                    .map(|lang| (lang, format!("[{}] {}", lang, request.text)))
                    .collect(),
                provider: self.id().to_string(),
                cached: false,
                cost: Some(0.5),
            })
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_default_translate_batch_is_sequential_and_ordered() {
        let provider = EchoProvider {
            calls: AtomicUsize::new(0),
        };
        let requests = vec![
            TranslationRequest::new("Latte", Language::ENGLISH, vec![Language::KOREAN]),
            TranslationRequest::new("Mocha", Language::ENGLISH, vec![Language::JAPANESE]),
        ];

        let batch = provider.translate_batch(&requests).await.expect("Should succeed");

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(batch.results[0].original, "Latte");
        assert_eq!(batch.results[1].original, "Mocha");
        assert!((batch.total_cost - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_default_estimate_cost_uses_pricing() {
        let provider = EchoProvider {
            calls: AtomicUsize::new(0),
        };
        let request = TranslationRequest::new("abcdefgh", Language::ENGLISH, vec![Language::KOREAN]);
        // 2 input tokens at $1/M, 2 output tokens at $2/M
        let expected = 2.0 / 1e6 + 4.0 / 1e6;
        assert!((provider.estimate_cost(&request) - expected).abs() < 1e-15);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
