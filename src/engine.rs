//! Translation engine: cache in front of a swappable provider.
//!
//! ```text
//! translate(request)
//!   -> validate
//!   -> cache lookup --hit--> copy (cached = true, cost = None)
//!   -> miss: active provider -> filter to targets -> quality check -> store
//! ```

use crate::cache::{cache_key, TranslationCache, DEFAULT_TTL};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{Result, TranslationError};
use crate::i18n::{Language, MetricsReport, MultiLangText, TranslationMetrics, TranslationValidator};
use crate::provider::{build_provider, ProviderId, ProviderSettings, TranslationProvider};
use crate::types::{
    BatchErrorPolicy, BatchFailure, BatchRequest, BatchResult, TranslationContext,
    TranslationRequest, TranslationResult,
};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Engine settings that do not depend on which provider is active.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    /// Used when `switch_provider` builds a new adapter
    pub settings: ProviderSettings,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl: DEFAULT_TTL,
            settings: ProviderSettings::default(),
        }
    }
}

pub struct TranslationEngine {
    provider: RwLock<Arc<dyn TranslationProvider>>,
    cache: Option<TranslationCache>,
    clock: Arc<dyn Clock>,
    settings: ProviderSettings,
    metrics: TranslationMetrics,
}

impl TranslationEngine {
    /// Build the adapter named in `config` and wrap it.
    ///
    /// Fails with `MissingCredential` when the config carries no usable key
    /// for the chosen provider.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let provider = build_provider(
            config.provider,
            config.credential.as_deref(),
            &config.settings,
        )?;

        info!(
            "Translation engine using {} provider (cache {})",
            config.provider,
            if config.cache_enabled { "on" } else { "off" }
        );

        Ok(Self::with_provider(provider, config.options()))
    }

    /// Engine configured from `TRANSLATION_*` and API key environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(EngineConfig::from_env()?)
    }

    /// Engine around an already-built provider.
    pub fn with_provider(provider: Arc<dyn TranslationProvider>, options: EngineOptions) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = options
            .cache_enabled
            .then(|| TranslationCache::new(options.cache_ttl, clock.clone()));

        Self {
            provider: RwLock::new(provider),
            cache,
            clock,
            settings: options.settings,
            metrics: TranslationMetrics::new(),
        }
    }

    /// Replace the time source used for cache expiry and batch timing.
    ///
    /// Entries cached before the call are dropped.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        if let Some(cache) = &self.cache {
            self.cache = Some(TranslationCache::new(cache.ttl(), clock.clone()));
        }
        self.clock = clock;
        self
    }

    /// Snapshot of the active provider. Calls keep the provider they started
    /// with even if it is switched while they are in flight.
    fn current_provider(&self) -> Arc<dyn TranslationProvider> {
        self.provider
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn provider_id(&self) -> String {
        self.current_provider().id().to_string()
    }

    /// Translate one request, serving it from the cache when possible.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        request.validate()?;

        let key = cache_key(request);

        if let Some(cache) = &self.cache {
            if let Some(mut hit) = cache.get(&key) {
                self.metrics.record_cache_hit();
                debug!(
                    "Cache hit: {} -> {:?} ({})",
                    request.source_language,
                    request.targets(),
                    request.context
                );
                // Nothing was spent on this answer
                hit.cost = None;
                return Ok(hit);
            }
            self.metrics.record_cache_miss();
        }

        let provider = self.current_provider();
        let targets = request.targets();
        debug!(
            "Cache miss, calling {}: {} -> {:?} ({})",
            provider.id(),
            request.source_language,
            targets,
            request.context
        );

        self.metrics.record_provider_call();
        let mut result = match provider.translate(request).await {
            Ok(result) => result,
            Err(e) => {
                if matches!(e, TranslationError::ResponseParseError { .. }) {
                    error!("Provider reply could not be decoded: {}", e);
                    self.metrics.record_parse_failure();
                } else {
                    warn!("Translation failed: {}", e);
                    self.metrics.record_provider_failure();
                }
                return Err(e);
            }
        };

        result.translations.retain(|lang, _| targets.contains(lang));
        result.cached = false;

        let missing = result.missing_languages(request);
        if !missing.is_empty() {
            warn!(
                "{} returned no translation for {:?}",
                result.provider, missing
            );
        }

        self.check_quality(request, &result);

        if let Some(cost) = result.cost {
            self.metrics.record_cost(cost);
        }

        if let Some(cache) = &self.cache {
            cache.put(key, result.clone());
        }

        Ok(result)
    }

    /// Log what the validator finds. Never rejects a result.
    fn check_quality(&self, request: &TranslationRequest, result: &TranslationResult) {
        for (lang, text) in &result.translations {
            let report = TranslationValidator::validate(request, text);
            for problem in &report.errors {
                warn!("Translation to {} has an error: {}", lang, problem);
            }
            for warning in &report.warnings {
                debug!("Translation to {}: {}", lang, warning);
            }
        }
    }

    /// Translate every request in order, one at a time.
    ///
    /// Each item goes through `translate`, so cache writes from item `i` are
    /// visible to item `i + 1`.
    pub async fn translate_batch(&self, batch: &BatchRequest) -> Result<BatchResult> {
        let started = self.clock.now();
        let mut results = Vec::with_capacity(batch.requests.len());
        let mut failures = Vec::new();

        for (index, request) in batch.requests.iter().enumerate() {
            match self.translate(request).await {
                Ok(result) => results.push(result),
                Err(error) => self.handle_batch_error(batch.on_error, index, error, &mut failures)?,
            }
        }

        Ok(self.finish_batch(results, failures, started))
    }

    /// Translate up to `max_in_flight` requests at once.
    ///
    /// Results keep input order and costs are summed the same way as in
    /// `translate_batch`. Cache writes of one item are not guaranteed to be
    /// visible to the items running beside it. Under `Abort` the first
    /// failure in input order is returned once the running items finish.
    pub async fn translate_batch_concurrent(
        &self,
        batch: &BatchRequest,
        max_in_flight: usize,
    ) -> Result<BatchResult> {
        let started = self.clock.now();

        let outcomes: Vec<Result<TranslationResult>> = stream::iter(batch.requests.iter())
            .map(|request| self.translate(request))
            .buffered(max_in_flight.max(1))
            .collect()
            .await;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(result) => results.push(result),
                Err(error) => self.handle_batch_error(batch.on_error, index, error, &mut failures)?,
            }
        }

        Ok(self.finish_batch(results, failures, started))
    }

    fn handle_batch_error(
        &self,
        policy: BatchErrorPolicy,
        index: usize,
        error: TranslationError,
        failures: &mut Vec<BatchFailure>,
    ) -> Result<()> {
        match policy {
            BatchErrorPolicy::Abort => {
                warn!("Batch aborted at item {}: {}", index, error);
                Err(error)
            }
            BatchErrorPolicy::Continue => {
                warn!("Batch item {} failed, continuing: {}", index, error);
                failures.push(BatchFailure { index, error });
                Ok(())
            }
        }
    }

    fn finish_batch(
        &self,
        results: Vec<TranslationResult>,
        failures: Vec<BatchFailure>,
        started: DateTime<Utc>,
    ) -> BatchResult {
        let elapsed = (self.clock.now() - started)
            .to_std()
            .unwrap_or(Duration::ZERO);
        let batch = BatchResult::new(results, elapsed).with_failures(failures);

        info!(
            "Batch translated {} item(s), {} failed, cost ${:.6} in {:?}",
            batch.results.len(),
            batch.failures.len(),
            batch.total_cost,
            batch.processing_time
        );
        batch
    }

    /// Fill in the languages `text` is missing out of `targets`.
    ///
    /// Translates from English when it has content, otherwise from the first
    /// non-blank entry in registry order. Existing non-blank entries are
    /// never replaced. When nothing is missing the input is returned as is
    /// and no provider call is made.
    pub async fn translate_multi_lang(
        &self,
        text: &MultiLangText,
        targets: &[Language],
        context: TranslationContext,
    ) -> Result<MultiLangText> {
        let source = text.source_language().ok_or(TranslationError::NoSourceText)?;

        let missing = text.missing(targets);
        if missing.is_empty() {
            debug!("All {} target language(s) already present", targets.len());
            return Ok(text.clone());
        }

        let source_text = text.get(source).ok_or(TranslationError::NoSourceText)?;
        let request =
            TranslationRequest::new(source_text, source, missing.iter().copied()).with_context(context);

        let result = self.translate(&request).await?;

        let mut filled = text.clone();
        let added = filled.merge_missing(result.translations.iter(), &missing);
        debug!(
            "Filled {}/{} missing language(s) from {}",
            added,
            missing.len(),
            source
        );

        Ok(filled)
    }

    /// Cost estimate from the active provider. Makes no call.
    pub fn estimate_cost(&self, request: &TranslationRequest) -> f64 {
        self.current_provider().estimate_cost(request)
    }

    pub async fn is_available(&self) -> bool {
        self.current_provider().is_available().await
    }

    /// Build the adapter for `provider_id` and make it the active provider.
    ///
    /// On error the current provider stays active.
    pub fn switch_provider(&self, provider_id: ProviderId, credential: &str) -> Result<()> {
        let provider = build_provider(provider_id, Some(credential), &self.settings)?;
        info!("Switching translation provider to {}", provider_id);
        self.set_provider(provider);
        Ok(())
    }

    /// Make `provider` the active provider. Cached results stay valid.
    pub fn set_provider(&self, provider: Arc<dyn TranslationProvider>) {
        let mut active = self.provider.write().unwrap_or_else(PoisonError::into_inner);
        debug!("Active provider: {} -> {}", active.id(), provider.id());
        *active = provider;
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
            info!("Translation cache cleared");
        }
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }
}
