//! Fast/cheap tier: OpenAI Chat Completions.

use crate::error::Result;
use crate::i18n::Language;
use crate::pricing::{Pricing, TokenUsage};
use crate::prompt;
use crate::provider::{
    parse_error, status_error, transport_error, ProviderId, ProviderSettings, TranslationProvider,
};
use crate::types::{BatchResult, TranslationRequest, TranslationResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, warn};

const PROVIDER_NAME: &str = "openai";

/// Most items sent in one multi-item call
const BATCH_SIZE: usize = 50;

/// OpenAI Chat Completion request for translation
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

/// Output budget: twice the heuristic output size, within sane bounds
fn max_completion_tokens(request: &TranslationRequest) -> u32 {
    let estimated = TokenUsage::estimate(request).output_tokens;
    (estimated.saturating_mul(2).saturating_add(256)).clamp(1024, 4000) as u32
}

/// Same rule for a multi-item call, with a higher ceiling
fn batch_max_completion_tokens(group: &[TranslationRequest]) -> u32 {
    let estimated: u64 = group
        .iter()
        .map(|request| TokenUsage::estimate(request).output_tokens)
        .sum();
    (estimated.saturating_mul(2).saturating_add(256)).clamp(1024, 16000) as u32
}

/// Split `requests` into runs that can share one call: consecutive, with
/// the same instructions, at most `BATCH_SIZE` long.
fn group_requests(requests: &[TranslationRequest]) -> Vec<&[TranslationRequest]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for end in 1..=requests.len() {
        let split = end == requests.len()
            || end - start == BATCH_SIZE
            || !prompt::same_instructions(&requests[start], &requests[end]);
        if split {
            groups.push(&requests[start..end]);
            start = end;
        }
    }
    groups
}

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    pricing: Pricing,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, settings: &ProviderSettings) -> Result<Self> {
        let id = ProviderId::FastCheap;
        Ok(Self {
            client: settings.http_client()?,
            api_key: api_key.to_string(),
            model: settings.model_for(id),
            base_url: settings.base_url_for(id),
            pricing: settings.pricing_for(id),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: &TranslationRequest) -> ChatRequest {
        self.chat_request(
            prompt::build_system_prompt(request),
            prompt::build_user_prompt(request),
            max_completion_tokens(request),
        )
    }

    fn build_batch_request(&self, group: &[TranslationRequest]) -> ChatRequest {
        self.chat_request(
            prompt::build_batch_system_prompt(&group[0]),
            prompt::build_batch_user_prompt(group),
            batch_max_completion_tokens(group),
        )
    }

    fn chat_request(&self, system: String, user: String, output_budget: u32) -> ChatRequest {
        // Reasoning models need higher token limits and don't support temperature
        let is_reasoning = is_reasoning_model(&self.model);

        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            max_completion_tokens: if is_reasoning { 16000 } else { output_budget },
            temperature: if is_reasoning { None } else { Some(0.3) },
            reasoning_effort: if is_reasoning {
                Some("low".to_string())
            } else {
                None
            },
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }

    /// POST one chat completion; returns the reply text and reported usage.
    async fn complete(&self, chat_request: &ChatRequest) -> Result<(String, Option<TokenUsage>)> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(chat_request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER_NAME, response).await);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| parse_error(PROVIDER_NAME, format!("invalid response body: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| parse_error(PROVIDER_NAME, "response contained no choices"))?;

        let usage = chat_response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));
        Ok((content, usage))
    }

    fn build_result(
        &self,
        request: &TranslationRequest,
        translations: BTreeMap<Language, String>,
        cost: f64,
    ) -> TranslationResult {
        TranslationResult {
            original: request.text.clone(),
            source_language: request.source_language,
            translations,
            provider: PROVIDER_NAME.to_string(),
            cached: false,
            cost: Some(cost),
        }
    }

    /// Translate a group sharing the same instructions in one call.
    ///
    /// The call's cost is split across items by their estimated share.
    /// Items the model left out are sent again on their own.
    async fn translate_group(
        &self,
        group: &[TranslationRequest],
    ) -> Result<Vec<TranslationResult>> {
        debug!(
            "Sending {} items to OpenAI ({}) in one call: {} -> {:?}",
            group.len(),
            self.model,
            group[0].source_language,
            group[0].targets()
        );

        let (content, usage) = self.complete(&self.build_batch_request(group)).await?;
        let outcomes = prompt::parse_batch_translations(PROVIDER_NAME, &content, group)?;

        let estimates: Vec<f64> = group.iter().map(|r| self.pricing.estimate(r)).collect();
        let estimated_total: f64 = estimates.iter().sum();
        let call_cost = match usage {
            Some(usage) => self.pricing.cost(usage),
            None => estimated_total,
        };

        let mut results = Vec::with_capacity(group.len());
        for ((request, outcome), estimate) in group.iter().zip(outcomes).zip(estimates) {
            match outcome {
                Ok(translations) => {
                    let share = if estimated_total > 0.0 {
                        call_cost * estimate / estimated_total
                    } else {
                        call_cost / group.len() as f64
                    };
                    results.push(self.build_result(request, translations, share));
                }
                Err(e) => {
                    warn!(
                        "Multi-item reply unusable for '{}', sending it alone: {}",
                        request.text, e
                    );
                    results.push(self.translate(request).await?);
                }
            }
        }
        Ok(results)
    }
}

#[async_trait]
impl TranslationProvider for OpenAiProvider {
    fn id(&self) -> &str {
        PROVIDER_NAME
    }

    fn pricing(&self) -> Pricing {
        self.pricing
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        debug!(
            "Sending translation request to OpenAI ({}): {} -> {:?}",
            self.model,
            request.source_language,
            request.targets()
        );

        let (content, usage) = self.complete(&self.build_request(request)).await?;
        let translations = prompt::parse_translations(PROVIDER_NAME, &content, request)?;
        let cost = self.pricing.cost_or_estimate(usage, request);

        Ok(self.build_result(request, translations, cost))
    }

    /// Consecutive requests with the same instructions go out together, up
    /// to `BATCH_SIZE` per call, keyed by item number.
    async fn translate_batch(&self, requests: &[TranslationRequest]) -> Result<BatchResult> {
        let started = Instant::now();
        let mut results = Vec::with_capacity(requests.len());

        for group in group_requests(requests) {
            if group.len() == 1 {
                results.push(self.translate(&group[0]).await?);
            } else {
                results.extend(self.translate_group(group).await?);
            }
        }

        Ok(BatchResult::new(results, started.elapsed()))
    }

    async fn is_available(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!("OpenAI availability probe returned {}", response.status());
                false
            }
            Err(e) => {
                debug!("OpenAI availability probe failed: {}", e);
                false
            }
        }
    }
}
