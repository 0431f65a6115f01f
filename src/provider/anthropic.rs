//! Premium tier: Anthropic Messages API.

use crate::error::Result;
use crate::pricing::{Pricing, TokenUsage};
use crate::prompt;
use crate::provider::{
    parse_error, status_error, transport_error, ProviderId, ProviderSettings, TranslationProvider,
};
use crate::types::{TranslationRequest, TranslationResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PROVIDER_NAME: &str = "anthropic";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4000;

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    pricing: Pricing,
}

impl AnthropicProvider {
    pub fn new(api_key: &str, settings: &ProviderSettings) -> Result<Self> {
        let id = ProviderId::Premium;
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

    fn build_request(&self, request: &TranslationRequest) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: prompt::build_system_prompt(request),
            messages: vec![Message {
                role: "user",
                content: prompt::build_user_prompt(request),
            }],
            temperature: 0.3,
        }
    }
}

#[async_trait]
impl TranslationProvider for AnthropicProvider {
    fn id(&self) -> &str {
        PROVIDER_NAME
    }

    fn pricing(&self) -> Pricing {
        self.pricing
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let body = self.build_request(request);

        debug!(
            "Sending translation request to Anthropic ({}): {} -> {:?}",
            self.model,
            request.source_language,
            request.targets()
        );

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER_NAME, response).await);
        }

        let messages_response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| parse_error(PROVIDER_NAME, format!("invalid response body: {}", e)))?;

        let content: String = messages_response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if content.trim().is_empty() {
            return Err(parse_error(PROVIDER_NAME, "response contained no text"));
        }

        let translations = prompt::parse_translations(PROVIDER_NAME, &content, request)?;

        let usage = messages_response
            .usage
            .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens));
        let cost = self.pricing.cost_or_estimate(usage, request);

        Ok(TranslationResult {
            original: request.text.clone(),
            source_language: request.source_language,
            translations,
            provider: PROVIDER_NAME.to_string(),
            cached: false,
            cost: Some(cost),
        })
    }

    async fn is_available(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!("Anthropic availability probe returned {}", response.status());
                false
            }
            Err(e) => {
                debug!("Anthropic availability probe failed: {}", e);
                false
            }
        }
    }
}
