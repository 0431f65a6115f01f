//! Token-based cost model shared by all providers.
//!
//! Prices are USD per million tokens. Reported usage wins over the
//! character heuristic whenever the backend returns it.

use crate::types::TranslationRequest;

/// Rough characters-per-token ratio for mixed-script menu text
const CHARS_PER_TOKEN: usize = 4;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Public list price of a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

/// Token counts for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Heuristic usage for a request: the text's tokens as input, and one
    /// copy of them per target language as output.
    pub fn estimate(request: &TranslationRequest) -> Self {
        let input_tokens = estimate_tokens(&request.text);
        let targets = request.targets().len().max(1) as u64;
        Self {
            input_tokens,
            output_tokens: input_tokens * targets,
        }
    }
}

impl Pricing {
    pub const fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    pub fn cost(&self, usage: TokenUsage) -> f64 {
        (usage.input_tokens as f64 / TOKENS_PER_MILLION) * self.input_per_million
            + (usage.output_tokens as f64 / TOKENS_PER_MILLION) * self.output_per_million
    }

    /// Call-free estimate for a request.
    pub fn estimate(&self, request: &TranslationRequest) -> f64 {
        self.cost(TokenUsage::estimate(request))
    }

    /// Actual cost when the backend reported usage, heuristic otherwise.
    pub fn cost_or_estimate(&self, usage: Option<TokenUsage>, request: &TranslationRequest) -> f64 {
        match usage {
            Some(usage) => self.cost(usage),
            None => self.estimate(request),
        }
    }
}

/// List prices for models the adapters are commonly pointed at.
///
/// Returns `None` for unknown models; callers then fall back to the tier's
/// default price.
pub fn known_model_pricing(model: &str) -> Option<Pricing> {
    let pricing = match model {
        m if m.starts_with("gpt-4o-mini") => Pricing::new(0.15, 0.60),
        m if m.starts_with("gpt-4o") => Pricing::new(2.50, 10.00),
        m if m.starts_with("gpt-4.1-mini") => Pricing::new(0.40, 1.60),
        m if m.starts_with("gpt-4.1") => Pricing::new(2.00, 8.00),
        m if m.starts_with("claude-haiku-4") => Pricing::new(1.00, 5.00),
        m if m.starts_with("claude-3-5-haiku") => Pricing::new(0.80, 4.00),
        m if m.starts_with("claude-sonnet-4") => Pricing::new(3.00, 15.00),
        m if m.starts_with("claude-opus-4") => Pricing::new(15.00, 75.00),
        _ => return None,
    };
    Some(pricing)
}

/// Approximate token count: characters / 4, rounded up.
pub fn estimate_tokens(text: &str) -> u64 {
    text.chars().count().div_ceil(CHARS_PER_TOKEN) as u64
}
