//! Prompt construction and reply decoding shared by every LLM provider.

use crate::error::{Result, TranslationError};
use crate::i18n::Language;
use crate::types::{TranslationContext, TranslationRequest};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Fixed register/phrasing instruction for each context tag
pub fn context_instruction(context: TranslationContext) -> &'static str {
    match context {
        TranslationContext::MenuItem => {
            "This is a menu item name. Keep it short and appetizing. Keep dish names that are \
             known internationally (e.g. Espresso, Tiramisu, Phở) as-is or transliterated."
        }
        TranslationContext::Description => {
            "This is a menu or product description. Preserve its sensory appeal: taste, texture \
             and aroma words should sound natural and inviting to a local reader."
        }
        TranslationContext::ServiceText => {
            "This is guest-facing service text from a restaurant or hotel. Use a warm, polite \
             and welcoming register."
        }
        TranslationContext::Instruction => {
            "These are instructions. Be precise and unambiguous, use the imperative mood and \
             keep every step in its original order."
        }
        TranslationContext::LegalText => {
            "This is legal text (terms, allergen disclaimers, policies). Translate faithfully \
             and formally. Do not soften, summarize or omit anything."
        }
        TranslationContext::UiLabel => {
            "This is a UI label or button. Keep it short and clear; prefer the wording local \
             apps commonly use for the same action."
        }
        TranslationContext::Ingredient => {
            "This is a food ingredient. Use the most common local culinary name for it \
             (e.g. coriander vs cilantro depending on region)."
        }
        TranslationContext::General => {
            "Translate naturally for customers of a hospitality business."
        }
    }
}

/// Build the system prompt for a translation request
pub fn build_system_prompt(request: &TranslationRequest) -> String {
    let source = request.source_language;
    let mut prompt = format!(
        r#"You are a professional translator for restaurants, cafés and hotels. Translate the text from {} ({}) into each requested language.

## Context
{}

## Rules
- Translate ONLY the text provided, add nothing
- Keep brand names and proper nouns as-is
- Use terminology natural to each locale's hospitality industry
"#,
        source.name(),
        source.code(),
        context_instruction(request.context)
    );

    if request.preserve_formatting {
        prompt.push_str(
            "- Preserve all markup (HTML tags, markdown), line breaks and placeholders such as \
             {price} exactly as they appear in the source\n",
        );
    } else {
        prompt.push_str("- Return plain text; keep placeholders such as {price} unchanged\n");
    }

    if !request.glossary.is_empty() {
        prompt.push_str("\n## Glossary\nThe following terms MUST be translated exactly as given:\n");
        for (term, forced) in &request.glossary {
            prompt.push_str(&format!("- \"{}\" -> \"{}\"\n", term, forced));
        }
    }

    prompt.push_str(
        r#"
## Output
Return ONLY a JSON object whose keys are the target language codes and whose values are the translated text, for example {"vi": "...", "ko": "..."}. No markdown, no explanations."#,
    );

    prompt
}

/// Build the user prompt carrying the text and target list
pub fn build_user_prompt(request: &TranslationRequest) -> String {
    let targets = request
        .targets()
        .iter()
        .map(|lang| format!("{} ({})", lang.code(), lang.name()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Translate the following text into: {}\n\nText:\n{}",
        targets, request.text
    )
}

/// Drop wrappers models like to add around JSON (markdown code fences and
/// leading prose) and decode the first JSON value in what remains. Trailing
/// text after that value is ignored.
fn decode_first_value(provider: &str, content: &str) -> Result<Value> {
    let mut body = content.trim();

    if let Some(rest) = body.strip_prefix("```") {
        // Drop the info string ("json") when the fence has its own line
        body = rest.split_once('\n').map(|(_, after)| after).unwrap_or(rest);
        body = body.trim_end();
        body = body.strip_suffix("```").unwrap_or(body);
    }

    let start = body
        .find('{')
        .ok_or_else(|| parse_error(provider, "reply contains no JSON object"))?;

    serde_json::Deserializer::from_str(&body[start..])
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| parse_error(provider, "reply contains no JSON object"))?
        .map_err(|e| parse_error(provider, format!("invalid JSON: {}", e)))
}

/// The reply as a JSON object, unwrapping a `{"translations": {...}}` envelope.
fn decode_object(provider: &str, content: &str) -> Result<Map<String, Value>> {
    let Value::Object(mut object) = decode_first_value(provider, content)? else {
        return Err(parse_error(provider, "reply is not a JSON object"));
    };

    if let Some(Value::Object(inner)) = object.remove("translations") {
        object = inner;
    }
    Ok(object)
}

fn parse_error(provider: &str, message: impl Into<String>) -> TranslationError {
    TranslationError::ResponseParseError {
        provider: provider.to_string(),
        message: message.into(),
    }
}

/// Keep the usable entries of a `{code: text}` object: requested targets
/// with non-blank text. Fails when none are left.
fn collect_requested(
    provider: &str,
    object: Map<String, Value>,
    request: &TranslationRequest,
) -> Result<BTreeMap<Language, String>> {
    let targets = request.targets();
    let mut translations = BTreeMap::new();

    for (code, value) in object {
        let Ok(language) = Language::from_code(&code) else {
            debug!("{}: ignoring unknown language key '{}'", provider, code);
            continue;
        };
        if !targets.contains(&language) {
            debug!("{}: ignoring unrequested language '{}'", provider, code);
            continue;
        }
        match value {
            Value::String(text) if !text.trim().is_empty() => {
                translations.insert(language, text.trim().to_string());
            }
            other => debug!("{}: no usable text for '{}': {}", provider, code, other),
        }
    }

    if translations.is_empty() {
        return Err(parse_error(
            provider,
            "reply contains none of the requested languages",
        ));
    }

    Ok(translations)
}

/// Decode a model reply into per-language strings.
///
/// Accepts `{"vi": "...", "ko": "..."}`, optionally wrapped as
/// `{"translations": {...}}`. Keys that are not requested targets, unknown
/// codes and blank values are dropped. A reply that yields none of the
/// requested languages is a parse error, not an empty success.
pub fn parse_translations(
    provider: &str,
    content: &str,
    request: &TranslationRequest,
) -> Result<BTreeMap<Language, String>> {
    let object = decode_object(provider, content)?;
    collect_requested(provider, object, request)
}

// ==================== Multi-item prompts ====================

/// Whether two requests can share one multi-item call: everything but the
/// text must match.
pub fn same_instructions(a: &TranslationRequest, b: &TranslationRequest) -> bool {
    a.source_language == b.source_language
        && a.targets() == b.targets()
        && a.context == b.context
        && a.preserve_formatting == b.preserve_formatting
        && a.glossary == b.glossary
}

/// System prompt for a group of requests sharing `same_instructions`.
/// Replies are keyed by 1-based item number.
pub fn build_batch_system_prompt(first: &TranslationRequest) -> String {
    let single = build_system_prompt(first);
    let rules = single
        .split_once("\n## Output")
        .map(|(rules, _)| rules)
        .unwrap_or(&single);

    format!(
        r#"{}
## Output
You will receive several numbered items. Return ONLY a JSON object keyed by item number. Each value is an object whose keys are the target language codes and whose values are the translated text, for example {{"1": {{"vi": "...", "ko": "..."}}, "2": {{"vi": "...", "ko": "..."}}}}. Include every item. No markdown, no explanations."#,
        rules
    )
}

/// User prompt listing every item, numbered from 1, as a JSON string.
pub fn build_batch_user_prompt(requests: &[TranslationRequest]) -> String {
    let targets = requests
        .first()
        .map(|first| {
            first
                .targets()
                .iter()
                .map(|lang| format!("{} ({})", lang.code(), lang.name()))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    let items = requests
        .iter()
        .enumerate()
        .map(|(i, request)| format!("{}. {}", i + 1, Value::String(request.text.clone())))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Translate the following {} items into: {}\n\nItems:\n{}",
        requests.len(),
        targets,
        items
    )
}

/// Decode a multi-item reply into one outcome per request, in input order.
///
/// The whole call fails only when the reply is not a JSON object. An item
/// the model left out, or one with no usable text, fails on its own.
pub fn parse_batch_translations(
    provider: &str,
    content: &str,
    requests: &[TranslationRequest],
) -> Result<Vec<Result<BTreeMap<Language, String>>>> {
    let mut object = decode_object(provider, content)?;

    let outcomes: Vec<_> = requests
        .iter()
        .enumerate()
        .map(|(i, request)| match object.remove(&(i + 1).to_string()) {
            Some(Value::Object(entry)) => collect_requested(provider, entry, request),
            Some(other) => Err(parse_error(
                provider,
                format!("item {} is not an object: {}", i + 1, other),
            )),
            None => Err(parse_error(provider, format!("reply has no item {}", i + 1))),
        })
        .collect();

    Ok(outcomes)
}
