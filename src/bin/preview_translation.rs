//! Preview translation binary - translates one text and prints the result
//!
//! Usage:
//!   cargo run -- "Espresso with oat milk"
//!   cargo run -- --to vi,ko,ja --context menu_item "Espresso with oat milk"
//!   cargo run -- --from it --to en,ko "Cornetto alla crema"
//!   cargo run -- --estimate "Espresso with oat milk"   # print cost estimate only
//!
//! Required environment variables:
//! - OPENAI_API_KEY (or ANTHROPIC_API_KEY with TRANSLATION_PROVIDER=premium)
//!
//! Optional:
//! - TRANSLATION_PROVIDER (defaults to fast-cheap)
//! - TRANSLATION_MODEL, TRANSLATION_API_URL, TRANSLATION_TIMEOUT_SECS

use anyhow::{bail, Context, Result};
use menu_translator::{
    Language, TranslationContext, TranslationEngine, TranslationRequest,
};
use tracing::info;

struct PreviewArgs {
    text: String,
    source: Language,
    targets: Vec<Language>,
    context: TranslationContext,
    estimate_only: bool,
}

impl PreviewArgs {
    fn parse() -> Result<Self> {
        let mut args = std::env::args().skip(1);
        let mut text_parts = Vec::new();
        let mut source = Language::ENGLISH;
        let mut targets = vec![Language::VIETNAMESE, Language::KOREAN];
        let mut context = TranslationContext::MenuItem;
        let mut estimate_only = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--from" => {
                    let code = args.next().context("--from needs a language code")?;
                    source = code.parse()?;
                }
                "--to" => {
                    let codes = args.next().context("--to needs language codes")?;
                    targets = codes
                        .split(',')
                        .filter(|c| !c.trim().is_empty())
                        .map(str::parse)
                        .collect::<Result<Vec<Language>, _>>()?;
                }
                "--context" => {
                    let name = args.next().context("--context needs a value")?;
                    context = name.parse()?;
                }
                "--estimate" => estimate_only = true,
                _ => text_parts.push(arg),
            }
        }

        if text_parts.is_empty() {
            bail!("Usage: preview-translation [--from en] [--to vi,ko] [--context menu_item] [--estimate] <text>");
        }

        Ok(Self {
            text: text_parts.join(" "),
            source,
            targets,
            context,
            estimate_only,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("menu_translator=info".parse()?),
        )
        .init();

    let args = PreviewArgs::parse()?;

    info!("Loading configuration...");
    let engine = TranslationEngine::from_env().context("Failed to build translation engine")?;

    let request = TranslationRequest::new(args.text, args.source, args.targets)
        .with_context(args.context);

    let estimate = engine.estimate_cost(&request);
    if args.estimate_only {
        println!("Estimated cost with {}: ${:.6}", engine.provider_id(), estimate);
        return Ok(());
    }

    info!(
        "Translating with {} (estimated ${:.6})",
        engine.provider_id(),
        estimate
    );
    let result = engine
        .translate(&request)
        .await
        .context("Translation failed")?;

    println!("\n{}", "=".repeat(60));
    println!("{} ({})", result.original, result.source_language);
    println!("{}", "=".repeat(60));
    for target in request.targets() {
        match result.get(target) {
            Some(text) => println!("{} {:<4} {}", target.config().flag, target, text),
            None => println!("{} {:<4} <missing>", target.config().flag, target),
        }
    }
    println!("{}", "=".repeat(60));

    match result.cost {
        Some(cost) => println!("Provider: {}  Cost: ${:.6}", result.provider, cost),
        None => println!("Provider: {}  Cost: unknown", result.provider),
    }

    Ok(())
}
