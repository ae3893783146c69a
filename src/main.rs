//! # AI News Daily
//!
//! An AI-news aggregation pipeline that pulls short items from heterogeneous
//! sources, deduplicates them, sorts each into one topical category, and
//! writes a single JSON document for a static front end to render.
//!
//! ## Features
//!
//! - Fetches RSS/Atom feeds, the Hugging Face model listing, the GitHub
//!   trending page, a keyword search API, and Twitter/X search via `bird`
//! - Deduplicates across sources by canonical URL or post id
//! - Classifies articles with an ordered keyword rule table
//! - Optionally translates titles (`--translate-to`)
//! - Offline mode serving built-in sample data (`--offline`)
//!
//! ## Usage
//!
//! ```sh
//! ai_news_daily -o site/data.json
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Fetching**: Query every configured source, a few at a time
//! 2. **Normalizing**: Coerce raw items into articles, dropping duplicates
//! 3. **Classifying**: Assign each article a category and sort newest first
//! 4. **Output**: Write the JSON report atomically

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod classify;
mod cli;
mod config;
mod dedup;
mod error;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod report;
mod sources;
mod translate;
mod utils;

use cli::Cli;
use config::NewsConfig;
use outputs::json;
use pipeline::Aggregator;
use sources::{HttpFetcher, build_client, offline::OfflineFetcher};
use translate::GoogleTranslate;
use utils::ensure_writable_parent;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ai_news_daily starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.config, ?args.output, offline = args.offline, "Parsed CLI arguments");

    // ---- Load config ----
    let config = NewsConfig::load(args.config.as_deref()).await?;

    // Early check: fail before fetching anything if the report can't be written
    if let Err(e) = ensure_writable_parent(&args.output).await {
        error!(
            path = %args.output.display(),
            error = %e,
            "Output location is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let translator = match &args.translate_to {
        Some(lang) => {
            info!(target_lang = %lang, "Title translation enabled");
            let client = build_client(config.request_timeout_secs, &config.user_agent)?;
            Some(GoogleTranslate::new(client, lang.clone()))
        }
        None => None,
    };

    // ---- Aggregate ----
    let now = Local::now();
    let report = if args.offline {
        info!("Offline mode; serving built-in sample data");
        let fetcher = OfflineFetcher::builtin()?;
        Aggregator::new(&config, &fetcher)
            .with_translator(translator)
            .run(now)
            .await
    } else {
        let fetcher = HttpFetcher::new(&config, args.search_api_key.clone())?;
        Aggregator::new(&config, &fetcher)
            .with_translator(translator)
            .run(now)
            .await
    };

    for category in &report.categories {
        info!(category = %category.key, count = category.count, "Category total");
    }

    // ---- Output ----
    if let Err(e) = json::write_report(&report, &args.output).await {
        error!(error = %e, "Failed to write report");
        return Err(e.into());
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = report.articles.len(),
        "Execution complete"
    );

    Ok(())
}
