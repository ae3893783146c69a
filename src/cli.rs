//! Command-line interface definitions for AI News Daily.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option is optional and most can also be set via environment variables.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the AI News Daily aggregator.
///
/// # Examples
///
/// ```sh
/// # Live run, writing ./data.json
/// ai_news_daily
///
/// # Offline fixtures into a custom path
/// ai_news_daily --offline -o site/data.json
///
/// # Custom categories and translated titles
/// ai_news_daily --config news.yaml --translate-to zh-CN
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a categories/sources YAML file (replaces the built-in one)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path of the JSON report to write
    #[arg(short, long, env = "NEWS_OUTPUT", default_value = "data.json")]
    pub output: PathBuf,

    /// Serve built-in sample data instead of querying any source
    #[arg(long, env = "NEWS_OFFLINE")]
    pub offline: bool,

    /// Translate titles into this language code (e.g. `zh-CN`)
    #[arg(long, env = "NEWS_TRANSLATE_TO")]
    pub translate_to: Option<String>,

    /// API key for `search` sources
    #[arg(long, env = "SEARCH_API_KEY", hide_env_values = true)]
    pub search_api_key: Option<String>,
}
