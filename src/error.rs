//! Error types for sources, configuration and output.
//!
//! Source errors are always recovered by the pipeline (the source simply
//! contributes nothing); configuration and output errors end the run.

use thiserror::Error;

/// Failure while fetching or decoding a single source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML decode error: {0}")]
    XmlDecode(#[from] quick_xml::DeError),

    #[error("unrecognized document: {0}")]
    Format(String),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("subprocess error: {0}")]
    Process(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("invalid source descriptor: {0}")]
    Descriptor(String),
}

/// Failure while loading or validating the category configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failure while writing the report file.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}
