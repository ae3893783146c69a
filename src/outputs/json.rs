//! JSON output of the [`Report`] consumed by the static front end.
//!
//! The document is written to `<path>.tmp` first and then renamed over
//! `path`, so readers never observe a half-written report.

use crate::error::OutputError;
use crate::models::Report;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `report` as pretty JSON and atomically replace `path`.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization, the temporary write, or the
/// rename fails. The temporary file is removed on a failed rename.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(report: &Report, path: &Path) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(report)?;
    let tmp = tmp_path(path);

    fs::write(&tmp, json).await.map_err(|source| OutputError::Io {
        path: tmp.display().to_string(),
        source,
    })?;

    if let Err(source) = fs::rename(&tmp, path).await {
        error!(tmp = %tmp.display(), error = %source, "Failed to move report into place");
        let _ = fs::remove_file(&tmp).await;
        return Err(OutputError::Io {
            path: path.display().to_string(),
            source,
        });
    }

    info!(articles = report.articles.len(), "Wrote report");
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
