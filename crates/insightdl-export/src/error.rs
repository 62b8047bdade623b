use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing documents to the CSV output set.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Output files already exist and neither append nor overwrite was requested.
    #[error(
        "Files already exist: {}. Use overwrite to replace existing files or append to add to them.",
        .files.join(", ")
    )]
    OutputConflict { files: Vec<String> },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Fetching a page of documents failed.
    #[error("document fetch failed: {0}")]
    Fetch(#[from] insightdl_api::ApiError),
}
