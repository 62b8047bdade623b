//! `download`: export an insight's documents to CSV.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use insightdl_api::{Insight, InsightClient};
use insightdl_export::{export_documents, DocumentTables, OutputMode};

#[derive(Debug, Args)]
pub(crate) struct DownloadArgs {
    /// Focus company id
    #[arg(long)]
    pub focus: String,
    /// Taxonomy id
    #[arg(long)]
    pub taxonomy: String,
    /// First day of the date range (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,
    /// Last day of the date range (YYYY-MM-DD)
    #[arg(long)]
    pub to: NaiveDate,
    /// Language filter, repeatable (e.g. en)
    #[arg(long = "language")]
    pub languages: Vec<String>,
    /// Media type filter, repeatable (e.g. NEWS)
    #[arg(long = "media")]
    pub media: Vec<String>,
    /// Sentiment filter, repeatable (e.g. NEGATIVE)
    #[arg(long = "sentiment")]
    pub sentiments: Vec<String>,
    /// Add rows to existing output files
    #[arg(long, conflicts_with = "overwrite")]
    pub append: bool,
    /// Replace existing output files
    #[arg(long)]
    pub overwrite: bool,
    /// Directory the CSV files are written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl DownloadArgs {
    pub(crate) fn output_mode(&self) -> OutputMode {
        if self.append {
            OutputMode::Append
        } else if self.overwrite {
            OutputMode::Overwrite
        } else {
            OutputMode::Create
        }
    }

    /// # Errors
    ///
    /// Returns an error if `--from` is after `--to`.
    pub(crate) fn insight(&self) -> anyhow::Result<Insight> {
        if self.from > self.to {
            anyhow::bail!(
                "--from {} is after --to {}",
                self.from.format("%Y-%m-%d"),
                self.to.format("%Y-%m-%d")
            );
        }
        Ok(
            Insight::new(self.focus.clone(), self.taxonomy.clone(), self.from, self.to)
                .with_languages(&self.languages)
                .with_media(&self.media)
                .with_sentiments(&self.sentiments),
        )
    }
}

/// Runs an export. Output files are opened (and checked for conflicts)
/// before the first request is sent.
///
/// # Errors
///
/// Returns an error on invalid dates, an output conflict, or any fetch or
/// write failure. Pages written before a failure stay on disk.
pub(crate) async fn run_download(client: &InsightClient, args: &DownloadArgs) -> anyhow::Result<()> {
    let insight = args.insight()?;
    let mode = args.output_mode();

    let mut tables = DocumentTables::open(&args.output_dir, mode).with_context(|| {
        format!(
            "failed to prepare output files in {}",
            args.output_dir.display()
        )
    })?;

    tracing::info!(
        focus = %insight.focus_id,
        taxonomy = %insight.taxonomy_id,
        from = %insight.from_date,
        to = %insight.to_date,
        ?mode,
        "starting download"
    );

    let summary = export_documents(client, insight, &mut tables).await?;

    println!(
        "wrote {} documents from {} pages to {}",
        summary.documents,
        summary.pages,
        args.output_dir.display()
    );
    Ok(())
}
