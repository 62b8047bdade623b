//! Drives a document pager into the CSV tables, one page at a time.

use std::io::Write;

use futures::TryStreamExt;
use insightdl_api::{Insight, InsightClient};

use crate::error::ExportError;
use crate::tables::{BatchRows, DocumentTables};

/// Totals for one completed export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub pages: usize,
    pub documents: usize,
    pub rows: BatchRows,
}

/// Fetches every page of documents for `insight` and writes each page to
/// `tables` before the next page is requested.
///
/// Rows are only written for company relations matching `insight.focus_id`.
/// On failure, pages already written stay on disk.
///
/// # Errors
///
/// - [`ExportError::Fetch`] if a page cannot be retrieved.
/// - [`ExportError::Csv`] if writing a page fails.
pub async fn export_documents<W: Write>(
    client: &InsightClient,
    insight: Insight,
    tables: &mut DocumentTables<W>,
) -> Result<ExportSummary, ExportError> {
    let focus_id = insight.focus_id.clone();
    let mut pages = std::pin::pin!(client.documents(insight).into_stream());
    let mut summary = ExportSummary::default();

    while let Some(batch) = pages.try_next().await? {
        let rows = tables.write_batch(&batch, &focus_id)?;
        summary.pages += 1;
        summary.documents += batch.len();
        summary.rows += rows;
        tracing::info!(
            page = summary.pages,
            documents = batch.len(),
            total_documents = summary.documents,
            company_rows = rows.companies,
            topic_rows = rows.topics,
            "wrote document page"
        );
    }

    tracing::info!(
        pages = summary.pages,
        documents = summary.documents,
        "export complete"
    );
    Ok(summary)
}
