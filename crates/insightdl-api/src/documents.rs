//! Lazy, page-at-a-time retrieval of the documents matching an insight.

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::client::InsightClient;
use crate::error::ApiError;
use crate::types::{Connection, Document, GraphqlRequest, Insight, QueryOutcome};

pub const DOCUMENTS_QUERY: &str = r"
    query Documents($insight: InsightQuery!, $first: Int!, $after: Cursor) {
        documents(insight: $insight, first: $first, after: $after, sortAsc: false) {
            edges {
                node {
                    id harvestTime title domain url
                    source publisher reach sentiment author
                    companies { company { id name } significance }
                    topics { topic { id name } significance }
                }
            }
            pageInfo { endCursor hasNextPage }
        }
    }
";

#[derive(Debug, Serialize)]
struct DocumentsVariables<'a> {
    insight: &'a Insight,
    first: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct DocumentsData {
    documents: Connection<Document>,
}

/// Forward-only cursor over the pages of documents matching an insight.
///
/// Each call to [`DocumentPager::next_page`] issues one retried request and
/// yields that page's documents. Paging stops when the API reports
/// `hasNextPage: false` or returns no `data`; an empty page with
/// `hasNextPage: true` is yielded and paging continues. After the pager has
/// finished or failed it yields nothing further.
pub struct DocumentPager<'c> {
    client: &'c InsightClient,
    insight: Insight,
    cursor: Option<String>,
    has_next: bool,
    pages: usize,
    documents: usize,
}

impl InsightClient {
    /// Starts paging through the documents matching `insight`.
    ///
    /// No request is made until the first [`DocumentPager::next_page`].
    #[must_use]
    pub fn documents(&self, insight: Insight) -> DocumentPager<'_> {
        DocumentPager {
            client: self,
            insight,
            cursor: None,
            has_next: true,
            pages: 0,
            documents: 0,
        }
    }
}

impl<'c> DocumentPager<'c> {
    /// Fetches the next page, or `Ok(None)` once paging is complete.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Graphql`] if the response carries an `errors` list.
    /// - Any transport error from [`InsightClient::execute_with_retries`].
    pub async fn next_page(&mut self) -> Result<Option<Vec<Document>>, ApiError> {
        if !self.has_next {
            return Ok(None);
        }

        let result = {
            let variables = DocumentsVariables {
                insight: &self.insight,
                first: self.client.page_size(),
                after: self.cursor.as_deref(),
            };
            let request = GraphqlRequest::new(DOCUMENTS_QUERY, variables);
            self.client
                .execute_with_retries::<_, DocumentsData>(&request)
                .await
                .and_then(QueryOutcome::into_data)
        };

        let data = match result {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(pages = self.pages, "document query returned no data; stopping");
                self.has_next = false;
                return Ok(None);
            }
            Err(err) => {
                self.has_next = false;
                return Err(err);
            }
        };

        let connection = data.documents;
        self.has_next = connection.page_info.has_next_page;
        self.cursor = connection.page_info.end_cursor.clone();
        self.pages += 1;

        let batch = connection.into_nodes();
        self.documents += batch.len();
        tracing::info!(
            page = self.pages,
            documents = batch.len(),
            has_next_page = self.has_next,
            "fetched document page"
        );
        Ok(Some(batch))
    }

    /// Pages fetched so far.
    #[must_use]
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Documents yielded so far across all pages.
    #[must_use]
    pub fn documents_fetched(&self) -> usize {
        self.documents
    }

    /// Converts the pager into a stream of pages. The stream ends after the
    /// last page or after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<Document>, ApiError>> + 'c {
        futures::stream::try_unfold(self, |mut pager| async move {
            Ok(pager.next_page().await?.map(|batch| (batch, pager)))
        })
    }
}
