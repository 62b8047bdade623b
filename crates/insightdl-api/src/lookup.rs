//! Resolution of company and taxonomy names to API identifiers.
//!
//! Both lookups partition their results into `best` and `all`. A result is a
//! best match when its name equals the searched name under [`names_match`]:
//! both sides are lower-cased with Unicode case mapping (`str::to_lowercase`,
//! independent of the process locale) and compared exactly.

use serde::{Deserialize, Serialize};

use crate::client::InsightClient;
use crate::error::ApiError;
use crate::types::{Connection, GraphqlRequest, NamedId, NoVariables, QueryOutcome};

pub const COMPANIES_QUERY: &str = r"
    query Companies($first: Int!, $after: Cursor, $search: String) {
        companies(first: $first, after: $after, search: $search) {
            edges { node { id name } }
            pageInfo { endCursor hasNextPage }
        }
    }
";

pub const TAXONOMIES_QUERY: &str = r"
    query Taxonomies {
        myOrganisation {
            taxonomies {
                id name
            }
        }
    }
";

#[derive(Debug, Serialize)]
struct CompaniesVariables<'a> {
    first: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<&'a str>,
    search: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompaniesData {
    companies: Connection<NamedId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaxonomiesData {
    my_organisation: Organisation,
}

#[derive(Debug, Deserialize)]
struct Organisation {
    #[serde(default)]
    taxonomies: Vec<NamedId>,
}

/// Results of a name lookup, in API order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    /// Results whose name equals the query case-insensitively.
    pub best: Vec<NamedId>,
    /// Every result the API returned.
    pub all: Vec<NamedId>,
}

impl MatchSet {
    fn push(&mut self, query: &str, item: NamedId) {
        if names_match(&item.name, query) {
            self.best.push(item.clone());
        }
        self.all.push(item);
    }
}

/// Case-insensitive exact name comparison used by the lookups.
#[must_use]
pub fn names_match(candidate: &str, query: &str) -> bool {
    candidate.to_lowercase() == query.to_lowercase()
}

impl InsightClient {
    /// Searches companies by name, following every page of results.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Graphql`] if a response carries an `errors` list.
    /// - Any transport error from [`InsightClient::execute_with_retries`].
    pub async fn search_companies(&self, name: &str) -> Result<MatchSet, ApiError> {
        let mut matches = MatchSet::default();
        let mut cursor: Option<String> = None;
        let mut has_next = true;

        while has_next {
            let variables = CompaniesVariables {
                first: self.page_size(),
                after: cursor.as_deref(),
                search: name,
            };
            let request = GraphqlRequest::new(COMPANIES_QUERY, variables);
            let Some(data) = self
                .execute_with_retries::<_, CompaniesData>(&request)
                .await?
                .into_data()?
            else {
                break;
            };

            let connection = data.companies;
            has_next = connection.page_info.has_next_page;
            cursor.clone_from(&connection.page_info.end_cursor);
            for company in connection.into_nodes() {
                matches.push(name, company);
            }
        }

        tracing::debug!(
            query = name,
            best = matches.best.len(),
            all = matches.all.len(),
            "company search complete"
        );
        Ok(matches)
    }

    /// Lists the caller organisation's taxonomies and matches them by name.
    ///
    /// Issues a single request with no rate-limit retry.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Graphql`] if the response carries an `errors` list.
    /// - Any transport error from [`InsightClient::execute`].
    pub async fn search_taxonomy(&self, name: &str) -> Result<MatchSet, ApiError> {
        let request = GraphqlRequest::new(TAXONOMIES_QUERY, NoVariables::default());
        let outcome: QueryOutcome<TaxonomiesData> = self.execute(&request).await?;

        let mut matches = MatchSet::default();
        if let Some(data) = outcome.into_data()? {
            for taxonomy in data.my_organisation.taxonomies {
                matches.push(name, taxonomy);
            }
        }
        Ok(matches)
    }
}
