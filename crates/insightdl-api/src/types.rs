//! Wire types for the insight GraphQL API.
//!
//! Responses are validated at the client boundary: the raw body is split into
//! its `errors` and `data` members and turned into a [`QueryOutcome`] before
//! any query-specific type is deserialized.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Request / response envelope
// ---------------------------------------------------------------------------

/// One GraphQL request body: `{"query": ..., "variables": ...}`.
///
/// Built fresh for every call; paging moves forward by building a new request
/// with a new `after` cursor rather than mutating a shared variables map.
#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

impl<'a, V: Serialize> GraphqlRequest<'a, V> {
    pub fn new(query: &'a str, variables: V) -> Self {
        Self { query, variables }
    }
}

/// Variables for queries that take none. Serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoVariables {}

/// The result of one successful HTTP round trip.
#[derive(Debug)]
pub enum QueryOutcome<T> {
    /// The response carried `data` and no `errors`.
    Data(T),
    /// The response carried an `errors` list. `data` is never read in this case.
    Errors {
        messages: Vec<String>,
        raw: serde_json::Value,
    },
    /// Neither `errors` nor `data` were present (or `data` was null).
    NoData,
}

impl<T> QueryOutcome<T> {
    /// Converts the outcome into the query data, turning GraphQL errors into
    /// [`ApiError::Graphql`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Graphql`] when the response carried `errors`.
    pub fn into_data(self) -> Result<Option<T>, ApiError> {
        match self {
            QueryOutcome::Data(data) => Ok(Some(data)),
            QueryOutcome::NoData => Ok(None),
            QueryOutcome::Errors { messages, raw } => Err(ApiError::Graphql {
                messages,
                raw: raw.to_string(),
            }),
        }
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

/// Parses a response body into a [`QueryOutcome`].
///
/// `errors` is inspected first; `data` is only deserialized into `T` when no
/// errors were reported.
pub(crate) fn parse_outcome<T: DeserializeOwned>(
    body: &str,
    context: &str,
) -> Result<QueryOutcome<T>, ApiError> {
    let envelope: RawEnvelope =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialize {
            context: context.to_owned(),
            source: e,
        })?;

    if let Some(raw) = envelope.errors.filter(|e| !e.is_null()) {
        let messages = match &raw {
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.get("message")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or("unknown error")
                        .to_owned()
                })
                .collect(),
            other => vec![other.to_string()],
        };
        return Ok(QueryOutcome::Errors { messages, raw });
    }

    match envelope.data {
        None | Some(serde_json::Value::Null) => Ok(QueryOutcome::NoData),
        Some(data) => serde_json::from_value(data)
            .map(QueryOutcome::Data)
            .map_err(|e| ApiError::Deserialize {
                context: context.to_owned(),
                source: e,
            }),
    }
}

// ---------------------------------------------------------------------------
// Relay-style pagination
// ---------------------------------------------------------------------------

/// `pageInfo { endCursor hasNextPage }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

/// A paginated list: `{ edges { node } pageInfo { ... } }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Connection<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|edge| edge.node).collect()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// A document matched by an insight.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub harvest_time: Option<String>,
    pub sentiment: Option<f64>,
    pub reach: Option<f64>,
    pub publisher: Option<String>,
    pub domain: Option<String>,
    pub source: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub companies: Vec<CompanyRelation>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub topics: Vec<TopicRelation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Company {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompanyRelation {
    pub company: Company,
    pub significance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Topic {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopicRelation {
    pub topic: Topic,
    pub significance: Option<f64>,
}

// ---------------------------------------------------------------------------
// Insight
// ---------------------------------------------------------------------------

/// A saved-search definition sent as the `insight` query variable.
///
/// Language filters are lower-cased; media and sentiment filters are
/// upper-cased, matching the API's enum conventions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub focus_id: String,
    pub taxonomy_id: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub language_filters: Vec<String>,
    pub media_filters: Vec<String>,
    pub sentiment_filters: Vec<String>,
}

impl Insight {
    pub fn new(
        focus_id: impl Into<String>,
        taxonomy_id: impl Into<String>,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Self {
        Self {
            focus_id: focus_id.into(),
            taxonomy_id: taxonomy_id.into(),
            from_date,
            to_date,
            language_filters: Vec::new(),
            media_filters: Vec::new(),
            sentiment_filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.language_filters = languages
            .into_iter()
            .map(|l| l.as_ref().to_lowercase())
            .collect();
        self
    }

    #[must_use]
    pub fn with_media<I, S>(mut self, media: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.media_filters = media
            .into_iter()
            .map(|m| m.as_ref().to_uppercase())
            .collect();
        self
    }

    #[must_use]
    pub fn with_sentiments<I, S>(mut self, sentiments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sentiment_filters = sentiments
            .into_iter()
            .map(|s| s.as_ref().to_uppercase())
            .collect();
        self
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// `{ id name }`, as returned by the company and taxonomy listings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedId {
    pub id: String,
    pub name: String,
}
