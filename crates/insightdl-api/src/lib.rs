pub mod client;
pub mod documents;
pub mod error;
pub mod lookup;
mod retry;
pub mod types;

pub use client::{ClientConfig, InsightClient};
pub use documents::DocumentPager;
pub use error::ApiError;
pub use lookup::MatchSet;
pub use types::{
    Company, CompanyRelation, Document, GraphqlRequest, Insight, NamedId, QueryOutcome, Topic,
    TopicRelation,
};
