pub mod auth;
pub mod client;
mod envelope;
pub mod error;
pub mod query;

pub use auth::{LoginPrompt, TokenProvider};
pub use client::SearchClient;
pub use envelope::ResultPage;
pub use error::SearchError;
pub use query::{NearbyQuery, SearchQuery, SortOrder};
