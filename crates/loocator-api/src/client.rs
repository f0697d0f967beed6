//! HTTP client for the toilet directory REST API.
//!
//! Wraps `reqwest` with base-URL handling, bearer-token injection, status
//! mapping and envelope decoding. Requests are plain futures: dropping one
//! aborts the underlying connection, which is how superseded searches are
//! cancelled upstream.

use std::sync::Arc;
use std::time::Duration;

use loocator_core::{AdministrativeArea, AppConfig, Marker, Toilet};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::{LoginPrompt, TokenProvider};
use crate::envelope::{decode_items, parse_page, ResultPage};
use crate::error::SearchError;
use crate::query::{NearbyQuery, SearchQuery};

pub const MARKERS_PATH: &str = "toilets/map";
pub const TOILETS_PATH: &str = "toilets";
pub const NEARBY_PATH: &str = "toilets/nearby";
pub const AREAS_PATH: &str = "wilayas";

/// Client for the search, nearby and area endpoints.
///
/// Use [`SearchClient::from_config`] in the app or
/// [`SearchClient::with_base_url`] to point at a mock server in tests.
pub struct SearchClient {
    client: Client,
    base_url: Url,
    token_provider: Option<Arc<dyn TokenProvider>>,
    login_prompt: Option<Arc<dyn LoginPrompt>>,
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("base_url", &self.base_url.as_str())
            .field("token_provider", &self.token_provider.is_some())
            .field("login_prompt", &self.login_prompt.is_some())
            .finish_non_exhaustive()
    }
}

impl SearchClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SearchError::InvalidBaseUrl`] if the
    /// configured base URL does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, SearchError> {
        Self::with_base_url(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a client with an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SearchError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends endpoint paths
        // instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| SearchError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
            token_provider: None,
            login_prompt: None,
        })
    }

    #[must_use]
    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    #[must_use]
    pub fn with_login_prompt(mut self, prompt: Arc<dyn LoginPrompt>) -> Self {
        self.login_prompt = Some(prompt);
        self
    }

    /// Fetches one page of map markers for the viewport/area search.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Http`] on network failure or timeout.
    /// - [`SearchError::Unauthorized`] on HTTP 401.
    /// - [`SearchError::Status`] on any other non-2xx status.
    /// - [`SearchError::Deserialize`] if the body is not JSON.
    pub async fn search_markers(
        &self,
        query: &SearchQuery,
    ) -> Result<ResultPage<Marker>, SearchError> {
        self.fetch_page(MARKERS_PATH, &query.to_pairs(), query.page, query.per_page)
            .await
    }

    /// Fetches one page of full records for the list search.
    ///
    /// # Errors
    ///
    /// Same as [`SearchClient::search_markers`].
    pub async fn search_toilets(
        &self,
        query: &SearchQuery,
    ) -> Result<ResultPage<Toilet>, SearchError> {
        self.fetch_page(TOILETS_PATH, &query.to_pairs(), query.page, query.per_page)
            .await
    }

    /// Fetches one page of records around a tapped anchor point.
    ///
    /// # Errors
    ///
    /// Same as [`SearchClient::search_markers`].
    pub async fn nearby(&self, query: &NearbyQuery) -> Result<ResultPage<Toilet>, SearchError> {
        self.fetch_page(NEARBY_PATH, &query.to_pairs(), query.page, query.per_page)
            .await
    }

    /// Fetches the administrative area reference list.
    ///
    /// Accepts either an enveloped `{ "data": [...] }` body or a bare array.
    ///
    /// # Errors
    ///
    /// Same as [`SearchClient::search_markers`].
    pub async fn list_areas(&self) -> Result<Vec<AdministrativeArea>, SearchError> {
        let url = self.build_url(AREAS_PATH, &[])?;
        let body = self.request_json(&url).await?;
        let raw = match &body {
            Value::Array(items) => items.as_slice(),
            other => other
                .get("data")
                .and_then(Value::as_array)
                .map_or(&[][..], Vec::as_slice),
        };
        Ok(decode_items(raw, AREAS_PATH))
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        pairs: &[(&'static str, String)],
        page: u32,
        per_page: u32,
    ) -> Result<ResultPage<T>, SearchError> {
        let url = self.build_url(path, pairs)?;
        let body = self.request_json(&url).await?;
        let result = parse_page(&body, page, per_page, path);
        tracing::debug!(
            path,
            page = result.page,
            items = result.items.len(),
            total = result.total,
            "search page received"
        );
        Ok(result)
    }

    /// Builds the endpoint URL with percent-encoded query parameters.
    fn build_url(&self, path: &str, pairs: &[(&str, String)]) -> Result<Url, SearchError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| SearchError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })?;
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (k, v) in pairs {
                query.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request, maps the status, and parses the body as JSON.
    async fn request_json(&self, url: &Url) -> Result<Value, SearchError> {
        let mut request = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = self
            .token_provider
            .as_ref()
            .and_then(|provider| provider.current_token())
        {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::info!(url = %url, "search request unauthorized, prompting login");
            if let Some(prompt) = &self.login_prompt {
                prompt.request_login();
            }
            return Err(SearchError::Unauthorized {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
