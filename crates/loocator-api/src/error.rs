use thiserror::Error;

/// Errors returned by the search API client.
///
/// A request cancelled because a newer one superseded it is not an error;
/// the discovery layer reports that separately and never surfaces it.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status other than 401.
    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// The backend rejected the bearer token (or none was available).
    #[error("unauthorized request to {url}")]
    Unauthorized { url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl SearchError {
    /// Message suitable for the `error` field shown next to a retry button.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Http(e) if e.is_timeout() => {
                "The request timed out. Please try again.".to_string()
            }
            SearchError::Http(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            SearchError::Status { status, .. } if *status >= 500 => {
                format!("The server is having trouble right now (HTTP {status}). Please try again.")
            }
            SearchError::Status { status, .. } => {
                format!("The search request was rejected (HTTP {status}).")
            }
            SearchError::Unauthorized { .. } => "Please sign in to continue.".to_string(),
            SearchError::Deserialize { .. } => {
                "Received an unexpected response from the server.".to_string()
            }
            SearchError::InvalidBaseUrl { .. } => {
                "The app is misconfigured: the server address is invalid.".to_string()
            }
        }
    }
}
