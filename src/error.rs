use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failures coming out of the backend client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not signed in")]
    Unauthenticated,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

impl ApiError {
    /// Message suitable for the status line. Backend-provided detail is shown
    /// verbatim; transport failures get a generic description.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Api { status, .. } => format!("Request failed (status {})", status),
            ApiError::Network(_) => "Network error. Please try again.".to_string(),
            ApiError::Parse(_) => "Unexpected response from server.".to_string(),
            ApiError::Unauthenticated => "Please sign in first.".to_string(),
        }
    }
}

/// Local failures: session storage and config handling.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt session data: {0}")]
    Corrupt(String),
}
