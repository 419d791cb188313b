//! Error types for the IGDB API.

#[derive(Debug, thiserror::Error)]
pub enum IgdbError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IGDB API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl IgdbError {
    /// Whether the API rejected our credentials
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            IgdbError::Api {
                status: 401 | 403,
                ..
            }
        )
    }
}
