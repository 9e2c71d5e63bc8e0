use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build the HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network error while calling the market-data API")]
    Network(#[source] reqwest::Error),

    #[error("The market-data API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response shape from the market-data API: {0}")]
    DataShape(String),
}

impl ApiError {
    /// True when the upstream could not be reached, timed out, or answered
    /// with a non-success status.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Status { .. })
    }
}
