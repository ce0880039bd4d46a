use thiserror::Error;

/// Failures of a single prompt/response round trip.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BridgeError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("no response from the model")]
    EmptyResponse,
    #[error("no structured data found in model response")]
    Extraction,
    #[error("invalid structured data: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key in its query string.
        BridgeError::Transport(err.without_url().to_string())
    }
}

pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
