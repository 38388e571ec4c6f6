/// Errors from the token service HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not parse as the expected JSON shape.
    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server answered with a non-success status.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body, when readable.
        message: String,
    },

    /// The service refused a cosign or broadcast submission.
    #[error("submission rejected: {0}")]
    Rejected(String),

    /// A response field failed conversion into an engine type.
    #[error("invalid response field: {0}")]
    InvalidField(String),
}
