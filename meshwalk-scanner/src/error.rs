use thiserror::Error;

/// Classified failure of a single node fetch.
///
/// The walker treats every variant the same way: the node is unreachable
/// for this run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("connection lost mid-response: {0}")]
    ConnectionLost(String),

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("malformed HTTP exchange: {0}")]
    MalformedFraming(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("request timed out: {0}")]
    Timeout(String),
}

impl FetchError {
    /// Whether the HTTP layer should try the request again.
    ///
    /// Body and decode failures happen after the exchange completed and
    /// are never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::ConnectionRefused(_)
                | FetchError::Connect(_)
                | FetchError::ConnectionLost(_)
                | FetchError::Timeout(_)
        )
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            FetchError::Timeout(message)
        } else if err.is_connect() {
            if is_connection_refused(&err) {
                FetchError::ConnectionRefused(message)
            } else {
                FetchError::Connect(message)
            }
        } else if err.is_body() {
            FetchError::MalformedBody(message)
        } else if err.is_decode() {
            FetchError::Decode(message)
        } else if err.is_request() {
            FetchError::ConnectionLost(message)
        } else {
            FetchError::MalformedFraming(message)
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

fn is_connection_refused(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            return io.kind() == std::io::ErrorKind::ConnectionRefused;
        }
        source = inner.source();
    }
    false
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid node endpoint: {0}")]
    InvalidEndpoint(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
