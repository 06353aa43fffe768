use std::fmt;

/// Why a single fetch attempt failed. Collapsed into a `FetchOutcome::Failed`
/// message once retries run out.
#[derive(Debug)]
pub enum FetchError {
    Request(String),
    Status(u16, String),
    NonJsonResponse(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::Request(msg) => write!(f, "Request error: {}", msg),
            FetchError::Status(code, preview) => write!(f, "HTTP {}: {}", code, preview),
            FetchError::NonJsonResponse(preview) => write!(f, "Non-JSON response: {}", preview),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Request(err.to_string())
    }
}

/// First `max` characters of a response body, for error messages.
pub(crate) fn preview(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}
