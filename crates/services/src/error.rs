/// Failure of a geocoding, statistics or geometry lookup.
///
/// `Clone` because a coalesced request delivers the same outcome to every
/// waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Validation, not a failure: shown as an inline hint.
    QueryTooShort { min: usize },
    RateLimited,
    Failed { service: &'static str, status: u16 },
    Network(String),
    Decode(String),
}

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests right now. Please wait a moment and try again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong while looking that up. Please try again.";

impl LookupError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LookupError::QueryTooShort { .. })
    }

    /// Text for the UI. Rate limiting gets its own message; every other
    /// failure shares a generic one.
    pub fn user_message(&self) -> String {
        match self {
            LookupError::QueryTooShort { min } => {
                format!("Type at least {min} characters to search.")
            }
            LookupError::RateLimited => RATE_LIMIT_MESSAGE.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::QueryTooShort { min } => {
                write!(f, "query shorter than {min} characters")
            }
            LookupError::RateLimited => write!(f, "rate limit exceeded"),
            LookupError::Failed { service, status } => {
                write!(f, "{service} request failed with HTTP {status}")
            }
            LookupError::Network(msg) => write!(f, "network error: {msg}"),
            LookupError::Decode(msg) => write!(f, "unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for LookupError {}
