use thiserror::Error;

/// Error taxonomy for the whole pipeline.
///
/// Local, recoverable conditions (a single failed append while streaming) are
/// logged and skipped at the call site; anything preventing the primary
/// deliverable propagates as one of these and turns into a non-zero exit.
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials rejected by the service. Fatal, never retried here.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Network or protocol failure from the HTTP layer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success response from the API that is not an auth or rate issue.
    #[error("twitter api error {status}: {message}")]
    Api { status: u16, message: String },

    /// The service told us to back off (HTTP 420/429). For the stream
    /// listener this is the one signal that stops it.
    #[error("rate limited by the twitter api")]
    RateLimited,

    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Zero tweets to analyze. Guards the percentage computation, which would
    /// otherwise divide by zero.
    #[error("no tweets to analyze")]
    EmptyResult,

    #[error("write failed: {0}")]
    Write(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Map a non-success HTTP status plus response body to the right variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Auth(body),
            420 | 429 => Self::RateLimited,
            _ => Self::Api {
                status,
                message: body,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_auth() {
        assert!(matches!(
            Error::from_status(401, "bad token".into()),
            Error::Auth(_)
        ));
    }

    #[test]
    fn test_from_status_rate_limited() {
        assert!(matches!(Error::from_status(420, String::new()), Error::RateLimited));
        assert!(matches!(Error::from_status(429, String::new()), Error::RateLimited));
    }

    #[test]
    fn test_from_status_other() {
        match Error::from_status(500, "oops".into()) {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "oops");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
