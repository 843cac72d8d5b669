//! Data source error types

use thiserror::Error;

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    Recoverable,
    Fatal,
}

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_) | Self::Timeout => ErrorKind::Recoverable,
            Self::Http { status } if *status == 429 || *status >= 500 => ErrorKind::Recoverable,
            _ => ErrorKind::Fatal,
        }
    }

    pub fn should_retry(&self) -> bool {
        matches!(self.kind(), ErrorKind::Recoverable)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http { status: status.as_u16() }
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(SourceError::Timeout.should_retry());
        assert!(SourceError::Connection("reset".into()).should_retry());
        assert!(SourceError::Http { status: 503 }.should_retry());
        assert!(SourceError::Http { status: 429 }.should_retry());
        assert!(!SourceError::Http { status: 404 }.should_retry());
        assert!(!SourceError::Parse("bad".into()).should_retry());
        assert_eq!(
            SourceError::Api { code: "50011".into(), message: "busy".into() }.kind(),
            ErrorKind::Fatal
        );
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(SourceError::from(err), SourceError::Parse(_)));
    }
}
