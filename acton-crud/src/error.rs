//! Crate-level error type
//!
//! Covers failures outside a single request: loading configuration, binding
//! the listener, installing the tracing subscriber. Request failures are
//! [`ApiError`](crate::handlers::ApiError)s.

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error (binding, serving)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: port taken");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: Error = figment::Error::from("missing field `name`".to_string()).into();
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
