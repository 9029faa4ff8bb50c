//! API client error types

use thiserror::Error;

/// Errors from a backend request.
///
/// An empty result is not an error; it decodes to an empty collection and the
/// caller decides what to show.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure (connection refused, DNS, reset)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// The backend answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx response whose body does not match the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(err)
        }
    }

    /// HTTP status, when the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Status {
            status: 404,
            message: "Маршрут не найден".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: Маршрут не найден");
        assert_eq!(err.status(), Some(404));

        assert_eq!(ClientError::Timeout.to_string(), "Request timeout");
        assert_eq!(ClientError::Timeout.status(), None);
    }

    #[test]
    fn test_decode_error_conversion() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ClientError = json_err.into();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
