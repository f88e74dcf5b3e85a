use std::fmt;

use serde::{Deserialize, Serialize};

use super::kinds::{ApiError, RegsearchError};

/// Structured error information surfaced to the presentation layer.
///
/// Search and export failures populate this status/message pair; the
/// presentation layer (the CLI here) reads and clears it. A `None` status
/// means the failure never reached the server (transport error, bad
/// endpoint, local fault).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl ErrorInfo {
    /// Extract status code and message from a crate error.
    ///
    /// Uses the typed error structures directly instead of string parsing:
    /// server status responses carry their code, transport errors carry
    /// whatever status the response had before the failure, everything else
    /// has no status.
    pub fn from_error(error: &RegsearchError) -> Self {
        match error {
            RegsearchError::Api(ApiError::Status { code, message }) => Self {
                status: Some(*code),
                message: message.clone(),
            },
            RegsearchError::Http(e) => Self {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            other => Self {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_error() {
        let err = RegsearchError::Api(ApiError::Status {
            code: 429,
            message: "Too Many Requests".to_string(),
        });
        let info = ErrorInfo::from_error(&err);
        assert_eq!(info.status, Some(429));
        assert_eq!(info.message, "Too Many Requests");
    }

    #[test]
    fn test_from_local_error() {
        let err = RegsearchError::Generic("no network".to_string());
        let info = ErrorInfo::from_error(&err);
        assert_eq!(info.status, None);
        assert_eq!(info.message, "no network");
    }

    #[test]
    fn test_display_with_status() {
        let info = ErrorInfo {
            status: Some(404),
            message: "Not Found".to_string(),
        };
        assert_eq!(info.to_string(), "[404] Not Found");
    }
}
