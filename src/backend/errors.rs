use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Network error: {message}")]
    Transport { message: String },
    #[error("Invalid response from backend: {message}")]
    MalformedResponse { message: String },
    #[error("Backend rejected the request: {message}")]
    Rejected { message: String },
    #[error("Failed to build HTTP client: {message}")]
    ClientSetup { message: String },
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::MalformedResponse {
                message: err.to_string(),
            }
        } else {
            BackendError::Transport {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::MalformedResponse {
            message: err.to_string(),
        }
    }
}

impl BackendError {
    /// Authentication failures: retrying with the same token cannot help
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, BackendError::Http { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = BackendError::Http {
            status: 409,
            body: "already approved".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned HTTP 409: already approved");
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn test_auth_failure_detection() {
        let err = BackendError::Http {
            status: 401,
            body: String::new(),
        };
        assert!(err.is_auth_failure());
    }

    #[test]
    fn test_json_error_is_malformed_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(
            BackendError::from(json_err),
            BackendError::MalformedResponse { .. }
        ));
    }
}
