//! The error taxonomy every API call resolves to.
//!
//! Transport and protocol failures are folded into [`ApiError`] at this
//! layer, so callers above the pipeline match on one enum. `ApiError` is
//! `Clone` because a single refresh failure has to be delivered to every
//! request queued behind it.

use chirp_protocol::{ApiFailure, Codec, JsonCodec, ProtocolError};
use chirp_transport::{HttpResponse, TransportError};

/// Why an API call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// A 4xx other than session expiry.
    #[error("request rejected ({status} {code}): {message}")]
    Client {
        status: u16,
        code: String,
        message: String,
    },

    /// A 401 that recovery could not fix (or was not allowed to try).
    #[error("session expired: {message}")]
    SessionExpired { code: String, message: String },

    /// A 5xx.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The request never reached the server.
    #[error("network error: {0}")]
    Network(String),

    /// Input rejected on the client before anything was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A 2xx whose body didn't have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// `true` for the error that triggers session recovery.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// HTTP status behind this error, if one arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::SessionExpired { .. } => Some(401),
            Self::Network(_) | Self::Validation(_) | Self::Decode(_) => None,
        }
    }

    /// Text suitable for a user-facing notification.
    ///
    /// The backend's own message wins when it sent one; otherwise a
    /// status-specific fallback is used.
    pub fn user_message(&self) -> String {
        match self {
            Self::Client {
                status, message, ..
            } => {
                if !message.is_empty() {
                    message.clone()
                } else if *status == 403 {
                    "Unauthorized. Please log in again.".into()
                } else if *status == 404 {
                    "Resource not found.".into()
                } else {
                    format!("An API error occurred (Status: {status}).")
                }
            }
            Self::SessionExpired { message, .. } => {
                if message.is_empty() {
                    "Unauthorized. Please log in again.".into()
                } else {
                    message.clone()
                }
            }
            Self::Server { status, message } => {
                if message.is_empty() {
                    format!("An API error occurred (Status: {status}).")
                } else {
                    message.clone()
                }
            }
            Self::Network(_) => {
                "Network Error: Could not reach the server. Check your connection.".into()
            }
            Self::Validation(message) => message.clone(),
            Self::Decode(_) => "An unexpected error occurred.".into(),
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<ProtocolError> for ApiError {
    fn from(err: ProtocolError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Sorts a response into success or one of the [`ApiError`] kinds.
///
/// Only a 401 becomes [`ApiError::SessionExpired`]; that is the sole
/// status the pipeline tries to recover from.
pub fn classify(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }

    let failure: ApiFailure = JsonCodec.decode(&response.body).unwrap_or_default();
    let status = response.status;

    Err(match status {
        401 => ApiError::SessionExpired {
            code: failure.code,
            message: failure.message,
        },
        500..=599 => ApiError::Server {
            status,
            message: failure.message,
        },
        _ => ApiError::Client {
            status,
            code: failure.code,
            message: failure.message,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(status: u16, code: &str, message: &str) -> HttpResponse {
        HttpResponse::new(
            status,
            format!(r#"{{"status":"fail","code":"{code}","message":"{message}"}}"#),
        )
    }

    #[test]
    fn test_classify_2xx_passes_through() {
        let resp = HttpResponse::new(201, b"{}".to_vec());
        assert_eq!(classify(resp.clone()), Ok(resp));
    }

    #[test]
    fn test_classify_401_is_session_expired() {
        let err = classify(failure(401, "TOKEN_EXPIRED", "Access token expired")).unwrap_err();
        assert_eq!(
            err,
            ApiError::SessionExpired {
                code: "TOKEN_EXPIRED".into(),
                message: "Access token expired".into(),
            }
        );
        assert!(err.is_session_expired());
    }

    #[test]
    fn test_classify_403_is_client_error_not_expiry() {
        let err = classify(failure(403, "FORBIDDEN", "Not yours")).unwrap_err();
        assert!(matches!(err, ApiError::Client { status: 403, .. }));
        assert!(!err.is_session_expired());
    }

    #[test]
    fn test_classify_5xx_is_server_error() {
        let err = classify(failure(503, "DOWN", "Maintenance")).unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 503,
                message: "Maintenance".into()
            }
        );
    }

    #[test]
    fn test_classify_non_json_body_still_classifies() {
        let err = classify(HttpResponse::new(502, b"<html>Bad Gateway</html>".to_vec())).unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 502,
                message: String::new()
            }
        );
    }

    #[test]
    fn test_classify_redirect_status_is_client_error() {
        let err = classify(HttpResponse::new(304, Vec::new())).unwrap_err();
        assert!(matches!(err, ApiError::Client { status: 304, .. }));
    }

    #[test]
    fn test_user_message_prefers_backend_message() {
        let err = classify(failure(409, "USER_EXISTS", "Email already registered")).unwrap_err();
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[test]
    fn test_user_message_falls_back_by_status() {
        let not_found = ApiError::Client {
            status: 404,
            code: String::new(),
            message: String::new(),
        };
        assert_eq!(not_found.user_message(), "Resource not found.");

        let expired = ApiError::SessionExpired {
            code: String::new(),
            message: String::new(),
        };
        assert_eq!(expired.user_message(), "Unauthorized. Please log in again.");
    }

    #[test]
    fn test_user_message_for_network_error() {
        let err = ApiError::from(TransportError::ConnectionClosed("reset".into()));
        assert!(err.user_message().starts_with("Network Error"));
        assert_eq!(err.status(), None);
    }
}
