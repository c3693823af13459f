use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Backend rejected the supplied credentials on login or signup.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// A refresh was requested but no refresh token is stored.
    #[error("no refresh token available")]
    NoRefreshToken,
    /// The refresh endpoint rejected the refresh token or could not be reached.
    #[error("token refresh failed: {0}")]
    Refresh(String),
    /// Logout could not be confirmed by the backend; local state is cleared regardless.
    #[error("logout request failed: {0}")]
    LogoutTransport(String),
    #[error("http {0}: {1}")]
    Http(StatusCode, String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential store error: {0}")]
    Store(String),
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// True for the "unauthorized" condition that may trigger a refresh-and-retry.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Http(status, _) if *status == StatusCode::UNAUTHORIZED)
    }

    /// Timeouts, unreachable hosts and malformed bodies. Never triggers a refresh.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Json(_))
    }
}

/// Extracts a human readable message from an error body returned by the backend.
///
/// The backend answers either with JSON (`{"message": ..}` / `{"error": ..}`) or with a
/// plain text line; when neither carries anything the status reason is used.
pub(crate) fn backend_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str())
                && !msg.trim().is_empty()
            {
                return msg.trim().to_string();
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_prefers_json_message() {
        let body = r#"{"message":"Invalid credentials","status":"error"}"#;
        assert_eq!(
            backend_message(StatusCode::UNAUTHORIZED, body),
            "Invalid credentials"
        );
    }

    #[test]
    fn backend_message_falls_back_to_plain_text_then_reason() {
        assert_eq!(
            backend_message(StatusCode::UNAUTHORIZED, "No refresh token provided\n"),
            "No refresh token provided"
        );
        assert_eq!(backend_message(StatusCode::BAD_REQUEST, "  "), "Bad Request");
    }

    #[test]
    fn only_http_401_counts_as_unauthorized() {
        assert!(Error::Http(StatusCode::UNAUTHORIZED, String::new()).is_unauthorized());
        assert!(!Error::Http(StatusCode::FORBIDDEN, String::new()).is_unauthorized());
        assert!(!Error::Refresh("401".into()).is_unauthorized());
    }
}
