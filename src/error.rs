//! Failure taxonomy shared by every remote-calling operation

use rspotify::ClientError;
use rspotify::http::HttpError;
use rspotify::model::IdError;

use crate::model::Severity;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Local precondition failed; nothing was sent to Spotify.
    #[error("{0}")]
    Validation(String),

    #[error("Spotify rejected the access token")]
    Auth,

    #[error("Spotify refused the request: insufficient permissions")]
    Permission,

    #[error("Request failed: {0}")]
    Transport(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => ApiError::Auth,
            403 => ApiError::Permission,
            _ => ApiError::Transport(format!("status {} - {}", status, body)),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth)
    }

    /// The text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Auth => "Session expired. Please log in again.".to_string(),
            ApiError::Permission => {
                "Insufficient permissions for this action. Check the granted scopes.".to_string()
            }
            ApiError::Transport(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ApiError::Validation(_) | ApiError::Auth => Severity::Warning,
            ApiError::Permission | ApiError::Transport(_) => Severity::Error,
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(http) => match *http {
                HttpError::StatusCode(response) => {
                    let status = response.status();
                    ApiError::from_status(status.as_u16(), status.canonical_reason().unwrap_or(""))
                }
                other => ApiError::Transport(other.to_string()),
            },
            other => ApiError::Transport(other.to_string()),
        }
    }
}

impl From<IdError> for ApiError {
    fn from(err: IdError) -> Self {
        ApiError::Transport(format!("malformed Spotify id: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(ApiError::from_status(401, ""), ApiError::Auth));
        assert!(matches!(ApiError::from_status(403, ""), ApiError::Permission));
        assert!(matches!(ApiError::from_status(404, "missing"), ApiError::Transport(_)));
        assert!(matches!(ApiError::from_status(500, ""), ApiError::Transport(_)));
        assert!(matches!(ApiError::from_status(429, ""), ApiError::Transport(_)));
    }

    #[test]
    fn test_user_messages_by_kind() {
        assert_eq!(ApiError::validation("Name required").user_message(), "Name required");
        assert!(ApiError::Auth.user_message().contains("Session expired"));
        assert!(ApiError::Permission.user_message().contains("permissions"));
        assert!(ApiError::Transport("boom".into()).user_message().contains("try again"));
        assert_eq!(ApiError::Auth.severity(), Severity::Warning);
        assert_eq!(ApiError::Transport(String::new()).severity(), Severity::Error);
    }

    #[test]
    fn test_malformed_payloads_are_transport_errors() {
        let parse_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: ApiError = ClientError::ParseJson(parse_err).into();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
