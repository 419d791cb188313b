use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::clip::ClipError;
use crate::igdb::IgdbError;
use crate::twitch::TwitchAuthError;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Game not found: {name}")]
    GameNotFound { name: String },

    #[error("No characters found for '{game}'")]
    NoCharacters { game: String },

    #[error("{0}")]
    Twitch(#[from] TwitchAuthError),

    #[error("{0}")]
    Igdb(#[from] IgdbError),

    #[error("{0}")]
    Clip(#[from] ClipError),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::GameNotFound { .. } | ServiceError::NoCharacters { .. } => {
                StatusCode::NOT_FOUND
            }
            ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Twitch(TwitchAuthError::Rejected { .. }) => StatusCode::UNAUTHORIZED,
            ServiceError::Igdb(e) if e.is_auth_failure() => StatusCode::UNAUTHORIZED,
            ServiceError::Twitch(_) | ServiceError::Igdb(_) | ServiceError::Clip(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::GameNotFound { .. } => "game_not_found",
            ServiceError::NoCharacters { .. } => "no_characters",
            ServiceError::Twitch(TwitchAuthError::Rejected { .. }) => "token_rejected",
            ServiceError::Twitch(_) => "twitch_connection",
            ServiceError::Igdb(e) if e.is_auth_failure() => "igdb_auth",
            ServiceError::Igdb(IgdbError::Api { .. }) => "igdb_api",
            ServiceError::Igdb(_) => "igdb_connection",
            ServiceError::Clip(ClipError::Connection { .. }) => "clip_connection",
            ServiceError::Clip(ClipError::Inference { .. }) => "clip_inference",
            ServiceError::Clip(_) => "clip_invalid_response",
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::Config { .. } => "config_error",
            ServiceError::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().to_string();

        let response = ErrorResponse {
            message: self.to_string(),
            code: Some(code),
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err = ServiceError::GameNotFound {
            name: "Nonexistent".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ServiceError::InvalidRequest {
            message: "missing field".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ServiceError::Twitch(TwitchAuthError::Rejected {
            status: 403,
            message: "invalid client secret".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err = ServiceError::Igdb(IgdbError::Api {
            status: 401,
            message: "Authorization failure".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err = ServiceError::Igdb(IgdbError::Api {
            status: 500,
            message: String::new(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_error_codes() {
        let err = ServiceError::NoCharacters {
            game: "Pong".to_string(),
        };
        assert_eq!(err.error_code(), "no_characters");

        let err = ServiceError::Clip(ClipError::Inference {
            status: 500,
            message: String::new(),
        });
        assert_eq!(err.error_code(), "clip_inference");
    }
}
