use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::catalog::{CredentialError, PublishError};
use crate::playlist::{AssemblyError, NO_MATCHING_SONGS};

/// Failures surfaced to HTTP clients as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Credential(CredentialError),
    NoMatchingSongs,
    PublisherUnavailable,
    Publish(PublishError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Credential(CredentialError::MissingCredentials) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Credential(_) => StatusCode::BAD_GATEWAY,
            ApiError::NoMatchingSongs => StatusCode::NOT_FOUND,
            ApiError::PublisherUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Publish(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(message) | ApiError::Unauthorized(message) => message.clone(),
            ApiError::Credential(err) => err.to_string(),
            ApiError::NoMatchingSongs => NO_MATCHING_SONGS.to_string(),
            ApiError::PublisherUnavailable => {
                "Playlist publishing is not configured on this server".to_string()
            }
            ApiError::Publish(err) => format!("Failed to create playlist: {}", err),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        ApiError::Credential(err)
    }
}

impl From<AssemblyError> for ApiError {
    fn from(err: AssemblyError) -> Self {
        match err {
            AssemblyError::NoMatchingSongs(_) => ApiError::NoMatchingSongs,
        }
    }
}

impl From<PublishError> for ApiError {
    fn from(err: PublishError) -> Self {
        ApiError::Publish(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", message);
        } else {
            warn!(status = status.as_u16(), "{}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CredentialError::MissingCredentials).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(CredentialError::Connection("refused".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(AssemblyError::NoMatchingSongs(Default::default())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(PublishError::Api {
                status: 403,
                message: "nope".into()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn no_matching_songs_message() {
        assert_eq!(
            ApiError::NoMatchingSongs.message(),
            "No matching songs found in the catalog"
        );
        assert!(ApiError::from(CredentialError::MissingCredentials)
            .message()
            .contains("SPOTIFY_CLIENT_ID"));
    }
}
