use actix_web::http::StatusCode;
use thiserror::Error;

use crate::models::auth::ErrorBody;
use crate::models::gateway::GatewayResponse;
use crate::services::identity::{IdentityError, IdentityErrorKind};

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Username and password are required")]
    MissingCredentials,

    /// Wrong password and unknown user collapse into this one variant.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Service(String),
}

impl LoginError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LoginError::MissingCredentials => StatusCode::BAD_REQUEST,
            LoginError::InvalidCredentials | LoginError::Service(_) => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn into_response(self) -> GatewayResponse {
        GatewayResponse::json(
            self.status_code().as_u16(),
            &ErrorBody {
                error: self.to_string(),
            },
        )
    }
}

impl From<IdentityError> for LoginError {
    fn from(error: IdentityError) -> Self {
        match error.kind {
            IdentityErrorKind::NotAuthorized | IdentityErrorKind::UserNotFound => {
                LoginError::InvalidCredentials
            }
            IdentityErrorKind::ChallengeRequired
            | IdentityErrorKind::TooManyRequests
            | IdentityErrorKind::InvalidParameter
            | IdentityErrorKind::Provider
            | IdentityErrorKind::Transport
            | IdentityErrorKind::MalformedResponse => LoginError::Service(error.message),
        }
    }
}
