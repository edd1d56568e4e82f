use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

use crate::models::auth::{AuthTokens, ProviderProfile};

/// The two operations the login flow needs from a hosted identity provider.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Password based sign-in for the app client `client_id`.
    async fn authenticate(
        &self,
        client_id: &str,
        username: &str,
        password: &Secret<String>,
    ) -> Result<AuthTokens, IdentityError>;

    /// Profile lookup on behalf of the holder of `access_token`.
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, IdentityError>;
}

/// Failure categories an identity provider can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityErrorKind {
    NotAuthorized,
    UserNotFound,
    ChallengeRequired,
    TooManyRequests,
    InvalidParameter,
    /// Any other typed error raised by the provider.
    Provider,
    Transport,
    MalformedResponse,
}

impl IdentityErrorKind {
    pub fn from_provider_code(code: &str) -> Self {
        match code {
            "NotAuthorizedException" => Self::NotAuthorized,
            "UserNotFoundException" => Self::UserNotFound,
            "TooManyRequestsException" | "LimitExceededException" => Self::TooManyRequests,
            "InvalidParameterException" => Self::InvalidParameter,
            _ => Self::Provider,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct IdentityError {
    pub kind: IdentityErrorKind,
    pub message: String,
}

impl IdentityError {
    pub fn new(kind: IdentityErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(error: impl std::fmt::Display) -> Self {
        Self::new(IdentityErrorKind::Transport, error.to_string())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(IdentityErrorKind::MalformedResponse, message)
    }
}
