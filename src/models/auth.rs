use std::collections::HashMap;

use secrecy::Secret;
use serde::{Deserialize, Serialize};

use crate::errors::LoginError;

const GIVEN_NAME: &str = "given_name";
const FAMILY_NAME: &str = "family_name";
const EMAIL: &str = "email";
const CUSTOM_TITLE: &str = "custom:title";
const CUSTOM_ROLE: &str = "custom:role";

pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";

/// Body of a login call as sent by the client. Both fields are optional at
/// this stage; `into_credentials` decides whether the pair is usable.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Reads a request body leniently: a missing body, invalid JSON or any
    /// JSON value other than an object all yield an empty request.
    pub fn from_body(body: Option<&str>) -> Self {
        body.and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
            .filter(serde_json::Value::is_object)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    pub fn into_credentials(self) -> Result<Credentials, LoginError> {
        match (self.username, self.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok(Credentials {
                    username,
                    password: Secret::new(password),
                })
            }
            _ => Err(LoginError::MissingCredentials),
        }
    }
}

/// A username/password pair that passed validation.
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

/// Bearer tokens issued by the identity service. Never inspected here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: String,
    pub id_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub name: String,
    pub value: String,
}

impl RawAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// What the identity service returns for an authenticated profile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub username: String,
    pub attributes: Vec<RawAttribute>,
}

/// Folds an attribute list into a lookup table. A name appearing twice keeps
/// the value of its last occurrence.
pub fn normalize(attributes: &[RawAttribute]) -> HashMap<String, String> {
    attributes
        .iter()
        .map(|attribute| (attribute.name.clone(), attribute.value.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub title: String,
    pub role: String,
}

impl UserProfile {
    pub fn from_provider(profile: ProviderProfile) -> Self {
        let mut attributes = normalize(&profile.attributes);
        let mut take = |name: &str| attributes.remove(name).unwrap_or_default();

        Self {
            first_name: take(GIVEN_NAME),
            last_name: take(FAMILY_NAME),
            email: take(EMAIL),
            title: take(CUSTOM_TITLE),
            role: take(CUSTOM_ROLE),
            username: profile.username,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginSuccess {
    pub message: String,
    pub id_token: String,
    pub access_token: String,
    pub user_profile: UserProfile,
}

impl LoginSuccess {
    pub fn new(tokens: AuthTokens, user_profile: UserProfile) -> Self {
        Self {
            message: LOGIN_SUCCESS_MESSAGE.to_string(),
            id_token: tokens.id_token,
            access_token: tokens.access_token,
            user_profile,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageBody {
    pub message: String,
}
