use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::auth::{AuthTokens, ProviderProfile, RawAttribute};
use crate::services::identity::{IdentityError, IdentityErrorKind, IdentityService};

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_HEADER: &str = "X-Amz-Target";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const ERROR_TYPE_HEADER: &str = "x-amzn-ErrorType";
const USER_PASSWORD_AUTH: &str = "USER_PASSWORD_AUTH";
const UNEXPECTED_RESPONSE: &str = "Unexpected response from identity service";

/// Cognito user pool client speaking the JSON 1.1 protocol directly.
///
/// `InitiateAuth` and `GetUser` are public operations, so requests are not
/// signed. The client holds no per-request state and is shared by all workers.
pub struct CognitoClient {
    http_client: Client,
    endpoint: Url,
}

impl CognitoClient {
    pub fn new(endpoint: Url, http_client: Client) -> Self {
        Self {
            http_client,
            endpoint,
        }
    }

    async fn call<Req, Resp>(&self, operation: &str, request: &Req) -> Result<Resp, IdentityError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_vec(request).map_err(|e| IdentityError::malformed(e.to_string()))?;

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, AMZ_JSON)
            .header(TARGET_HEADER, format!("{}.{}", TARGET_PREFIX, operation))
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                error!("Cognito {} request failed: {}", operation, e);
                IdentityError::transport(e)
            })?;

        let status = response.status();
        let error_type = response
            .headers()
            .get(ERROR_TYPE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await.map_err(|e| {
            error!("Failed to read Cognito {} response: {}", operation, e);
            IdentityError::transport(e)
        })?;

        if !status.is_success() {
            let error = provider_error(status, error_type.as_deref(), &bytes);
            warn!("Cognito {} rejected with {:?}", operation, error.kind);
            return Err(error);
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            error!("Failed to parse Cognito {} response: {}", operation, e);
            IdentityError::malformed(format!("{}: {}", UNEXPECTED_RESPONSE, e))
        })
    }
}

#[async_trait]
impl IdentityService for CognitoClient {
    async fn authenticate(
        &self,
        client_id: &str,
        username: &str,
        password: &Secret<String>,
    ) -> Result<AuthTokens, IdentityError> {
        let request = InitiateAuthRequest {
            auth_flow: USER_PASSWORD_AUTH,
            client_id,
            auth_parameters: AuthParameters {
                username,
                password: password.expose_secret(),
            },
        };

        let response: InitiateAuthResponse = self.call("InitiateAuth", &request).await?;

        match (response.authentication_result, response.challenge_name) {
            (Some(result), _) => result.into_tokens(),
            (None, Some(challenge)) => {
                debug!("Cognito requested challenge {}", challenge);
                Err(IdentityError::new(
                    IdentityErrorKind::ChallengeRequired,
                    format!("Identity service requires challenge {}", challenge),
                ))
            }
            (None, None) => {
                error!("Cognito InitiateAuth response carried neither tokens nor a challenge");
                Err(IdentityError::malformed(UNEXPECTED_RESPONSE))
            }
        }
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, IdentityError> {
        let response: GetUserResponse = self.call("GetUser", &GetUserRequest { access_token }).await?;

        Ok(ProviderProfile {
            username: response.username,
            attributes: response
                .user_attributes
                .into_iter()
                .map(|attribute| RawAttribute::new(attribute.name, attribute.value))
                .collect(),
        })
    }
}

/// Strips the namespace Cognito puts around error identifiers, both
/// `prefix#Code` in bodies and `Code:uri` in the error type header.
fn error_code(raw: &str) -> &str {
    let raw = raw.rsplit_once('#').map_or(raw, |(_, code)| code);
    raw.split_once(':').map_or(raw, |(code, _)| code)
}

fn provider_error(status: StatusCode, error_type: Option<&str>, body: &[u8]) -> IdentityError {
    let fault: ProviderFault = serde_json::from_slice(body).unwrap_or_default();
    let code = fault.error_type.as_deref().or(error_type).map(error_code);
    let kind = code.map_or(IdentityErrorKind::Provider, IdentityErrorKind::from_provider_code);
    let message = fault
        .message
        .filter(|message| !message.is_empty())
        .or_else(|| code.map(str::to_owned))
        .unwrap_or_else(|| format!("Identity service returned HTTP {}", status));

    IdentityError::new(kind, message)
}

#[derive(Debug, Default, Deserialize)]
struct ProviderFault {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct AuthParameters<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: Option<String>,
    id_token: Option<String>,
}

impl AuthenticationResult {
    fn into_tokens(self) -> Result<AuthTokens, IdentityError> {
        match (self.access_token, self.id_token) {
            (Some(access_token), Some(id_token)) => Ok(AuthTokens {
                access_token,
                id_token,
            }),
            _ => {
                error!("Cognito authentication result is missing tokens");
                Err(IdentityError::malformed(UNEXPECTED_RESPONSE))
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserRequest<'a> {
    access_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserResponse {
    username: String,
    #[serde(default)]
    user_attributes: Vec<AttributeType>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AttributeType {
    name: String,
    #[serde(default)]
    value: String,
}
