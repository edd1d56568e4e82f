use std::sync::Arc;

use actix_web::http::StatusCode;
use log::{debug, info, warn};

use crate::errors::LoginError;
use crate::models::auth::{LoginRequest, LoginSuccess, MessageBody, UserProfile};
use crate::models::gateway::{GatewayRequest, GatewayResponse};
use crate::services::identity::IdentityService;

pub const PREFLIGHT_MESSAGE: &str = "CORS preflight handled";

/// Turns one login request into one response. Holds only read-only
/// configuration and a shared identity client.
pub struct LoginHandler {
    identity: Arc<dyn IdentityService>,
    client_id: String,
}

impl LoginHandler {
    pub fn new(identity: Arc<dyn IdentityService>, client_id: impl Into<String>) -> Self {
        Self {
            identity,
            client_id: client_id.into(),
        }
    }

    /// Never fails: every error becomes a response.
    pub async fn handle(&self, request: GatewayRequest) -> GatewayResponse {
        if request.is_preflight() {
            return GatewayResponse::json(
                StatusCode::OK.as_u16(),
                &MessageBody {
                    message: PREFLIGHT_MESSAGE.to_string(),
                },
            );
        }

        match self.login(request.body.as_deref()).await {
            Ok(success) => GatewayResponse::json(StatusCode::OK.as_u16(), &success),
            Err(e) => {
                warn!("Login rejected with status {}: {}", e.status_code(), e);
                e.into_response()
            }
        }
    }

    async fn login(&self, body: Option<&str>) -> Result<LoginSuccess, LoginError> {
        let credentials = LoginRequest::from_body(body).into_credentials()?;
        debug!("Authenticating user {}", credentials.username);

        let tokens = self
            .identity
            .authenticate(&self.client_id, &credentials.username, &credentials.password)
            .await?;

        let profile = self.identity.fetch_profile(&tokens.access_token).await?;
        info!("Login successful for user {}", profile.username);

        Ok(LoginSuccess::new(tokens, UserProfile::from_provider(profile)))
    }
}
