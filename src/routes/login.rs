use actix_web::http::StatusCode;
use actix_web::{route, web, HttpRequest, HttpResponse};
use log::warn;

use crate::models::gateway::{GatewayRequest, GatewayResponse};
use crate::services::login::LoginHandler;

#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = crate::models::auth::LoginRequest,
    responses(
        (status = 200, description = "Tokens and normalized profile", body = crate::models::auth::LoginSuccess),
        (status = 400, description = "Username or password missing", body = crate::models::auth::ErrorBody),
        (status = 401, description = "Rejected by the identity service", body = crate::models::auth::ErrorBody)
    )
)]
#[route("/login", method = "POST", method = "OPTIONS")]
pub async fn login(
    req: HttpRequest,
    body: Result<web::Bytes, actix_web::Error>,
    handler: web::Data<LoginHandler>,
) -> HttpResponse {
    // An unreadable payload (too large, broken stream) is answered like a missing body.
    let body = match body {
        Ok(bytes) if !bytes.is_empty() => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Ok(_) => None,
        Err(e) => {
            warn!("Discarding unreadable login payload: {}", e);
            None
        }
    };
    let request = GatewayRequest::new(req.method().as_str(), body);

    into_http_response(handler.handle(request).await)
}

fn into_http_response(response: GatewayResponse) -> HttpResponse {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = HttpResponse::build(status);
    for (name, value) in &response.headers {
        builder.insert_header((name.as_str(), value.as_str()));
    }
    builder.body(response.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{AuthTokens, ProviderProfile, RawAttribute};
    use crate::services::identity::{IdentityError, IdentityErrorKind, IdentityService};
    use actix_web::{test, App};
    use async_trait::async_trait;
    use secrecy::{ExposeSecret, Secret};
    use serde_json::{json, Value};
    use std::sync::Arc;

    /// Accepts exactly one password and returns a fixed profile.
    struct SinglePassword;

    #[async_trait]
    impl IdentityService for SinglePassword {
        async fn authenticate(
            &self,
            _client_id: &str,
            _username: &str,
            password: &Secret<String>,
        ) -> Result<AuthTokens, IdentityError> {
            if password.expose_secret() == "secret" {
                Ok(AuthTokens {
                    access_token: "access".into(),
                    id_token: "id".into(),
                })
            } else {
                Err(IdentityError::new(
                    IdentityErrorKind::NotAuthorized,
                    "Incorrect username or password.",
                ))
            }
        }

        async fn fetch_profile(
            &self,
            _access_token: &str,
        ) -> Result<ProviderProfile, IdentityError> {
            Ok(ProviderProfile {
                username: "ada".into(),
                attributes: vec![RawAttribute::new("custom:role", "admin")],
            })
        }
    }

    fn header<'a>(resp: &'a actix_web::dev::ServiceResponse, name: &str) -> &'a str {
        resp.headers().get(name).unwrap().to_str().unwrap()
    }

    fn handler() -> web::Data<LoginHandler> {
        web::Data::new(LoginHandler::new(Arc::new(SinglePassword), "client-123"))
    }

    #[actix_web::test]
    async fn post_returns_handler_response() {
        let app = test::init_service(App::new().app_data(handler()).service(login)).await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_payload(r#"{"username":"ada","password":"secret"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(&resp, "Access-Control-Allow-Origin"), "*");
        assert_eq!(header(&resp, "Access-Control-Allow-Methods"), "POST,OPTIONS");
        assert_eq!(header(&resp, "Content-Type"), "application/json");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["accessToken"], "access");
        assert_eq!(body["userProfile"]["role"], "admin");
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let app = test::init_service(App::new().app_data(handler()).service(login)).await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_payload(r#"{"username":"ada","password":"guess"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Invalid username or password" }));
    }

    #[actix_web::test]
    async fn empty_post_is_bad_request() {
        let app = test::init_service(App::new().app_data(handler()).service(login)).await;

        let resp = test::call_service(&app, test::TestRequest::post().uri("/login").to_request()).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(header(&resp, "Access-Control-Allow-Headers"), "*");
    }

    #[actix_web::test]
    async fn oversized_post_is_bad_request_with_cors() {
        let app = test::init_service(App::new().app_data(handler()).service(login)).await;

        let padding = "x".repeat(300_000);
        let payload = format!(r#"{{"username":"ada","password":"secret","pad":"{}"}}"#, padding);
        let req = test::TestRequest::post()
            .uri("/login")
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(header(&resp, "Access-Control-Allow-Origin"), "*");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Username and password are required" }));
    }

    #[actix_web::test]
    async fn options_is_answered_as_preflight() {
        let app = test::init_service(App::new().app_data(handler()).service(login)).await;

        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/login")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "CORS preflight handled" }));
    }
}
