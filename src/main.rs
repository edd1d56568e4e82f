use std::io;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::routes::health::__path_health_check;
use crate::routes::health::health_check;
use crate::routes::login::__path_login;
use crate::routes::login::login;
use crate::services::cognito::CognitoClient;
use crate::services::identity::IdentityService;
use crate::services::login::LoginHandler;

pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;

#[derive(OpenApi)]
#[openapi(
    paths(health_check, login),
    components(
        schemas(
            models::auth::LoginRequest,
            models::auth::LoginSuccess,
            models::auth::UserProfile,
            models::auth::ErrorBody,
            models::auth::MessageBody
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Password login against the Cognito user pool")
    )
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(io::Error::other)?;
    let identity: Arc<dyn IdentityService> =
        Arc::new(CognitoClient::new(config.cognito_endpoint.clone(), http_client));
    let handler = web::Data::new(LoginHandler::new(identity, config.client_id.clone()));

    let openapi = ApiDoc::openapi();

    info!(
        "Starting server at http://{}:{} (identity endpoint {})",
        config.host, config.port, config.cognito_endpoint
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(handler.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .service(health_check)
            .service(login)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
