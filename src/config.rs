use std::env;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Either COGNITO_ENDPOINT or COGNITO_REGION/AWS_REGION must be set")]
    MissingRegion,

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub cognito_endpoint: Url,
    pub request_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Reads the environment, after loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let client_id = get("CLIENT_ID").ok_or(ConfigError::Missing("CLIENT_ID"))?;

        let endpoint = match get("COGNITO_ENDPOINT") {
            Some(endpoint) => endpoint,
            None => {
                let region = get("COGNITO_REGION")
                    .or_else(|| get("AWS_REGION"))
                    .ok_or(ConfigError::MissingRegion)?;
                format!("https://cognito-idp.{}.amazonaws.com/", region)
            }
        };
        let cognito_endpoint = Url::parse(&endpoint).map_err(|e| ConfigError::Invalid {
            name: "COGNITO_ENDPOINT",
            reason: e.to_string(),
        })?;

        let timeout_secs = parse_or(
            "COGNITO_TIMEOUT_SECS",
            get("COGNITO_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;

        Ok(Self {
            client_id,
            cognito_endpoint,
            request_timeout: Duration::from_secs(timeout_secs),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
