use std::collections::BTreeMap;

use log::error;
use serde::{Deserialize, Serialize};

pub const PREFLIGHT_METHOD: &str = "OPTIONS";

const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Headers", "*"),
    ("Access-Control-Allow-Methods", "POST,OPTIONS"),
    ("Access-Control-Allow-Origin", "*"),
    ("Content-Type", "application/json"),
];

/// The request as handed over by the host: a method and an optional raw body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    pub http_method: String,
    #[serde(default)]
    pub body: Option<String>,
}

impl GatewayRequest {
    pub fn new(http_method: impl Into<String>, body: Option<String>) -> Self {
        Self {
            http_method: http_method.into(),
            body,
        }
    }

    pub fn is_preflight(&self) -> bool {
        self.http_method == PREFLIGHT_METHOD
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl GatewayResponse {
    /// Builds a response with the CORS headers and `payload` encoded as JSON.
    pub fn json<T: Serialize>(status_code: u16, payload: &T) -> Self {
        let body = match serde_json::to_string(payload) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to encode response body: {}", e);
                return Self::with_body(
                    401,
                    serde_json::json!({ "error": e.to_string() }).to_string(),
                );
            }
        };
        Self::with_body(status_code, body)
    }

    fn with_body(status_code: u16, body: String) -> Self {
        let headers = CORS_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self {
            status_code,
            headers,
            body,
        }
    }
}
