use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use yansi::Paint;

use super::error::ApiError;
use crate::utils::{build_query_string, value_to_short_string};

static SILENT: AtomicBool = AtomicBool::new(false);

pub fn set_silent(silent: bool) {
    SILENT.store(silent, Ordering::Relaxed);
}

fn log_output(msg: String) {
    if !SILENT.load(Ordering::Relaxed) {
        println!("{}", msg);
    }
}

/// Core HTTP client function for making inventory API calls.
/// Handles authentication, request building, and error responses.
pub async fn api_call(
    client: &reqwest::Client,
    api_base_url: &str,
    api_token: &str,
    method: &str,
    endpoint: &str,
    body: Option<Value>,
    params: Option<Vec<(String, String)>>,
) -> Result<Value, ApiError> {
    // --- Curl Logging ---
    let mut url_for_log = format!("{}{}", api_base_url, endpoint);
    if let Some(ref p) = params {
        if !p.is_empty() {
            url_for_log = format!("{}?{}", url_for_log, build_query_string(p));
        }
    }

    let mut parts = Vec::new();
    parts.push(Paint::new("curl").fg(yansi::Color::Green).bold().to_string());
    parts.push(format!("-X {}", Paint::new(method).fg(yansi::Color::Yellow).bold()));
    parts.push(format!("'{}'", Paint::new(&url_for_log).fg(yansi::Color::Cyan)));

    if !api_token.is_empty() {
        parts.push(format!(
            "{} {}",
            Paint::new("-H").fg(yansi::Color::Magenta),
            Paint::new(format!("'Authorization: Bearer {}'", api_token)).fg(yansi::Color::Magenta)
        ));
    }
    if body.is_some() {
        parts.push(format!(
            "{} {}",
            Paint::new("-H").fg(yansi::Color::Magenta),
            Paint::new("'Content-Type: application/json'").fg(yansi::Color::Magenta)
        ));
    }

    if let Some(ref d) = body {
        let json_str = serde_json::to_string_pretty(d).unwrap_or_default();
        let escaped_json = json_str.replace("'", "'\\''");
        parts.push(format!(
            "{} {}",
            Paint::new("-d").fg(yansi::Color::Blue),
            Paint::new(format!("'{}'", escaped_json)).fg(yansi::Color::White)
        ));
    }
    log_output(format!("Request:\n{}", parts.join(" ")));
    // --------------------

    let url = format!("{}{}", api_base_url, endpoint);
    let mut req = match method {
        "GET" => client.get(&url),
        "POST" => client.post(&url),
        "PUT" => client.put(&url),
        "PATCH" => client.patch(&url),
        "DELETE" => client.delete(&url),
        _ => client.get(&url),
    };

    if !api_token.is_empty() {
        req = req.header("Authorization", format!("Bearer {}", api_token));
    }

    if let Some(ref p) = params {
        req = req.query(p);
    }

    if let Some(ref b) = body {
        req = req.json(b);
    }

    let resp = req.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
    let status = resp.status();
    let payload: Value = resp.json().await.unwrap_or(Value::Null);

    // Colorize the response JSON for better readability in the terminal
    let json_str = serde_json::to_string(&payload).unwrap_or_else(|_| format!("{:?}", payload));
    let response_str = Paint::new(json_str).rgb(100, 100, 100).to_string();
    log_output(format!("Response:\n{}", response_str));

    if !status.is_success() {
        let message = payload
            .get("message")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| {
                let short = value_to_short_string(&payload);
                if short.is_empty() {
                    format!("HTTP {}", status.as_u16())
                } else {
                    short
                }
            });
        return Err(ApiError::Api { status: status.as_u16(), message });
    }

    Ok(payload)
}

/// Configured handle to the inventory service; owns the reqwest client.
#[derive(Clone)]
pub struct InventoryClient {
    pub client: reqwest::Client,
    pub api_base_url: String,
    pub api_token: String,
}

impl InventoryClient {
    pub fn new(api_base_url: impl Into<String>, api_token: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("Fleet/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(InventoryClient {
            client,
            api_base_url: api_base_url.into(),
            api_token: api_token.into(),
        })
    }

    pub fn from_env() -> Result<Self, ApiError> {
        InventoryClient::new(
            crate::config::get_inventory_api_url(),
            crate::config::get_inventory_api_token(),
        )
    }

    pub(crate) async fn call(
        &self,
        method: &str,
        endpoint: &str,
        body: Option<Value>,
        params: Option<Vec<(String, String)>>,
    ) -> Result<Value, ApiError> {
        api_call(&self.client, &self.api_base_url, &self.api_token, method, endpoint, body, params)
            .await
    }
}
