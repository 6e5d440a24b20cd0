//! EmailBison REST client
//!
//! Thin reqwest wrapper: bearer authentication, `{serverUrl}/api` base URL,
//! JSON in and out. No retries; the client timeout is the only deadline.

use super::transport::{ApiRequest, ApiTransport, HttpMethod};
use crate::config::BisonConfig;
use crate::error::{BisonError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client as HttpClient, Method};
use serde_json::Value;

pub struct EmailBisonClient {
    base_url: String,
    api_token: String,
    http_client: HttpClient,
}

impl EmailBisonClient {
    pub fn new(config: &BisonConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| BisonError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.api_base_url(),
            api_token: config.api_token.trim().to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credential test: `GET /users` must answer with a `data` member
    pub async fn verify_credentials(&self) -> Result<Value> {
        let body = match self.send(ApiRequest::get("/users")).await {
            Ok(body) => body,
            Err(BisonError::Upstream { status, message }) if status == 401 || status == 403 => {
                return Err(BisonError::Auth(format!(
                    "Invalid credentials or server URL. \
                     Please check your API token and server URL. ({})",
                    message
                )));
            }
            Err(e) => return Err(e),
        };

        if body.get("data").is_none() {
            return Err(BisonError::Auth(
                "Invalid credentials or server URL. Please check your API token and server URL."
                    .to_string(),
            ));
        }

        log::info!("EmailBison credentials verified against {}", self.base_url);
        Ok(body)
    }

    fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Pull a human readable message out of an error body
fn extract_error_message(text: &str) -> Option<String> {
    if let Ok(json) = serde_json::from_str::<Value>(text) {
        let candidates = [
            json.get("message"),
            json.get("data").and_then(|d| d.get("message")),
            json.get("error"),
        ];
        for candidate in candidates.into_iter().flatten() {
            if let Some(message) = candidate.as_str() {
                return Some(message.to_string());
            }
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(500).collect())
    }
}

/// EmailBison sometimes answers 200 with `{"data": {"success": false, "message": ...}}`
fn soft_failure_message(body: &Value) -> Option<String> {
    let data = body.get("data")?;
    if data.get("success").and_then(Value::as_bool) == Some(false) {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Request was not successful");
        return Some(message.to_string());
    }
    None
}

#[async_trait]
impl ApiTransport for EmailBisonClient {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let url = self.endpoint(&request.path);
        log::debug!("EmailBison {} {}", request.method, url);

        let mut builder = self
            .http_client
            .request(to_reqwest_method(request.method), &url)
            .bearer_auth(&self.api_token);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = extract_error_message(&text).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            });
            log::error!("EmailBison API error (status {}) for {}: {}", status, request, message);
            return Err(BisonError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let body: Value = serde_json::from_str(&text)?;

        if let Some(message) = soft_failure_message(&body) {
            log::error!("EmailBison rejected {}: {}", request, message);
            return Err(BisonError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}
