//! HTTP transport
//!
//! [`Transport`] is the single seam between the client and the network.
//! [`HttpTransport`] sends requests with reqwest, attaching the bearer
//! token when one is stored and normalising every response to JSON.

use super::request::{ApiRequest, HttpMethod, PartValue, RequestBody};
use crate::credential::CredentialStore;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

const USER_AGENT: &str = concat!("gradedesk/", env!("CARGO_PKG_VERSION"));

/// Sends an [`ApiRequest`] and returns the parsed JSON body
///
/// Implementations never retry; one call is one attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
}

impl HttpTransport {
    /// Build a transport for `base_url`
    ///
    /// No client-side timeout is configured; failures come only from the
    /// connection itself or from the server's response.
    pub fn new(base_url: &str, credentials: Arc<CredentialStore>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_multipart(
        body: super::request::MultipartBody,
    ) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in body.parts().iter().cloned() {
            form = match value {
                PartValue::Text(text) => form.text(name, text),
                PartValue::File(file) => {
                    let part = reqwest::multipart::Part::bytes(file.bytes)
                        .file_name(file.file_name)
                        .mime_str(&file.mime)
                        .map_err(|e| Error::Transport(format!("invalid MIME type: {}", e)))?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(method = %request.method, url = %url, "Sending API request");

        let mut builder = match request.method {
            HttpMethod::Get => self.http_client.get(&url),
            HttpMethod::Post => self.http_client.post(&url),
        };

        if let Some(token) = self.credentials.token() {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(&value)?),
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Multipart(body) => builder.multipart(Self::build_multipart(body)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let body = parse_json_or_empty(&bytes);

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "API response received"
        );

        if status == reqwest::StatusCode::UNAUTHORIZED {
            let message = error_message(&body, status.as_u16());
            tracing::warn!(path = %request.path, "Credential rejected by server");
            return Err(Error::Unauthorized(message));
        }

        if !status.is_success() {
            let message = error_message(&body, status.as_u16());
            tracing::warn!(
                path = %request.path,
                status = status.as_u16(),
                "API request failed: {}",
                message
            );
            return Err(Error::Request {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

/// Parse a response body as JSON, falling back to an empty object
pub fn parse_json_or_empty(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// Message to show for a failed response
///
/// Resolution order: `detail` (strings verbatim, structured details as
/// JSON text), then `message`, then a generic fallback naming the status.
pub fn error_message(body: &Value, status: u16) -> String {
    match body.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => return detail.clone(),
        Some(Value::Null) | None => {}
        Some(Value::String(_)) => {}
        Some(other) => return other.to_string(),
    }

    if let Some(Value::String(message)) = body.get("message") {
        if !message.is_empty() {
            return message.clone();
        }
    }

    format!("Request failed: {}", status)
}
