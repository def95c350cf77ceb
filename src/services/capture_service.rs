//! Capture gateway client - the one outbound call to the screenshot service.
//!
//! This client performs exactly one round trip per capture: no retries, no
//! local state, no usage accounting (the gateway's own pipeline writes the
//! usage logs). Transient upstream failures come back as failure outcomes for
//! the caller to render.
//!
//! # Error bodies
//!
//! The gateway does not guarantee structured error bodies: a non-2xx response
//! is sometimes `{"status":"error","message":"..."}` and sometimes plain
//! text. Error parsing is therefore two-tier — try JSON, fall back to the raw
//! status and body — modeled as the tagged [`UpstreamError`] so callers
//! pattern-match instead of catching.

use crate::config::Config;
use crate::models::capture::{
    CaptureFailureKind, CaptureOutcome, Display, GatewaySuccessBody,
};
use serde_json::json;
use std::time::Duration;

/// A parsed non-2xx gateway response.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// Body parsed as JSON; `message` is present when the gateway supplied one
    Structured { status: u16, message: Option<String> },

    /// Body was not JSON; carried verbatim
    RawText { status: u16, body: String },
}

impl UpstreamError {
    /// Display-ready message, matching what the presentation layer shows.
    pub fn message(&self) -> String {
        match self {
            UpstreamError::Structured {
                message: Some(msg), ..
            } if !msg.is_empty() => msg.clone(),
            UpstreamError::Structured { status, .. } => format!("API Error: {}", status),
            UpstreamError::RawText { status, body } => {
                format!("API Error: {} - {}", status, body)
            }
        }
    }
}

/// Client for the external capture gateway.
///
/// Built once at startup and shared through application state; reqwest's
/// client is internally pooled and cheap to clone.
#[derive(Debug, Clone)]
pub struct CaptureClient {
    http: reqwest::Client,
    endpoint: String,
}

impl CaptureClient {
    /// Build the client from configuration.
    ///
    /// The round-trip deadline comes from `CAPTURE_TIMEOUT_SECS`; a capture
    /// that exceeds it surfaces as a [`CaptureFailureKind::Timeout`] failure.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.capture_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.capture_api_url.clone(),
        })
    }

    /// Client pointed at an arbitrary endpoint, for tests.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }

    /// Capture a screenshot of `url` with the given viewport preset.
    ///
    /// # Request
    ///
    /// One `POST` to the capture endpoint with the API key in `x-api-key` and
    /// fixed auxiliary parameters: viewport-only capture, JSON response, a
    /// 1000ms post-load settle delay.
    ///
    /// # Outcomes
    ///
    /// - empty key or URL: validation failure, no request is sent
    /// - 2xx with the expected body shape: success with the base64 image
    /// - 2xx with any other shape: "Invalid response format from API."
    /// - non-2xx: message extracted per [`UpstreamError`]
    /// - timeout / transport error: distinct failure classifications
    pub async fn capture(&self, api_key: &str, url: &str, display: Display) -> CaptureOutcome {
        if api_key.is_empty() {
            return CaptureOutcome::failure(CaptureFailureKind::Validation, "API Key is missing.");
        }
        if url.is_empty() {
            return CaptureOutcome::failure(CaptureFailureKind::Validation, "URL is required.");
        }

        let body = json!({
            "url": url,
            "display": display,
            "fullPage": false,
            "json": true,
            "delay": 1000,
        });

        let response = match self
            .http
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                tracing::warn!(url, "Capture request timed out");
                return CaptureOutcome::failure(
                    CaptureFailureKind::Timeout,
                    "Capture request timed out.",
                );
            }
            Err(e) => {
                tracing::error!(url, error = %e, "Capture request failed");
                return CaptureOutcome::failure(
                    CaptureFailureKind::Network,
                    "Could not reach capture service.",
                );
            }
        };

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();

        if !(200..300).contains(&status) {
            let upstream = parse_error_body(status, &text);
            tracing::warn!(url, status, "Capture gateway reported an error");
            return CaptureOutcome::failure(CaptureFailureKind::Upstream, upstream.message());
        }

        parse_success_body(&text)
    }
}

/// Parse a 2xx gateway body into an outcome.
///
/// The body must carry `status: "success"` and a non-empty
/// `data.image_base64`; any deviation is classified as a malformed response,
/// distinct from an upstream-reported error.
pub fn parse_success_body(body: &str) -> CaptureOutcome {
    let parsed: Result<GatewaySuccessBody, _> = serde_json::from_str(body);

    match parsed {
        Ok(GatewaySuccessBody {
            status: Some(status),
            data: Some(data),
        }) if status == "success" => match data.image_base64 {
            Some(image_base64) if !image_base64.is_empty() => {
                CaptureOutcome::Success { image_base64 }
            }
            _ => malformed(),
        },
        _ => malformed(),
    }
}

fn malformed() -> CaptureOutcome {
    CaptureOutcome::failure(
        CaptureFailureKind::MalformedResponse,
        "Invalid response format from API.",
    )
}

/// Parse a non-2xx gateway body.
///
/// Tries JSON first to extract a `message` field; anything unparseable is
/// kept verbatim alongside the status code.
pub fn parse_error_body(status: u16, body: &str) -> UpstreamError {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => UpstreamError::Structured {
            status,
            message: value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
        },
        Err(_) => UpstreamError::RawText {
            status,
            body: body.to_string(),
        },
    }
}
