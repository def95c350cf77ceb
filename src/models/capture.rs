//! Request/response types for the screenshot capture path.
//!
//! The capture path never surfaces failures as HTTP errors: every outcome,
//! success or failure, travels back to the presentation layer as a 200 with a
//! structured body, so the UI can render an inline message instead of
//! crashing. Only an unauthenticated caller gets a non-200 (401, from the
//! auth middleware), which the UI treats as a redirect to sign-in.

use serde::{Deserialize, Serialize};

/// Viewport preset forwarded to the capture gateway.
///
/// Closed enumeration; the gateway expects the lowercase names on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    Desktop,
    Mobile,
}

/// Request to capture a screenshot.
///
/// # Example
///
/// ```json
/// {
///   "url": "https://example.com",
///   "display": "desktop"
/// }
/// ```
///
/// The URL is only checked for presence. Callers are responsible for
/// prefixing a scheme if one is absent.
#[derive(Debug, Deserialize)]
pub struct CaptureRequest {
    pub url: String,

    #[serde(default = "default_display")]
    pub display: Display,
}

fn default_display() -> Display {
    Display::Desktop
}

/// Classification attached to a failed capture.
///
/// Not serialized; used for logging and for tests to assert which branch a
/// failure came from. The wire body carries only the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFailureKind {
    /// Missing required input (empty URL or empty key)
    Validation,

    /// No API key could be created for the caller
    Provisioning,

    /// The gateway reported an error (non-2xx response)
    Upstream,

    /// 2xx response whose body did not match the expected shape
    MalformedResponse,

    /// The round trip exceeded the configured deadline
    Timeout,

    /// Transport-level failure before any response arrived
    Network,
}

/// Outcome of one capture attempt.
///
/// Tagged result the handler pattern-matches; converted to [`CaptureResponse`]
/// at the wire boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// The gateway returned an image, base64-encoded
    Success { image_base64: String },

    /// Anything else, with a display-ready message
    Failure {
        kind: CaptureFailureKind,
        error: String,
    },
}

impl CaptureOutcome {
    pub fn failure(kind: CaptureFailureKind, error: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            error: error.into(),
        }
    }

    /// Failure returned when no API key could be provisioned for the caller.
    ///
    /// Distinct from input validation: the request was fine, but the capture
    /// cannot proceed without a key, and the user is pointed at the dashboard.
    pub fn provisioning_failed() -> Self {
        Self::failure(
            CaptureFailureKind::Provisioning,
            "Could not generate API key. Please visit dashboard.",
        )
    }
}

/// Wire form of a capture outcome.
///
/// # Examples
///
/// ```json
/// { "success": true, "image_base64": "iVBORw0..." }
/// ```
///
/// ```json
/// { "success": false, "error": "API Error: 500 - oops" }
/// ```
#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<CaptureOutcome> for CaptureResponse {
    fn from(outcome: CaptureOutcome) -> Self {
        match outcome {
            CaptureOutcome::Success { image_base64 } => Self {
                success: true,
                image_base64: Some(image_base64),
                error: None,
            },
            CaptureOutcome::Failure { error, .. } => Self {
                success: false,
                image_base64: None,
                error: Some(error),
            },
        }
    }
}

/// Expected shape of a 2xx gateway response when `json: true` is requested.
///
/// ```json
/// { "status": "success", "data": { "url": "...", "format": "png", "image_base64": "..." } }
/// ```
///
/// Fields are optional on purpose: the gateway does not always honor its own
/// contract, and a missing discriminator or payload is classified as
/// [`CaptureFailureKind::MalformedResponse`] rather than a deserialization
/// error.
#[derive(Debug, Deserialize)]
pub struct GatewaySuccessBody {
    pub status: Option<String>,
    pub data: Option<GatewayImageData>,
}

#[derive(Debug, Deserialize)]
pub struct GatewayImageData {
    pub url: Option<String>,
    pub format: Option<String>,
    pub image_base64: Option<String>,
}
