//! Wire types for the classification API.
//!
//! Responses are untrusted input: the success payload is checked field by
//! field before anything is rendered. Checks:
//!
//! 1. **Object**: the body must be a JSON object.
//! 2. **Required fields**: `prediction` (string), `confidence` (number) and
//!    `analysis` (string) must be present with those types.
//! 3. **Optional fields**: `textLength` (non-negative integer) and
//!    `timestamp` (string) are kept when well-typed and dropped otherwise.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;

/// Minimum trimmed length (in characters) of text eligible for analysis.
pub const MIN_TEXT_CHARS: usize = 10;

/// Request body for `POST /detect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub text: String,
}

impl AnalysisRequest {
    /// Build a request from raw input, trimming surrounding whitespace.
    ///
    /// Returns `None` when the trimmed text is shorter than
    /// [`MIN_TEXT_CHARS`].
    pub fn from_input(raw: &str) -> Option<Self> {
        let text = raw.trim();
        (text.chars().count() >= MIN_TEXT_CHARS).then(|| Self {
            text: text.to_string(),
        })
    }
}

/// The classifier's verdict, compared case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    Real,
    Fake,
    Unknown,
}

impl Prediction {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "fake" => Self::Fake,
            "real" => Self::Real,
            _ => Self::Unknown,
        }
    }
}

/// A validated `POST /detect` success payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Label exactly as the server sent it (e.g. `"Fake"`).
    pub prediction: String,
    /// Score in `[0, 1]` as reported; not clamped.
    pub confidence: f64,
    pub analysis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl AnalysisResult {
    /// Validate an untrusted JSON body.
    pub fn from_value(value: &Value) -> Result<Self, ApiError> {
        let object = value
            .as_object()
            .ok_or_else(|| ApiError::InvalidResponse("body is not a JSON object".to_string()))?;

        let prediction = required(object.get("prediction"), "prediction", Value::as_str)?;
        let confidence = required(object.get("confidence"), "confidence", Value::as_f64)?;
        let analysis = required(object.get("analysis"), "analysis", Value::as_str)?;

        Ok(Self {
            prediction: prediction.to_string(),
            confidence,
            analysis: analysis.to_string(),
            text_length: object.get("textLength").and_then(Value::as_u64),
            timestamp: object
                .get("timestamp")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    pub fn verdict(&self) -> Prediction {
        Prediction::from_label(&self.prediction)
    }
}

fn required<'a, T>(
    field: Option<&'a Value>,
    name: &str,
    extract: impl Fn(&'a Value) -> Option<T>,
) -> Result<T, ApiError> {
    let value = field.ok_or_else(|| ApiError::InvalidResponse(format!("missing '{name}'")))?;
    extract(value).ok_or_else(|| ApiError::InvalidResponse(format!("'{name}' has the wrong type")))
}

/// User-facing message for a non-2xx response.
///
/// Uses the body's `error` field when it holds a usable value, otherwise
/// `Server returned <status>`. Strings are shown as-is; other non-empty
/// values (numbers, `true`, objects, arrays) as their JSON text. `null`,
/// `false`, `0` and `""` count as no message.
pub fn status_message(status: u16, body: Option<&str>) -> String {
    body.and_then(|b| serde_json::from_str::<Value>(b).ok())
        .and_then(|b| b.get("error").and_then(error_text))
        .unwrap_or_else(|| format!("Server returned {status}"))
}

fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
