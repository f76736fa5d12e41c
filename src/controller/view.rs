//! Rendering interface for the controller, plus the view-model values it
//! hands over. Formatting lives here so every view renders the same text.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use crate::api::{AnalysisResult, Prediction};

/// Below this many characters the count is shown as a warning.
pub const SHORT_TEXT_CHARS: usize = 50;
/// Above this many characters the count is shown as a danger.
pub const LONG_TEXT_CHARS: usize = 5000;

/// Sink for everything the controller shows.
///
/// `show_loading`, `show_result` and `show_error` each make the results
/// panel visible and replace whatever it showed before.
pub trait View {
    fn show_loading(&mut self);
    fn show_result(&mut self, result: &RenderedResult);
    fn show_error(&mut self, message: &str);
    fn update_char_count(&mut self, count: &CharCount);
    fn set_submit(&mut self, button: &SubmitButton);
    fn set_api_status(&mut self, status: ApiStatus);
}

// ---------------------------------------------------------------------------
// Character count
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountTier {
    Warning,
    Normal,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCount {
    pub count: usize,
    pub tier: CountTier,
}

impl CharCount {
    /// Count the untrimmed input.
    pub fn of(text: &str) -> Self {
        let count = text.chars().count();
        let tier = if count < SHORT_TEXT_CHARS {
            CountTier::Warning
        } else if count > LONG_TEXT_CHARS {
            CountTier::Danger
        } else {
            CountTier::Normal
        };
        Self { count, tier }
    }

    pub fn label(&self) -> String {
        if self.count == 1 {
            "1 character".to_string()
        } else {
            format!("{} characters", self.count)
        }
    }
}

// ---------------------------------------------------------------------------
// Submit control
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLabel {
    TooShort,
    Analyzing,
    Ready,
}

impl ButtonLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TooShort => "Text too short",
            Self::Analyzing => "Analyzing...",
            Self::Ready => "Analyze Article",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitButton {
    pub enabled: bool,
    pub label: ButtonLabel,
    /// An analysis is in flight (drives the busy icon).
    pub busy: bool,
}

// ---------------------------------------------------------------------------
// API status indicator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiStatus {
    #[default]
    Checking,
    Online,
    /// `/health` answered with a non-2xx status.
    ServerError,
    /// `/health` could not be reached.
    Offline,
    /// `/detect` could not be reached.
    ConnectionFailed,
}

impl ApiStatus {
    pub fn is_online(self) -> bool {
        self == Self::Online
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Checking => "Checking...",
            Self::Online => "Online",
            Self::ServerError => "Server Error",
            Self::Offline => "Offline",
            Self::ConnectionFailed => "Connection Failed",
        }
    }
}

// ---------------------------------------------------------------------------
// Result panel
// ---------------------------------------------------------------------------

/// Display-ready form of an [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResult {
    pub is_fake: bool,
    /// `🚨` for fake, `✅` for anything else.
    pub marker: &'static str,
    /// Label verbatim from the server.
    pub prediction: String,
    /// e.g. `87% confidence`.
    pub confidence: String,
    pub analysis: String,
    /// e.g. `120 characters`.
    pub length: String,
    pub timestamp: String,
}

impl RenderedResult {
    /// `local_len` is the input length used when the server reports none.
    pub fn new(result: &AnalysisResult, local_len: usize) -> Self {
        let is_fake = result.verdict() == Prediction::Fake;
        let length = result
            .text_length
            .filter(|&n| n > 0)
            .unwrap_or(local_len as u64);

        Self {
            is_fake,
            marker: if is_fake { "🚨" } else { "✅" },
            prediction: result.prediction.clone(),
            confidence: format!("{}% confidence", confidence_percent(result.confidence)),
            analysis: result.analysis.clone(),
            length: format!("{length} characters"),
            timestamp: format_timestamp(result.timestamp.as_deref()),
        }
    }
}

/// Confidence in `[0, 1]` as a whole percentage, rounding half up.
pub fn confidence_percent(confidence: f64) -> i64 {
    (confidence * 100.0).round() as i64
}

/// Server timestamp in local time, the raw string when it does not parse,
/// or `Just now` when absent.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "Just now".to_string();
    };

    parse_timestamp(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn result(prediction: &str, confidence: f64) -> AnalysisResult {
        AnalysisResult {
            prediction: prediction.to_string(),
            confidence,
            analysis: "Because reasons.".to_string(),
            text_length: Some(120),
            timestamp: None,
        }
    }

    #[test]
    fn char_count_tiers() {
        assert_eq!(CharCount::of("").tier, CountTier::Warning);
        assert_eq!(CharCount::of(&"a".repeat(49)).tier, CountTier::Warning);
        assert_eq!(CharCount::of(&"a".repeat(50)).tier, CountTier::Normal);
        assert_eq!(CharCount::of(&"a".repeat(5000)).tier, CountTier::Normal);
        assert_eq!(CharCount::of(&"a".repeat(5001)).tier, CountTier::Danger);
    }

    #[test]
    fn char_count_label_pluralizes() {
        assert_eq!(CharCount::of("").label(), "0 characters");
        assert_eq!(CharCount::of("x").label(), "1 character");
        assert_eq!(CharCount::of("  xy ").label(), "5 characters");
    }

    #[test]
    fn fake_prediction_renders_marker_and_percent() {
        let rendered = RenderedResult::new(&result("fake", 0.87), 3);
        assert!(rendered.is_fake);
        assert_eq!(rendered.marker, "🚨");
        assert_eq!(rendered.confidence, "87% confidence");
        assert_eq!(rendered.length, "120 characters");
        assert_eq!(rendered.analysis, "Because reasons.");
    }

    #[test]
    fn non_fake_predictions_share_the_other_marker() {
        for label in ["Real", "unsure"] {
            let rendered = RenderedResult::new(&result(label, 0.5), 3);
            assert!(!rendered.is_fake);
            assert_eq!(rendered.marker, "✅");
            assert_eq!(rendered.prediction, label);
        }
    }

    #[test]
    fn missing_server_length_uses_local_length() {
        let mut r = result("Real", 0.6);
        r.text_length = None;
        assert_eq!(RenderedResult::new(&r, 42).length, "42 characters");
        r.text_length = Some(0);
        assert_eq!(RenderedResult::new(&r, 42).length, "42 characters");
    }

    #[test]
    fn confidence_rounds_to_whole_percent() {
        assert_eq!(confidence_percent(0.874), 87);
        assert_eq!(confidence_percent(0.875), 88);
        assert_eq!(confidence_percent(0.0), 0);
        assert_eq!(confidence_percent(1.0), 100);
    }

    #[test]
    fn timestamp_absent_or_unparsable() {
        assert_eq!(format_timestamp(None), "Just now");
        assert_eq!(format_timestamp(Some("Thu Oct 16 yesterday")), "Thu Oct 16 yesterday");
    }

    #[test]
    fn timestamp_parses_rfc3339_into_local_time() {
        let expected = DateTime::parse_from_rfc3339("2026-10-16T09:30:00Z")
            .unwrap()
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        assert_eq!(format_timestamp(Some("2026-10-16T09:30:00Z")), expected);
    }

    #[test]
    fn timestamp_parses_naive_iso() {
        assert_eq!(
            format_timestamp(Some("2026-10-16T09:30:00.123")),
            "2026-10-16 09:30:00"
        );
    }

    #[test]
    fn api_status_labels() {
        assert!(ApiStatus::Online.is_online());
        assert!(!ApiStatus::ConnectionFailed.is_online());
        assert_eq!(ApiStatus::ServerError.label(), "Server Error");
        assert_eq!(ApiStatus::default(), ApiStatus::Checking);
    }
}
