//! Analysis state machine.
//!
//! ```text
//!   Idle ──Submit──▶ Analyzing ──Succeeded──▶ Success
//!                        │                       │
//!                        └──────Failed──▶ Error ◀┘ (Failed from a settled state)
//!   Success | Error ──Submit──▶ Analyzing
//! ```
//!
//! One tagged union replaces independent "loading", "error" and "result"
//! flags, so contradictory combinations cannot be represented.

use crate::api::AnalysisResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum UiState {
    #[default]
    Idle,
    /// Exactly one `POST /detect` is outstanding.
    Analyzing,
    Success(AnalysisResult),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The user asked for an analysis (submit, shortcut or retry).
    Submit,
    Succeeded(AnalysisResult),
    Failed(String),
}

impl UiState {
    /// Apply `event`, returning the next state, or `None` when the event is
    /// not accepted in the current state.
    pub fn transition(&self, event: Event) -> Option<UiState> {
        match (self, event) {
            (Self::Analyzing, Event::Submit) => None,
            (_, Event::Submit) => Some(Self::Analyzing),

            (Self::Analyzing, Event::Succeeded(result)) => Some(Self::Success(result)),
            (_, Event::Succeeded(_)) => None,

            // Failures settle from anywhere: the pre-submit guard reports an
            // error without ever entering Analyzing.
            (_, Event::Failed(message)) => Some(Self::Error(message)),
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self, Self::Analyzing)
    }
}
