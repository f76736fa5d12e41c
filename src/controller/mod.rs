//! Client controller: input validation, the classification call, and what
//! the view shows while it happens.
//!
//! The controller owns the input text, the [`UiState`] machine and the API
//! status indicator. Rendering goes through an injected [`View`]; the
//! backend through an injected [`ClassificationApi`]. At most one analysis
//! is in flight: a submit while [`UiState::Analyzing`] is a no-op.

pub mod state;
pub mod terminal;
pub mod view;

use tracing::{debug, error, info, warn};

use crate::api::{AnalysisRequest, AnalysisResult, ApiError, ClassificationApi, MIN_TEXT_CHARS};
pub use state::{Event, UiState};
pub use terminal::TerminalView;
pub use view::{ApiStatus, ButtonLabel, CharCount, RenderedResult, SubmitButton, View};

/// Shown when analysis is requested for text below the minimum length.
pub const TOO_SHORT_MESSAGE: &str = "Please enter at least 10 characters of text to analyze.";

/// Message for a `/detect` call that never reached the server.
pub fn connection_failed_message(base_url: &str) -> String {
    format!(
        "Unable to connect to the API server. Please ensure the server is running on {base_url}"
    )
}

pub struct Controller<A, V> {
    api: A,
    view: V,
    input: String,
    state: UiState,
    api_status: ApiStatus,
}

impl<A: ClassificationApi, V: View> Controller<A, V> {
    /// Bind a controller to its collaborators and render the empty input.
    pub fn new(api: A, view: V) -> Self {
        let mut controller = Self {
            api,
            view,
            input: String::new(),
            state: UiState::Idle,
            api_status: ApiStatus::Checking,
        };
        controller.view.set_api_status(ApiStatus::Checking);
        controller.update_character_count();
        controller.validate_input();
        controller
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn is_analyzing(&self) -> bool {
        self.state.is_analyzing()
    }

    pub fn api_status(&self) -> ApiStatus {
        self.api_status
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Replace the input text, as on every keystroke.
    ///
    /// Validation only gates submit eligibility; it never touches the
    /// analysis state.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.update_character_count();
        self.validate_input();
    }

    /// Refresh the character count display.
    pub fn update_character_count(&mut self) {
        self.view.update_char_count(&CharCount::of(&self.input));
    }

    /// Refresh the submit control; returns whether submit is enabled.
    pub fn validate_input(&mut self) -> bool {
        let trimmed_len = self.input.trim().chars().count();
        let valid = trimmed_len >= MIN_TEXT_CHARS;
        let analyzing = self.is_analyzing();

        let label = if !valid && trimmed_len > 0 {
            ButtonLabel::TooShort
        } else if analyzing {
            ButtonLabel::Analyzing
        } else {
            ButtonLabel::Ready
        };

        let button = SubmitButton {
            enabled: valid && !analyzing,
            label,
            busy: analyzing,
        };
        self.view.set_submit(&button);
        button.enabled
    }

    // -----------------------------------------------------------------------
    // API
    // -----------------------------------------------------------------------

    /// Probe `GET /health` and update the status indicator.
    ///
    /// Failures only change the indicator; they are logged, never shown as
    /// an error.
    pub fn check_api_health(&mut self) -> ApiStatus {
        let status = match self.api.health() {
            Ok(()) => ApiStatus::Online,
            Err(ApiError::Transport(reason)) => {
                warn!(%reason, "API health check failed");
                ApiStatus::Offline
            }
            Err(e) => {
                warn!(error = %e, "API health check returned an error");
                ApiStatus::ServerError
            }
        };
        self.set_api_status(status);
        status
    }

    /// Run one analysis of the current input.
    ///
    /// A no-op while another analysis is in flight. Always leaves the
    /// controller in `Success` or `Error`.
    pub fn analyze_news(&mut self) {
        let Some(request) = self.start_analysis() else {
            return;
        };
        let outcome = self.api.detect(&request);
        self.finish_analysis(outcome);
    }

    /// Re-run the analysis with the current input.
    pub fn retry(&mut self) {
        self.analyze_news();
    }

    /// Enter `Analyzing` and return the request to send.
    ///
    /// Returns `None` when an analysis is already in flight, or when the
    /// input is too short (the view then shows the guard error).
    pub fn start_analysis(&mut self) -> Option<AnalysisRequest> {
        if self.is_analyzing() {
            debug!("analysis already in flight, ignoring submit");
            return None;
        }

        let Some(request) = AnalysisRequest::from_input(&self.input) else {
            self.show_error(TOO_SHORT_MESSAGE);
            return None;
        };

        self.apply(Event::Submit)?;
        self.view.show_loading();
        self.validate_input();
        info!(chars = request.text.chars().count(), "analysis started");
        Some(request)
    }

    /// Settle an in-flight analysis with the API outcome.
    pub fn finish_analysis(&mut self, outcome: Result<AnalysisResult, ApiError>) {
        if !self.is_analyzing() {
            debug!("no analysis in flight, dropping outcome");
            return;
        }

        match outcome {
            Ok(result) => {
                info!(prediction = %result.prediction, confidence = result.confidence, "analysis finished");
                self.display_results(result);
                self.set_api_status(ApiStatus::Online);
            }
            Err(err) => {
                error!(error = %err, "analysis failed");
                let message = match &err {
                    ApiError::Transport(_) => {
                        self.set_api_status(ApiStatus::ConnectionFailed);
                        connection_failed_message(self.api.base_url())
                    }
                    ApiError::Status { message, .. } => message.clone(),
                    ApiError::InvalidResponse(_) => err.to_string(),
                };
                self.show_error(&message);
            }
        }

        self.validate_input();
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Settle into `Success` and render the result panel.
    ///
    /// Ignored unless an analysis is in flight.
    pub fn display_results(&mut self, result: AnalysisResult) {
        let rendered = RenderedResult::new(&result, self.input.chars().count());
        if self.apply(Event::Succeeded(result)).is_some() {
            self.view.show_result(&rendered);
        }
    }

    /// Settle into `Error` and show `message` verbatim.
    pub fn show_error(&mut self, message: &str) {
        if self.apply(Event::Failed(message.to_string())).is_some() {
            self.view.show_error(message);
        }
    }

    fn set_api_status(&mut self, status: ApiStatus) {
        self.api_status = status;
        self.view.set_api_status(status);
    }

    fn apply(&mut self, event: Event) -> Option<()> {
        let next = self.state.transition(event)?;
        self.state = next;
        Some(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
