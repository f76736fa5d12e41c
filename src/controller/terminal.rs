use std::io::Write;

use colored::{ColoredString, Colorize};

use super::view::{ApiStatus, CharCount, CountTier, RenderedResult, SubmitButton, View};

/// [`View`] that prints to the terminal.
///
/// The results panel is printed as a block whenever it changes. Character
/// count and submit state are only printed in `verbose` mode (the
/// interactive session), where they stand in for the live input widgets.
pub struct TerminalView<W: Write> {
    out: W,
    verbose: bool,
    last_submit: Option<SubmitButton>,
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        Self::new(std::io::stdout(), verbose)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            last_submit: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Terminal write failures are not actionable from a view.
    fn line(&mut self, text: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{text}");
    }
}

impl<W: Write> View for TerminalView<W> {
    fn show_loading(&mut self) {
        self.line("⏳ Analyzing article...".dimmed());
    }

    fn show_result(&mut self, result: &RenderedResult) {
        let prediction = format!("{} {}", result.marker, result.prediction);
        let prediction = if result.is_fake {
            prediction.red().bold()
        } else {
            prediction.green().bold()
        };

        self.line("");
        self.line("Analysis Result".bold().cyan());
        self.line("=".repeat(40));
        self.line(format!("  {}  {}", prediction, result.confidence.bold()));
        self.line(format!("  {}", result.analysis));
        self.line("");
        self.line(format!(
            "  {} {}   {} {}",
            "Length:".dimmed(),
            result.length,
            "Analyzed:".dimmed(),
            result.timestamp
        ));
    }

    fn show_error(&mut self, message: &str) {
        self.line(format!("{} {}", "✗ Analysis failed:".red().bold(), message));
        if self.verbose {
            self.line("  Type :retry to try again.".dimmed());
        }
    }

    fn update_char_count(&mut self, count: &CharCount) {
        if !self.verbose {
            return;
        }
        let label = count.label();
        let styled: ColoredString = match count.tier {
            CountTier::Warning => label.yellow(),
            CountTier::Danger => label.red(),
            CountTier::Normal => label.dimmed(),
        };
        self.line(format!("  [{styled}]"));
    }

    fn set_submit(&mut self, button: &SubmitButton) {
        if !self.verbose || self.last_submit == Some(*button) {
            return;
        }
        self.last_submit = Some(*button);
        let icon = if button.busy { "⏳" } else { "🚀" };
        let label = if button.enabled {
            button.label.as_str().green()
        } else {
            button.label.as_str().dimmed()
        };
        self.line(format!("  {icon} {label}"));
    }

    fn set_api_status(&mut self, status: ApiStatus) {
        let dot = if status.is_online() {
            "●".green()
        } else if status == ApiStatus::Checking {
            "●".yellow()
        } else {
            "●".red()
        };
        self.line(format!("{} API {}", dot, status.label()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AnalysisResult;
    use crate::controller::view::ButtonLabel;

    fn rendered() -> RenderedResult {
        RenderedResult::new(
            &AnalysisResult {
                prediction: "Fake".to_string(),
                confidence: 0.87,
                analysis: "Sensational wording.".to_string(),
                text_length: Some(120),
                timestamp: None,
            },
            0,
        )
    }

    fn output(view: TerminalView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn result_block_contains_rendered_fields() {
        colored::control::set_override(false);
        let mut view = TerminalView::new(Vec::new(), false);
        view.show_result(&rendered());
        let text = output(view);
        assert!(text.contains("🚨 Fake"));
        assert!(text.contains("87% confidence"));
        assert!(text.contains("Sensational wording."));
        assert!(text.contains("120 characters"));
        assert!(text.contains("Just now"));
    }

    #[test]
    fn quiet_mode_hides_input_widgets() {
        let mut view = TerminalView::new(Vec::new(), false);
        view.update_char_count(&CharCount::of("hello"));
        view.set_submit(&SubmitButton {
            enabled: false,
            label: ButtonLabel::TooShort,
            busy: false,
        });
        assert!(output(view).is_empty());
    }

    #[test]
    fn verbose_mode_deduplicates_submit_state() {
        colored::control::set_override(false);
        let mut view = TerminalView::new(Vec::new(), true);
        let button = SubmitButton {
            enabled: true,
            label: ButtonLabel::Ready,
            busy: false,
        };
        view.set_submit(&button);
        view.set_submit(&button);
        let text = output(view);
        assert_eq!(text.matches("Analyze Article").count(), 1);
    }

    #[test]
    fn error_is_shown_verbatim() {
        colored::control::set_override(false);
        let mut view = TerminalView::new(Vec::new(), false);
        view.show_error("rate limited");
        assert!(output(view).contains("rate limited"));
    }
}
