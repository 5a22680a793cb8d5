//! Main TUI application state machine.
//!
//! Handles:
//! - Input event handling for the single-page form
//! - Submission and the result panel state
//! - Service integration

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use zeroize::Zeroize;

use crate::adapters::model::{LoadOptions, LogisticModel};
use crate::application::AssessmentService;
use crate::config::AppConfig;
use crate::ports::RiskClassifier;

use super::ui::{
    form::{render_form, AssessmentFormState},
    render_disclaimer, render_header, render_key_hints,
    result::{render_result, SubmissionState},
};

/// Large step for PageUp/PageDown.
const PAGE_STEP: i32 = 10;

/// Main application state
pub struct App<C: RiskClassifier> {
    /// Whether the app should quit
    should_quit: bool,

    service: AssessmentService<C>,

    form: AssessmentFormState,

    /// Outcome of the last submission, cleared by any edit
    submission: SubmissionState,
}

impl App<LogisticModel> {
    /// Create the application with the configured model.
    ///
    /// # Errors
    /// Returns error if the model cannot be found, loaded or verified.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let model_path = config.model_path.as_path();

        if !model_path.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set {} to a directory containing diabetes_model.json or to the file itself.",
                model_path,
                crate::config::MODEL_PATH_ENV
            ));
        }

        // Refuse to start without a usable model.
        let options = LoadOptions {
            require_manifest: config.require_manifest,
        };
        let model = LogisticModel::load(model_path, options)
            .map_err(|e| anyhow!("Failed to load model from {:?}: {}", model_path, e))?;

        Ok(Self::with_service(AssessmentService::new(Arc::new(model))))
    }
}

impl<C: RiskClassifier> App<C> {
    /// Create application with an injected service.
    pub fn with_service(service: AssessmentService<C>) -> Self {
        Self {
            should_quit: false,
            service,
            form: AssessmentFormState::default(),
            submission: SubmissionState::default(),
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        self.form.clear_sensitive();

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Min(0),
                        Constraint::Length(7),
                        Constraint::Length(1),
                        Constraint::Length(3),
                    ])
                    .split(f.area());

                render_header(f, chunks[0]);
                render_form(f, chunks[1], &self.form);
                render_result(f, chunks[2], &self.submission);
                render_key_hints(f, chunks[3]);
                render_disclaimer(f, chunks[4]);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Apply one key press to the form.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('q') | KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('r') => {
                    self.form.reset();
                    self.submission = SubmissionState::AwaitingInput;
                }
                _ => {}
            }
            return;
        }

        let changed = match key {
            KeyCode::Up | KeyCode::BackTab => {
                self.form.prev_field();
                false
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form.next_field();
                false
            }
            KeyCode::Left => self.form.adjust(-1),
            KeyCode::Right => self.form.adjust(1),
            KeyCode::PageDown => self.form.adjust(-PAGE_STEP),
            KeyCode::PageUp => self.form.adjust(PAGE_STEP),
            KeyCode::Char(c) => self.form.input_char(c),
            KeyCode::Backspace => self.form.delete_char(),
            KeyCode::Enter => {
                self.submit();
                false
            }
            KeyCode::Esc => {
                self.submission = SubmissionState::AwaitingInput;
                false
            }
            _ => false,
        };

        if changed {
            self.submission = SubmissionState::AwaitingInput;
        }
    }

    fn submit(&mut self) {
        let mut request = self.form.to_request();
        self.submission = self.service.assess_risk(&request).into();
        request.name.zeroize();
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    #[must_use]
    pub fn form(&self) -> &AssessmentFormState {
        &self.form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureVector, RiskLabel, ValidationError};
    use crate::tui::ui::form::FieldId;

    struct FixedClassifier(RiskLabel);

    impl RiskClassifier for FixedClassifier {
        fn predict(&self, _features: &FeatureVector) -> RiskLabel {
            self.0
        }
    }

    fn app(label: RiskLabel) -> App<FixedClassifier> {
        App::with_service(AssessmentService::new(Arc::new(FixedClassifier(label))))
    }

    fn type_text<C: RiskClassifier>(app: &mut App<C>, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_submit_shows_result() {
        let mut app = app(RiskLabel::Elevated);
        type_text(&mut app, "Alex");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        match app.submission() {
            SubmissionState::ResultDisplayed(assessment) => {
                assert_eq!(assessment.greeting(), "Hi Alex, here is your result:");
                assert_eq!(
                    assessment.message(),
                    "Based on the input, you are likely to have diabetes."
                );
            }
            other => panic!("expected a result, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_name_shows_warning() {
        let mut app = app(RiskLabel::Low);
        type_text(&mut app, "   ");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(
            app.submission(),
            &SubmissionState::ValidationFailed(ValidationError::EmptyName)
        );
    }

    #[test]
    fn test_edit_clears_result() {
        let mut app = app(RiskLabel::Low);
        type_text(&mut app, "Alex");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert!(matches!(
            app.submission(),
            SubmissionState::ResultDisplayed(_)
        ));

        // Navigation alone keeps the result
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(app.form().focus, FieldId::Gender);
        assert!(matches!(
            app.submission(),
            SubmissionState::ResultDisplayed(_)
        ));

        app.handle_key(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(app.submission(), &SubmissionState::AwaitingInput);
    }

    #[test]
    fn test_escape_clears_result() {
        let mut app = app(RiskLabel::Low);
        type_text(&mut app, "Alex");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);

        assert_eq!(app.submission(), &SubmissionState::AwaitingInput);
        assert_eq!(app.form().name, "Alex");
    }

    #[test]
    fn test_ctrl_r_resets_form() {
        let mut app = app(RiskLabel::Low);
        type_text(&mut app, "Alex");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('r'), KeyModifiers::CONTROL);

        assert!(app.form().name.is_empty());
        assert_eq!(app.form().focus, FieldId::Name);
        assert_eq!(app.submission(), &SubmissionState::AwaitingInput);
    }

    #[test]
    fn test_ctrl_q_quits() {
        let mut app = app(RiskLabel::Low);
        app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!app.should_quit());
        assert_eq!(app.form().name, "q");

        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit());
    }

    #[test]
    fn test_missing_model_path_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            model_path: dir.path().join("absent"),
            ..AppConfig::default()
        };
        assert!(App::new(&config).is_err());
    }
}
