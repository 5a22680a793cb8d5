//! Result panel: shows the outcome of the last submission.

use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{Assessment, RiskLabel, ValidationError};
use crate::tui::styles::MedicalTheme;

/// Page state for one submission.
///
/// `AwaitingInput` is re-entered whenever a field is edited, so a result
/// never outlives the inputs that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    AwaitingInput,
    ValidationFailed(ValidationError),
    ResultDisplayed(Assessment),
}

impl From<Result<Assessment, ValidationError>> for SubmissionState {
    fn from(outcome: Result<Assessment, ValidationError>) -> Self {
        match outcome {
            Ok(assessment) => Self::ResultDisplayed(assessment),
            Err(e) => Self::ValidationFailed(e),
        }
    }
}

/// Render the result panel
pub fn render_result(f: &mut Frame, area: Rect, state: &SubmissionState) {
    match state {
        SubmissionState::AwaitingInput => render_idle(f, area),
        SubmissionState::ValidationFailed(e) => render_warning(f, area, e),
        SubmissionState::ResultDisplayed(assessment) => render_assessment(f, area, assessment),
    }
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", MedicalTheme::text_muted()),
            Span::styled("[Enter]", MedicalTheme::key_hint()),
            Span::styled(" to predict diabetes risk", MedicalTheme::text_muted()),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_warning(f: &mut Frame, area: Rect, error: &ValidationError) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("! ", MedicalTheme::warning()),
            Span::styled(error.to_string(), MedicalTheme::warning()),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(Span::styled(" Warning ", MedicalTheme::warning()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::warning()),
    );

    f.render_widget(content, area);
}

fn render_assessment(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let style = MedicalTheme::risk_label(assessment.label);
    let icon = match assessment.label {
        RiskLabel::Low => "OK",
        RiskLabel::Elevated => "!",
    };

    let content = Paragraph::new(vec![
        Line::from(Span::styled(assessment.greeting(), MedicalTheme::subtitle())),
        Line::from(""),
        Line::from(Span::styled(
            format!("{icon} {}", assessment.message()),
            style.add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("BMI: ", MedicalTheme::text_secondary()),
            Span::styled(format!("{:.2}", assessment.bmi()), MedicalTheme::text()),
            Span::styled(
                format!("  │  {}", assessment.assessed_at.format("%H:%M:%S UTC")),
                MedicalTheme::text_muted(),
            ),
        ]),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(format!(" {} ", assessment.label), style))
            .borders(Borders::ALL)
            .border_style(style),
    );

    f.render_widget(content, area);
}
