//! Assessment input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    pregnancy_field, AssessmentRequest, FieldBounds, Gender, AGE_BOUNDS, BLOOD_PRESSURE_BOUNDS,
    GLUCOSE_BOUNDS, HEIGHT_BOUNDS, PREGNANCIES_BOUNDS, WEIGHT_BOUNDS,
};
use crate::tui::styles::MedicalTheme;

/// Longest name accepted by the text field.
const MAX_NAME_LEN: usize = 64;

/// Form fields in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    Name,
    Gender,
    Pregnancies,
    Age,
    Glucose,
    BloodPressure,
    Height,
    Weight,
}

/// How a field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Select,
    /// Integer input, typed or stepped
    Stepper,
    /// Integer range, stepped only
    Slider,
    /// Decimal input, typed or stepped
    Number,
}

impl FieldId {
    pub const ALL: [FieldId; 8] = [
        FieldId::Name,
        FieldId::Gender,
        FieldId::Pregnancies,
        FieldId::Age,
        FieldId::Glucose,
        FieldId::BloodPressure,
        FieldId::Height,
        FieldId::Weight,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Gender => "Gender",
            Self::Pregnancies => "Number of Pregnancies",
            Self::Age => "Age",
            Self::Glucose => "Glucose Level (mg/dL)",
            Self::BloodPressure => "Blood Pressure (systolic)",
            Self::Height => "Height (in meters)",
            Self::Weight => "Weight (in kilograms)",
        }
    }

    #[must_use]
    pub fn help(self) -> &'static str {
        match self {
            Self::Name => "Please enter your name.",
            Self::Gender => "Used to determine whether to prompt pregnancy input.",
            Self::Pregnancies => "Enter how many times you have been pregnant.",
            Self::Age => "Enter your age in years.",
            Self::Glucose => "Normal fasting glucose is around 70-100 mg/dL.",
            Self::BloodPressure => {
                "Normal blood pressure is usually around 120/80 mmHg. Enter the systolic (top) value."
            }
            Self::Height => "E.g., 1.75",
            Self::Weight => "E.g., 70.5",
        }
    }

    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Name => FieldKind::Text,
            Self::Gender => FieldKind::Select,
            Self::Pregnancies | Self::Age => FieldKind::Stepper,
            Self::Glucose | Self::BloodPressure => FieldKind::Slider,
            Self::Height | Self::Weight => FieldKind::Number,
        }
    }
}

/// Bounded numeric input with an optional in-progress text buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberInput {
    bounds: FieldBounds,
    decimals: usize,
    value: f64,
    buffer: Option<String>,
}

impl NumberInput {
    #[must_use]
    pub fn new(bounds: FieldBounds, decimals: usize) -> Self {
        Self {
            bounds,
            decimals,
            value: bounds.initial,
            buffer: None,
        }
    }

    /// Committed value (ignores an uncommitted buffer).
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn bounds(&self) -> FieldBounds {
        self.bounds
    }

    fn round(&self, v: f64) -> f64 {
        let factor = 10f64.powi(self.decimals as i32);
        (v * factor).round() / factor
    }

    /// Set a value, clamped into bounds.
    pub fn set(&mut self, v: f64) {
        self.buffer = None;
        self.value = self.bounds.clamp(self.round(v));
    }

    /// Move by `times` steps.
    pub fn step(&mut self, times: i32) {
        self.commit();
        self.set(self.value + self.bounds.step * f64::from(times));
    }

    /// Apply the typed buffer. Unparseable text reverts to the previous value.
    pub fn commit(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            match buffer.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => self.set(v),
                _ => {}
            }
        }
    }

    /// Returns true if the character was accepted.
    pub fn input_char(&mut self, c: char) -> bool {
        let typed = self.buffer.as_deref().unwrap_or("");
        let accept = c.is_ascii_digit() || (c == '.' && self.decimals > 0 && !typed.contains('.'));
        if !accept || typed.len() >= 8 {
            return false;
        }
        self.buffer.get_or_insert_with(String::new).push(c);
        true
    }

    pub fn delete_char(&mut self) {
        let display = self.display();
        let buffer = self.buffer.get_or_insert(display);
        buffer.pop();
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.buffer.is_some()
    }

    /// Text shown in the field.
    #[must_use]
    pub fn display(&self) -> String {
        match &self.buffer {
            Some(buffer) => buffer.clone(),
            None => format!("{:.*}", self.decimals, self.value),
        }
    }

    /// Position of the value within its bounds, 0.0 to 1.0.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        let span = self.bounds.max - self.bounds.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.value - self.bounds.min) / span).clamp(0.0, 1.0)
    }
}

/// Assessment form state
pub struct AssessmentFormState {
    pub name: String,
    pub gender: Gender,
    pub pregnancies: NumberInput,
    pub age: NumberInput,
    pub glucose: NumberInput,
    pub blood_pressure: NumberInput,
    pub height: NumberInput,
    pub weight: NumberInput,
    pub focus: FieldId,
}

impl Default for AssessmentFormState {
    fn default() -> Self {
        Self {
            name: String::new(),
            gender: Gender::default(),
            pregnancies: NumberInput::new(PREGNANCIES_BOUNDS, 0),
            age: NumberInput::new(AGE_BOUNDS, 0),
            glucose: NumberInput::new(GLUCOSE_BOUNDS, 0),
            blood_pressure: NumberInput::new(BLOOD_PRESSURE_BOUNDS, 0),
            height: NumberInput::new(HEIGHT_BOUNDS, 2),
            weight: NumberInput::new(WEIGHT_BOUNDS, 1),
            focus: FieldId::Name,
        }
    }
}

impl AssessmentFormState {
    /// Fields currently shown, in order. Pregnancies depends on gender.
    #[must_use]
    pub fn visible_fields(&self) -> Vec<FieldId> {
        let show_pregnancies = pregnancy_field(self.gender).visible;
        FieldId::ALL
            .into_iter()
            .filter(|id| *id != FieldId::Pregnancies || show_pregnancies)
            .collect()
    }

    fn number_mut(&mut self, id: FieldId) -> Option<&mut NumberInput> {
        match id {
            FieldId::Pregnancies => Some(&mut self.pregnancies),
            FieldId::Age => Some(&mut self.age),
            FieldId::Glucose => Some(&mut self.glucose),
            FieldId::BloodPressure => Some(&mut self.blood_pressure),
            FieldId::Height => Some(&mut self.height),
            FieldId::Weight => Some(&mut self.weight),
            FieldId::Name | FieldId::Gender => None,
        }
    }

    #[must_use]
    pub fn number(&self, id: FieldId) -> Option<&NumberInput> {
        match id {
            FieldId::Pregnancies => Some(&self.pregnancies),
            FieldId::Age => Some(&self.age),
            FieldId::Glucose => Some(&self.glucose),
            FieldId::BloodPressure => Some(&self.blood_pressure),
            FieldId::Height => Some(&self.height),
            FieldId::Weight => Some(&self.weight),
            FieldId::Name | FieldId::Gender => None,
        }
    }

    fn focus_index(&self, fields: &[FieldId]) -> usize {
        fields.iter().position(|id| *id == self.focus).unwrap_or(0)
    }

    fn commit_focused(&mut self) {
        let focus = self.focus;
        if let Some(input) = self.number_mut(focus) {
            input.commit();
        }
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.commit_focused();
        let fields = self.visible_fields();
        let i = self.focus_index(&fields);
        self.focus = fields[(i + 1) % fields.len()];
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        self.commit_focused();
        let fields = self.visible_fields();
        let i = self.focus_index(&fields);
        self.focus = fields[(i + fields.len() - 1) % fields.len()];
    }

    /// Type a character into the focused field. Returns true if the form changed.
    pub fn input_char(&mut self, c: char) -> bool {
        match self.focus.kind() {
            FieldKind::Text => {
                if c.is_control() || self.name.chars().count() >= MAX_NAME_LEN {
                    return false;
                }
                self.name.push(c);
                true
            }
            FieldKind::Stepper | FieldKind::Number => {
                let focus = self.focus;
                self.number_mut(focus)
                    .map(|input| input.input_char(c))
                    .unwrap_or(false)
            }
            FieldKind::Select | FieldKind::Slider => false,
        }
    }

    /// Delete the last character of the focused field.
    pub fn delete_char(&mut self) -> bool {
        match self.focus.kind() {
            FieldKind::Text => self.name.pop().is_some(),
            FieldKind::Stepper | FieldKind::Number => {
                let focus = self.focus;
                if let Some(input) = self.number_mut(focus) {
                    input.delete_char();
                }
                true
            }
            FieldKind::Select | FieldKind::Slider => false,
        }
    }

    /// Step the focused field by `times` (toggles the gender select).
    pub fn adjust(&mut self, times: i32) -> bool {
        if times == 0 {
            return false;
        }
        match self.focus {
            FieldId::Name => false,
            FieldId::Gender => {
                self.gender = self.gender.toggled();
                true
            }
            focus => {
                if let Some(input) = self.number_mut(focus) {
                    input.step(times);
                }
                true
            }
        }
    }

    /// Build a request from the current widget values.
    ///
    /// Pending typed text is committed first. A hidden pregnancies field
    /// contributes its default value, never the stored one.
    pub fn to_request(&mut self) -> AssessmentRequest {
        for id in FieldId::ALL {
            if let Some(input) = self.number_mut(id) {
                input.commit();
            }
        }

        let field = pregnancy_field(self.gender);
        let pregnancies = if field.visible {
            as_count(self.pregnancies.value())
        } else {
            field.default_value
        };

        AssessmentRequest {
            name: self.name.clone(),
            gender: self.gender,
            pregnancies,
            age: as_count(self.age.value()),
            glucose: as_count(self.glucose.value()),
            blood_pressure: as_count(self.blood_pressure.value()),
            height: self.height.value(),
            weight: self.weight.value(),
        }
    }

    /// Wipe the name buffer from memory.
    pub fn clear_sensitive(&mut self) {
        self.name.zeroize();
    }

    /// Restore every widget to its initial value.
    pub fn reset(&mut self) {
        self.clear_sensitive();
        *self = Self::default();
    }
}

fn as_count(v: f64) -> u32 {
    v.round().max(0.0) as u32
}

/// Render the assessment form
pub fn render_form(f: &mut Frame, area: Rect, state: &AssessmentFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Fields
            Constraint::Length(1), // Help for the focused field
        ])
        .split(area);

    render_form_fields(f, chunks[0], state);

    let help = Paragraph::new(Line::from(vec![
        Span::styled(" ? ", MedicalTheme::key_hint()),
        Span::styled(state.focus.help(), MedicalTheme::text_muted()),
    ]));
    f.render_widget(help, chunks[1]);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &AssessmentFormState) {
    let fields = state.visible_fields();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let mid = (fields.len() + 1) / 2;
    render_field_column(f, columns[0], &fields[..mid], state);
    render_field_column(f, columns[1], &fields[mid..], state);
}

fn render_field_column(f: &mut Frame, area: Rect, fields: &[FieldId], state: &AssessmentFormState) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, id) in fields.iter().enumerate() {
        render_field(f, chunks[i], *id, state);
    }
}

fn render_field(f: &mut Frame, area: Rect, id: FieldId, state: &AssessmentFormState) {
    let focused = state.focus == id;
    let (border_style, title_style) = if focused {
        (MedicalTheme::border_focused(), MedicalTheme::focused())
    } else {
        (MedicalTheme::border(), MedicalTheme::text_secondary())
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ", id.label()), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    let cursor = if focused {
        Span::styled("▌", MedicalTheme::cursor())
    } else {
        Span::raw("")
    };

    match id.kind() {
        FieldKind::Text => {
            let value = if state.name.is_empty() {
                Span::styled("enter your name", MedicalTheme::text_muted())
            } else {
                Span::styled(state.name.as_str(), MedicalTheme::text())
            };
            let content = Paragraph::new(Line::from(vec![Span::raw(" "), value, cursor]));
            f.render_widget(content.block(block), area);
        }
        FieldKind::Select => {
            let content = Paragraph::new(Line::from(vec![
                Span::styled(" ◀ ", MedicalTheme::key_hint()),
                Span::styled(state.gender.to_string(), MedicalTheme::text()),
                Span::styled(" ▶", MedicalTheme::key_hint()),
            ]));
            f.render_widget(content.block(block), area);
        }
        FieldKind::Slider => {
            let Some(input) = state.number(id) else {
                return;
            };
            let gauge = Gauge::default()
                .block(block)
                .gauge_style(MedicalTheme::slider(focused))
                .ratio(input.ratio())
                .label(format!(
                    "{} ({}-{})",
                    input.display(),
                    input.bounds().min,
                    input.bounds().max
                ));
            f.render_widget(gauge, area);
        }
        FieldKind::Stepper | FieldKind::Number => {
            let Some(input) = state.number(id) else {
                return;
            };
            let value_style = if input.is_editing() {
                MedicalTheme::focused()
            } else {
                MedicalTheme::text()
            };
            let content = Paragraph::new(Line::from(vec![
                Span::styled(" − ", MedicalTheme::key_hint()),
                Span::styled(input.display(), value_style),
                cursor,
                Span::styled(" + ", MedicalTheme::key_hint()),
            ]));
            f.render_widget(content.block(block), area);
        }
    }
}
