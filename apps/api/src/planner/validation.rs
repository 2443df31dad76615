//! Form validation: turns raw, untyped form fields into a `StudyPlanRequest`.
//!
//! Every rule is checked; violations are aggregated, never short-circuited.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use crate::planner::models::{StudyMethod, StudyPlanRequest};

/// Sessions per week offered by the frequency select.
pub const FREQUENCY_RANGE: RangeInclusive<u32> = 1..=7;
/// Minutes per session offered by the duration select.
pub const DURATION_OPTIONS: [u32; 4] = [30, 60, 90, 120];

/// Raw form submission. Every field is optional and accepts any JSON type, so
/// missing or mistyped fields surface as validation errors rather than
/// extractor rejections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanForm {
    pub subject: Option<FormField<String>>,
    pub deadline: Option<FormField<String>>,
    pub sections: Option<FormField<Vec<String>>>,
    pub study_methods: Option<FormField<Vec<String>>>,
    pub frequency: Option<FormNumber>,
    pub duration: Option<FormNumber>,
    pub define: Option<FormField<String>>,
    pub user_id: Option<FormField<String>>,
}

/// A submitted field: the expected shape, or whatever arrived instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FormField<T> {
    Expected(T),
    Unexpected(Value),
}

impl<T> FormField<T> {
    pub fn expected(&self) -> Option<&T> {
        match self {
            FormField::Expected(value) => Some(value),
            FormField::Unexpected(_) => None,
        }
    }
}

impl<T> From<T> for FormField<T> {
    fn from(value: T) -> Self {
        FormField::Expected(value)
    }
}

impl From<&str> for FormField<String> {
    fn from(value: &str) -> Self {
        FormField::Expected(value.to_string())
    }
}

/// Select values arrive as strings from HTML forms and as numbers from JSON clients.
/// Anything else (fractions, booleans, lists) is kept so it can be reported.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FormNumber {
    Number(i64),
    Text(String),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Invalid form data: {joined}")
    }
}

impl std::error::Error for ValidationErrors {}

/// Validates a raw form against `today`. Pure: no I/O, no clock.
pub fn validate_form(
    form: &StudyPlanForm,
    today: NaiveDate,
) -> Result<StudyPlanRequest, ValidationErrors> {
    let mut errors = ValidationErrors(Vec::new());

    let subject = match form.subject.as_ref() {
        Some(FormField::Unexpected(_)) => {
            errors.push("subject", "Subject must be text.");
            String::new()
        }
        field => {
            let subject = field.and_then(FormField::expected).map_or("", |s| s.trim());
            if subject.is_empty() {
                errors.push("subject", "Subject is required.");
            }
            subject.to_string()
        }
    };

    let deadline = match form.deadline.as_ref() {
        Some(FormField::Unexpected(_)) => {
            errors.push("deadline", "Deadline must be a valid date.");
            None
        }
        field => match field.and_then(FormField::expected).map(|s| s.trim()) {
            None | Some("") => {
                errors.push("deadline", "Deadline is required.");
                None
            }
            Some(raw) => match parse_deadline(raw) {
                Some(date) if date < today => {
                    errors.push("deadline", "Deadline cannot be in the past.");
                    None
                }
                Some(date) => Some(date),
                None => {
                    errors.push("deadline", "Deadline must be a valid date.");
                    None
                }
            },
        },
    };

    let sections = match list_field("sections", "Sections", form.sections.as_ref(), &mut errors) {
        Some(items) => {
            let sections: Vec<String> = items.iter().map(|s| s.trim().to_string()).collect();
            check_sections(&sections, &mut errors);
            sections
        }
        None => Vec::new(),
    };

    let mut study_methods = Vec::new();
    let raw_methods = list_field(
        "studyMethods",
        "Study methods",
        form.study_methods.as_ref(),
        &mut errors,
    );
    if matches!(raw_methods, Some(methods) if methods.is_empty()) {
        errors.push("studyMethods", "At least one study method is required.");
    }
    for (i, raw) in raw_methods.unwrap_or_default().iter().enumerate() {
        match StudyMethod::from_label(raw) {
            Some(method) if !study_methods.contains(&method) => study_methods.push(method),
            Some(_) => {}
            None => errors.push(
                format!("studyMethods.{i}"),
                format!("Unknown study method '{}'.", raw.trim()),
            ),
        }
    }

    let frequency = parse_positive("frequency", "Frequency", form.frequency.as_ref(), &mut errors);
    if let Some(f) = frequency {
        check_frequency(f, &mut errors);
    }

    let duration = parse_positive("duration", "Duration", form.duration.as_ref(), &mut errors);
    if let Some(d) = duration {
        check_duration(d, &mut errors);
    }

    let define = match form.define.as_ref() {
        Some(FormField::Unexpected(_)) => {
            errors.push("define", "Word to define must be text.");
            None
        }
        field => field
            .and_then(FormField::expected)
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(String::from),
    };

    match (deadline, frequency, duration) {
        (Some(deadline), Some(frequency), Some(duration)) if errors.is_empty() => {
            Ok(StudyPlanRequest {
                subject,
                deadline,
                sections,
                study_methods,
                frequency,
                duration,
                define,
            })
        }
        _ => Err(errors),
    }
}

/// Re-checks the structural invariants of a request echoed back by a client
/// for saving. The deadline is deliberately not re-checked against the clock.
pub fn check_persistable(request: &StudyPlanRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors(Vec::new());
    if request.subject.trim().is_empty() {
        errors.push("subject", "Subject is required.");
    }
    check_sections(&request.sections, &mut errors);
    if request.study_methods.is_empty() {
        errors.push("studyMethods", "At least one study method is required.");
    }
    check_frequency(request.frequency, &mut errors);
    check_duration(request.duration, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (what a date picker's
/// `toISOString()` sends), reduced to its calendar date.
pub fn parse_deadline(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// The submitted list, or `None` after recording a type error. Absent means empty.
fn list_field<'a>(
    field: &str,
    label: &str,
    value: Option<&'a FormField<Vec<String>>>,
    errors: &mut ValidationErrors,
) -> Option<&'a [String]> {
    match value {
        None => Some(&[]),
        Some(FormField::Expected(items)) => Some(items.as_slice()),
        Some(FormField::Unexpected(_)) => {
            errors.push(field, format!("{label} must be a list of text values."));
            None
        }
    }
}

fn check_sections(sections: &[String], errors: &mut ValidationErrors) {
    if sections.is_empty() {
        errors.push("sections", "At least one section is required.");
    }
    for (i, section) in sections.iter().enumerate() {
        if section.trim().is_empty() {
            errors.push(format!("sections.{i}"), "Section cannot be empty.");
        }
    }
}

fn check_frequency(frequency: u32, errors: &mut ValidationErrors) {
    if !FREQUENCY_RANGE.contains(&frequency) {
        errors.push(
            "frequency",
            format!(
                "Frequency must be between {} and {} sessions per week.",
                FREQUENCY_RANGE.start(),
                FREQUENCY_RANGE.end()
            ),
        );
    }
}

fn check_duration(duration: u32, errors: &mut ValidationErrors) {
    if !DURATION_OPTIONS.contains(&duration) {
        errors.push(
            "duration",
            "Duration must be one of 30, 60, 90, or 120 minutes.",
        );
    }
}

fn parse_positive(
    field: &str,
    label: &str,
    value: Option<&FormNumber>,
    errors: &mut ValidationErrors,
) -> Option<u32> {
    let parsed = match value {
        None => None,
        Some(FormNumber::Text(s)) if s.trim().is_empty() => None,
        Some(FormNumber::Text(s)) => Some(s.trim().parse::<u32>().ok()),
        Some(FormNumber::Number(n)) => Some(u32::try_from(*n).ok()),
        Some(FormNumber::Other(_)) => Some(None),
    };

    match parsed {
        None => {
            errors.push(field, format!("{label} is required."));
            None
        }
        Some(Some(n)) if n > 0 => Some(n),
        Some(_) => {
            errors.push(field, format!("{label} must be a positive whole number."));
            None
        }
    }
}
