//! Model output parsing with graceful degradation.
//!
//! A strict parse against the expected schema is attempted first. Anything the
//! schema rejects is handed back verbatim as `RawFallback`; only a blank
//! response is an error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::llm_client::{strip_json_fences, LlmError};

/// Outcome of parsing one model response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOutput<T> {
    Structured(T),
    RawFallback(String),
}

/// A schema that can carry unstructured text when strict parsing fails.
pub trait Degradable: DeserializeOwned {
    fn from_raw_text(raw: &str) -> Self;
}

impl<T: Degradable> ParsedOutput<T> {
    pub fn is_structured(&self) -> bool {
        matches!(self, ParsedOutput::Structured(_))
    }

    /// Collapses either variant into the schema's shape.
    pub fn into_value(self) -> T {
        match self {
            ParsedOutput::Structured(value) => value,
            ParsedOutput::RawFallback(raw) => T::from_raw_text(&raw),
        }
    }
}

/// Parses `raw` into `T`. Blank output is fatal; every other failure degrades.
pub fn parse_model_output<T: DeserializeOwned>(raw: &str) -> Result<ParsedOutput<T>, LlmError> {
    if raw.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }

    match serde_json::from_str::<T>(strip_json_fences(raw)) {
        Ok(value) => Ok(ParsedOutput::Structured(value)),
        Err(e) => {
            tracing::debug!("Model output did not match schema, using raw text: {e}");
            Ok(ParsedOutput::RawFallback(raw.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOutput {
    pub study_schedule: String,
}

impl Degradable for ScheduleOutput {
    fn from_raw_text(raw: &str) -> Self {
        Self {
            study_schedule: raw.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipsOutput {
    pub study_tips: String,
}

impl Degradable for TipsOutput {
    fn from_raw_text(raw: &str) -> Self {
        Self {
            study_tips: raw.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_schedule_parses() {
        let parsed: ParsedOutput<ScheduleOutput> =
            parse_model_output(r##"{"studySchedule": "# Week 1\n- Day 1"}"##).unwrap();
        assert!(parsed.is_structured());
        assert_eq!(parsed.into_value().study_schedule, "# Week 1\n- Day 1");
    }

    #[test]
    fn test_fenced_json_parses() {
        let raw = "```json\n{\"studyTips\": \"- Sleep well\"}\n```";
        let parsed: ParsedOutput<TipsOutput> = parse_model_output(raw).unwrap();
        assert_eq!(
            parsed,
            ParsedOutput::Structured(TipsOutput {
                study_tips: "- Sleep well".into()
            })
        );
    }

    #[test]
    fn test_plain_markdown_falls_back_verbatim() {
        let raw = "  ## Tips\n- Review daily\n";
        let parsed: ParsedOutput<TipsOutput> = parse_model_output(raw).unwrap();
        assert_eq!(parsed, ParsedOutput::RawFallback(raw.to_string()));
        assert_eq!(parsed.into_value().study_tips, raw);
    }

    #[test]
    fn test_wrong_schema_falls_back_verbatim() {
        let raw = r#"{"schedule": "wrong key"}"#;
        let parsed: ParsedOutput<ScheduleOutput> = parse_model_output(raw).unwrap();
        assert!(!parsed.is_structured());
        assert_eq!(parsed.into_value().study_schedule, raw);
    }

    #[test]
    fn test_blank_output_is_fatal() {
        let result = parse_model_output::<ScheduleOutput>(" \n\t ");
        assert!(matches!(result, Err(LlmError::EmptyContent)));
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let raw = r#"{"studySchedule": "Week 1: read chapter 1"}"#;
        let first: ParsedOutput<ScheduleOutput> = parse_model_output(raw).unwrap();
        let second: ParsedOutput<ScheduleOutput> = parse_model_output(raw).unwrap();
        assert_eq!(first, second);
    }
}
