// All LLM prompt templates for the plan generation flow.
// Reuses cross-cutting fragments from llm_client::prompts.

use chrono::{Datelike, NaiveDate};

use crate::dictionary::DefinedWord;
use crate::llm_client::prompts::{render_template, JSON_ONLY_INSTRUCTION, MARKDOWN_INSTRUCTION};
use crate::planner::models::StudyPlanRequest;

/// Schedule system prompt. Replace `{json_only}` before sending.
const SCHEDULE_SYSTEM_TEMPLATE: &str = "You are an AI study assistant that generates personalized \
    study schedules based on user inputs. {json_only} \
    Return exactly one object of the form {\"studySchedule\": \"<markdown>\"}.";

/// Tips system prompt. Replace `{json_only}` before sending.
const TIPS_SYSTEM_TEMPLATE: &str = "You are an AI-powered study assistant that gives personalized \
    study tips and strategies. {json_only} \
    Return exactly one object of the form {\"studyTips\": \"<markdown>\"}.";

/// Schedule prompt template.
/// Replace: {subject}, {deadline}, {sections}, {study_methods}, {frequency}, {duration}
const SCHEDULE_PROMPT_TEMPLATE: &str = r#"Subject: {subject}
Deadline: {deadline}
Sections: {sections}
Study Methods: {study_methods}
Study Frequency: {frequency} times per week
Session Duration: {duration} minutes per session

Generate a study schedule, formatted in markdown, taking into account the subject, deadline, sections to study, preferred study methods, frequency, and session duration.
The study schedule should be realistic and actionable. Break down the plan into weeks and days. Be specific about what to study in each session."#;

/// Tips prompt template.
/// Replace: {subject}, {deadline}, {sections}, {study_methods}, {cadence_block},
/// {definition_block}, {markdown}
const TIPS_PROMPT_TEMPLATE: &str = r#"Provide personalized study tips and strategies based on the following information:

Subject: {subject}
Deadline: {deadline}
Sections to Study: {sections}
Preferred Study Methods: {study_methods}
{cadence_block}{definition_block}
Consider the subject, deadline, sections, study methods, and study cadence to generate effective and tailored study tips.
{markdown}"#;

const FREQUENCY_LINE_TEMPLATE: &str = "Study Frequency: {frequency} times per week\n";
const DURATION_LINE_TEMPLATE: &str = "Session Duration: {duration} minutes per session\n";

/// Definition block appended to the tips prompt. Replace: {word}, {definition}
const DEFINITION_BLOCK_TEMPLATE: &str = r#"
The student asked about the term "{word}". Dictionary definition: {definition}
Explain how this term relates to the material and include a short memorization tip for it.
"#;

/// Fields the tips template needs. Both the form flow and the `/api/ai` flow
/// reduce their input to this shape.
#[derive(Debug, Clone)]
pub struct TipsPromptInput<'a> {
    pub subject: &'a str,
    /// ISO `YYYY-MM-DD`.
    pub deadline: String,
    pub sections: String,
    pub study_methods: String,
    /// Sessions per week, when known.
    pub frequency: Option<u32>,
    /// Minutes per session, when known.
    pub duration: Option<u32>,
    pub definition: Option<&'a DefinedWord>,
}

impl<'a> TipsPromptInput<'a> {
    pub fn from_request(request: &'a StudyPlanRequest, definition: Option<&'a DefinedWord>) -> Self {
        Self {
            subject: &request.subject,
            deadline: request.deadline.format("%Y-%m-%d").to_string(),
            sections: request.sections_joined(),
            study_methods: request.study_methods_joined(),
            frequency: Some(request.frequency),
            duration: Some(request.duration),
            definition,
        }
    }
}

pub fn schedule_system() -> String {
    render_template(SCHEDULE_SYSTEM_TEMPLATE, &[("json_only", JSON_ONLY_INSTRUCTION)])
}

pub fn tips_system() -> String {
    render_template(TIPS_SYSTEM_TEMPLATE, &[("json_only", JSON_ONLY_INSTRUCTION)])
}

pub fn build_schedule_prompt(request: &StudyPlanRequest) -> String {
    render_template(
        SCHEDULE_PROMPT_TEMPLATE,
        &[
            ("subject", request.subject.as_str()),
            ("deadline", localized_date(request.deadline).as_str()),
            ("sections", request.sections_joined().as_str()),
            ("study_methods", request.study_methods_joined().as_str()),
            ("frequency", request.frequency.to_string().as_str()),
            ("duration", request.duration.to_string().as_str()),
        ],
    )
}

pub fn build_tips_prompt(input: &TipsPromptInput<'_>) -> String {
    let mut cadence_block = String::new();
    if let Some(frequency) = input.frequency {
        cadence_block.push_str(&render_template(
            FREQUENCY_LINE_TEMPLATE,
            &[("frequency", frequency.to_string().as_str())],
        ));
    }
    if let Some(duration) = input.duration {
        cadence_block.push_str(&render_template(
            DURATION_LINE_TEMPLATE,
            &[("duration", duration.to_string().as_str())],
        ));
    }

    let definition_block = input
        .definition
        .map(|d| {
            render_template(
                DEFINITION_BLOCK_TEMPLATE,
                &[("word", d.word.as_str()), ("definition", d.definition.as_str())],
            )
        })
        .unwrap_or_default();

    render_template(
        TIPS_PROMPT_TEMPLATE,
        &[
            ("subject", input.subject),
            ("deadline", input.deadline.as_str()),
            ("sections", input.sections.as_str()),
            ("study_methods", input.study_methods.as_str()),
            ("cadence_block", cadence_block.as_str()),
            ("definition_block", definition_block.as_str()),
            ("markdown", MARKDOWN_INSTRUCTION),
        ],
    )
}

/// US-style `M/D/YYYY`, no zero padding.
fn localized_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}
