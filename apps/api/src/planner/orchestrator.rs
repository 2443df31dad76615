//! Plan orchestration: one schedule call and one tips call, run concurrently.
//!
//! Flow: optional definition lookup → compose both prompts → spawn both
//! backend calls → join → parse each with fallback → aggregate.
//!
//! Fail-fast on the aggregate: if either half fails, no plan is returned.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::dictionary::{enrich, DefinitionLookup};
use crate::errors::AppError;
use crate::llm_client::{CompletionBackend, LlmError};
use crate::planner::models::{GeneratedPlan, PlanResponse, StudyPlanRequest};
use crate::planner::prompts::{
    build_schedule_prompt, build_tips_prompt, schedule_system, tips_system, TipsPromptInput,
};
use crate::planner::response_parser::{
    parse_model_output, Degradable, ScheduleOutput, TipsOutput,
};

/// Generates the schedule and tips for a validated request.
pub async fn generate_plan(
    backend: Arc<dyn CompletionBackend>,
    dictionary: &dyn DefinitionLookup,
    request: StudyPlanRequest,
) -> Result<PlanResponse, AppError> {
    let definition = enrich(dictionary, request.define.as_deref()).await;

    let schedule_prompt = build_schedule_prompt(&request);
    let tips_prompt = build_tips_prompt(&TipsPromptInput::from_request(
        &request,
        definition.as_ref(),
    ));

    info!("Generating study plan for subject '{}'", request.subject);

    let schedule_task = spawn_generation::<ScheduleOutput>(
        backend.clone(),
        schedule_prompt,
        schedule_system(),
    );
    let tips_task = spawn_generation::<TipsOutput>(backend, tips_prompt, tips_system());

    let (schedule, tips) = tokio::join!(schedule_task, tips_task);

    match (flatten("schedule", schedule), flatten("tips", tips)) {
        (Ok(schedule), Ok(tips)) => Ok(PlanResponse {
            plan: GeneratedPlan {
                study_schedule: schedule.study_schedule,
                study_tips: tips.study_tips,
            },
            request,
        }),
        (schedule, tips) => {
            let failures = [schedule.err(), tips.err()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join("; ");
            Err(AppError::Llm(failures))
        }
    }
}

/// Generates tips only. Used by the standalone tips endpoint.
pub async fn generate_tips(
    backend: &dyn CompletionBackend,
    input: &TipsPromptInput<'_>,
) -> Result<String, LlmError> {
    let raw = backend
        .complete(&build_tips_prompt(input), &tips_system())
        .await?;
    let tips = parse_model_output::<TipsOutput>(&raw)?.into_value();
    non_blank(tips.study_tips)
}

/// A field that is present but blank counts as an empty response.
trait PrimaryText {
    fn primary_text(&self) -> &str;
}

impl PrimaryText for ScheduleOutput {
    fn primary_text(&self) -> &str {
        &self.study_schedule
    }
}

impl PrimaryText for TipsOutput {
    fn primary_text(&self) -> &str {
        &self.study_tips
    }
}

fn spawn_generation<T>(
    backend: Arc<dyn CompletionBackend>,
    prompt: String,
    system: String,
) -> JoinHandle<Result<T, LlmError>>
where
    T: Degradable + PrimaryText + Send + 'static,
{
    tokio::spawn(async move {
        let raw = backend.complete(&prompt, &system).await?;
        let parsed = parse_model_output::<T>(&raw)?;
        if !parsed.is_structured() {
            warn!("Model output was not structured; using raw text");
        }
        let value = parsed.into_value();
        if value.primary_text().trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(value)
    })
}

fn flatten<T>(
    label: &str,
    joined: Result<Result<T, LlmError>, tokio::task::JoinError>,
) -> Result<T, String> {
    match joined {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!("{label} generation failed: {e}");
            Err(format!("{label} generation failed: {e}"))
        }
        Err(e) => {
            warn!("{label} generation task aborted: {e}");
            Err(format!("{label} generation task aborted: {e}"))
        }
    }
}

fn non_blank(text: String) -> Result<String, LlmError> {
    if text.trim().is_empty() {
        Err(LlmError::EmptyContent)
    } else {
        Ok(text)
    }
}
