//! Free-form study planner: a single raw model call with an audit trail.
//!
//! Flow: compose prompt → backend → parse with fallback → look up the first
//! word of the summary → append one `AiInteraction` record → respond.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::dictionary::{enrich, DefinedWord, DefinitionLookup};
use crate::errors::AppError;
use crate::llm_client::CompletionBackend;
use crate::models::interaction::{AiInteraction, NewAiInteraction};
use crate::planner::response_parser::{parse_model_output, Degradable};
use crate::store::{SaveOutcome, StudyStore};

pub mod handlers;
pub mod prompts;

use prompts::{build_user_prompt, study_planner_system};

pub const DEFAULT_HISTORY_LIMIT: i64 = 10;
pub const MAX_HISTORY_LIMIT: i64 = 100;

pub const UNSTRUCTURED_NOTE: &str =
    "Model did not return valid JSON; raw text placed in planSummary instead.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTask {
    pub title: String,
    pub due_date: Option<String>,
    pub estimated_minutes: u32,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanOutput {
    pub plan_summary: String,
    pub tasks: Vec<StudyTask>,
    pub notes: String,
}

impl Degradable for StudyPlanOutput {
    fn from_raw_text(raw: &str) -> Self {
        Self {
            plan_summary: raw.to_string(),
            tasks: Vec::new(),
            notes: UNSTRUCTURED_NOTE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    pub user_id: Option<String>,
    pub input: String,
    /// Opaque client metadata stored alongside the prompt.
    pub extra: Option<Value>,
}

/// What the model produced, plus the best-effort dictionary lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPlan {
    #[serde(flatten)]
    pub plan: StudyPlanOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary_definition: Option<DefinedWord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResponse {
    pub response: EnrichedPlan,
    pub audit: SaveOutcome<AiInteraction>,
}

/// First space-separated token of the summary with every non-ASCII-letter removed.
pub fn first_word(summary: &str) -> Option<String> {
    let word: String = summary
        .split(' ')
        .next()?
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    (!word.is_empty()).then_some(word)
}

/// Runs one free-form planner call and records it.
pub async fn run_interaction(
    backend: &dyn CompletionBackend,
    dictionary: &dyn DefinitionLookup,
    store: &dyn StudyStore,
    request: InteractionRequest,
) -> Result<InteractionResponse, AppError> {
    let user_id = request
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized("You must be signed in before calling the model.".to_string())
        })?
        .to_string();

    if request.input.trim().is_empty() {
        return Err(AppError::Validation("input: Input is required.".to_string()));
    }

    let prompt = build_user_prompt(&request.input);
    let raw = backend
        .complete(&prompt, &study_planner_system())
        .await
        .map_err(|e| AppError::Llm(format!("Study planner call failed: {e}")))?;

    let parsed = parse_model_output::<StudyPlanOutput>(&raw)
        .map_err(|e| AppError::Llm(format!("Study planner call failed: {e}")))?;
    if !parsed.is_structured() {
        warn!("Study planner output for user {user_id} was not valid JSON");
    }
    let plan = parsed.into_value();

    let word = first_word(&plan.plan_summary);
    let dictionary_definition = enrich(dictionary, word.as_deref()).await;

    let response = EnrichedPlan {
        plan,
        dictionary_definition,
    };

    let record = NewAiInteraction {
        user_id: user_id.clone(),
        prompt,
        prompt_meta: request.extra,
        response: serde_json::to_value(&response)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize response: {e}")))?,
        raw_response_text: raw,
        model: backend.model().to_string(),
    };

    let audit = match store.append_interaction(record).await {
        Ok(saved) => {
            info!("Recorded interaction {} for user {}", saved.id, user_id);
            SaveOutcome::Saved { record: saved }
        }
        Err(e) => {
            warn!("Failed to record interaction for user {user_id}: {e}");
            SaveOutcome::NotSaved {
                error: "The response was generated but could not be recorded.".to_string(),
            }
        }
    };

    Ok(InteractionResponse { response, audit })
}

/// The user's most recent interactions, newest first.
pub async fn history(
    store: &dyn StudyStore,
    user_id: &str,
    limit: Option<i64>,
) -> Result<Vec<AiInteraction>, AppError> {
    let limit = limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    Ok(store.list_interactions(user_id, limit).await?)
}
