//! Axum route handlers for study plans and saved sessions.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::dictionary::enrich;
use crate::errors::AppError;
use crate::models::session::{NewStudySession, StudySession};
use crate::planner::models::PlanResponse;
use crate::planner::orchestrator::{generate_plan, generate_tips};
use crate::planner::prompts::TipsPromptInput;
use crate::planner::response_parser::TipsOutput;
use crate::planner::service::{create_study_plan, require_user, PlanOutcome};
use crate::planner::validation::{check_persistable, validate_form, StudyPlanForm};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Body of `POST /api/ai`. Sections and methods arrive pre-joined.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTipsRequest {
    pub subject: String,
    pub deadline: String,
    pub sections: String,
    pub study_methods: String,
    pub frequency: Option<u32>,
    pub duration: Option<u32>,
    pub define: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    pub limit: Option<i64>,
}

pub const TIPS_FAILURE_MESSAGE: &str = "Failed to generate study tips";

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/ai
///
/// Standalone tips call. Any failure, including an unreadable body, is a 500
/// with a flat `{"error": ...}` body.
pub async fn handle_study_tips(
    State(state): State<AppState>,
    payload: Result<Json<StudyTipsRequest>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Rejected study tips request: {rejection}");
            return tips_failure();
        }
    };

    let definition = enrich(state.dictionary.as_ref(), body.define.as_deref()).await;
    let input = TipsPromptInput {
        subject: &body.subject,
        deadline: body.deadline.trim().to_string(),
        sections: body.sections,
        study_methods: body.study_methods,
        frequency: body.frequency,
        duration: body.duration,
        definition: definition.as_ref(),
    };

    match generate_tips(state.llm.as_ref(), &input).await {
        Ok(study_tips) => Json(TipsOutput { study_tips }).into_response(),
        Err(e) => {
            error!("Study tips generation failed: {e}");
            tips_failure()
        }
    }
}

fn tips_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": TIPS_FAILURE_MESSAGE })),
    )
        .into_response()
}

/// Unreadable bodies (bad JSON, non-object, wrong content type) are
/// validation errors like any other bad input.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Rejected request body: {rejection}");
        AppError::Validation(format!("Invalid form data: {}", rejection.body_text()))
    })
}

/// POST /api/v1/plans/generate
pub async fn handle_generate_plan(
    State(state): State<AppState>,
    payload: Result<Json<StudyPlanForm>, JsonRejection>,
) -> Result<Json<PlanResponse>, AppError> {
    let form = json_body(payload)?;
    let request = validate_form(&form, Utc::now().date_naive())
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let response = generate_plan(state.llm.clone(), state.dictionary.as_ref(), request).await?;
    Ok(Json(response))
}

/// POST /api/v1/plans
pub async fn handle_create_plan(
    State(state): State<AppState>,
    payload: Result<Json<StudyPlanForm>, JsonRejection>,
) -> Result<Json<PlanOutcome>, AppError> {
    let form = json_body(payload)?;
    let outcome = create_study_plan(&state, form, Utc::now().date_naive()).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/users/:user_id/sessions
///
/// Saves a plan that was generated earlier. This is the retry path after a
/// `notSaved` outcome; nothing is regenerated.
pub async fn handle_save_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<PlanResponse>, JsonRejection>,
) -> Result<(StatusCode, Json<StudySession>), AppError> {
    let body = json_body(payload)?;
    let user_id = require_user(Some(user_id.as_str()))?.to_string();
    check_persistable(&body.request).map_err(|e| AppError::Validation(e.to_string()))?;
    if body.plan.study_schedule.trim().is_empty() || body.plan.study_tips.trim().is_empty() {
        return Err(AppError::Validation(
            "Invalid form data: plan: Generated schedule and tips are required.".to_string(),
        ));
    }

    let session = NewStudySession::from_plan(&body.request, &body.plan);
    let saved = state
        .store
        .save_session(&user_id, session)
        .await
        .map_err(|e| AppError::NotSaved(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/v1/users/:user_id/sessions
pub async fn handle_list_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<SessionsQuery>,
) -> Result<Json<Vec<StudySession>>, AppError> {
    if matches!(params.limit, Some(limit) if limit < 1) {
        return Err(AppError::Validation(
            "limit must be a positive integer".to_string(),
        ));
    }
    let sessions = state.store.list_sessions(&user_id, params.limit).await?;
    Ok(Json(sessions))
}

/// DELETE /api/v1/users/:user_id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete_user_data(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
