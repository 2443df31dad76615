//! Axum route handlers for the interaction log.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::interactions::{history, run_interaction, InteractionRequest, InteractionResponse};
use crate::models::interaction::AiInteraction;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// POST /api/v1/interactions
pub async fn handle_create_interaction(
    State(state): State<AppState>,
    Json(req): Json<InteractionRequest>,
) -> Result<Json<InteractionResponse>, AppError> {
    let response = run_interaction(
        state.llm.as_ref(),
        state.dictionary.as_ref(),
        state.store.as_ref(),
        req,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/v1/users/:user_id/interactions
pub async fn handle_list_interactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<AiInteraction>>, AppError> {
    let interactions = history(state.store.as_ref(), &user_id, params.limit).await?;
    Ok(Json(interactions))
}
