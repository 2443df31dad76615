pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::interactions::handlers as interactions;
use crate::planner::handlers as planner;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Standalone tips call used by the form page
        .route("/api/ai", post(planner::handle_study_tips))
        // Plans
        .route("/api/v1/plans", post(planner::handle_create_plan))
        .route("/api/v1/plans/generate", post(planner::handle_generate_plan))
        // Per-user data
        .route(
            "/api/v1/users/:user_id/sessions",
            post(planner::handle_save_session).get(planner::handle_list_sessions),
        )
        .route("/api/v1/users/:user_id", delete(planner::handle_delete_user))
        .route(
            "/api/v1/users/:user_id/interactions",
            get(interactions::handle_list_interactions),
        )
        // Interaction log
        .route(
            "/api/v1/interactions",
            post(interactions::handle_create_interaction),
        )
        .with_state(state)
}
