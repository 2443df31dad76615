//! Persistence: per-user study sessions and the model interaction log.
//!
//! Every operation is scoped to one owner; there is no cross-user read or write.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::interaction::{AiInteraction, NewAiInteraction};
use crate::models::session::{NewStudySession, StudySession};

pub mod postgres;

pub use postgres::PgStudyStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of the write that follows a successful generation. A failed write
/// never discards what was generated.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SaveOutcome<T> {
    Saved { record: T },
    NotSaved { error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCounts {
    pub sessions: u64,
    pub interactions: u64,
}

/// Carried in `AppState` as `Arc<dyn StudyStore>`.
#[async_trait]
pub trait StudyStore: Send + Sync {
    /// Appends one session. The store assigns `id` and `created_at`.
    async fn save_session(
        &self,
        user_id: &str,
        session: NewStudySession,
    ) -> Result<StudySession, StoreError>;

    /// Newest first. `None` means no limit.
    async fn list_sessions(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<StudySession>, StoreError>;

    async fn append_interaction(
        &self,
        interaction: NewAiInteraction,
    ) -> Result<AiInteraction, StoreError>;

    /// Newest first.
    async fn list_interactions(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<AiInteraction>, StoreError>;

    /// Whole-account deletion. The only path that removes sessions.
    async fn delete_user_data(&self, user_id: &str) -> Result<DeletedCounts, StoreError>;
}
