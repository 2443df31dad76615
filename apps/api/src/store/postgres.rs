use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::models::interaction::{AiInteraction, NewAiInteraction};
use crate::models::session::{NewStudySession, StudySession};
use crate::store::{DeletedCounts, StoreError, StudyStore};

/// Postgres-backed store. `created_at` is stamped by the database clock.
#[derive(Clone)]
pub struct PgStudyStore {
    pool: PgPool,
}

impl PgStudyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudyStore for PgStudyStore {
    async fn save_session(
        &self,
        user_id: &str,
        session: NewStudySession,
    ) -> Result<StudySession, StoreError> {
        let saved = sqlx::query_as::<_, StudySession>(
            r#"
            INSERT INTO study_sessions
                (user_id, subject, deadline, sections, study_methods,
                 frequency, duration, study_schedule, ai_tips)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&session.subject)
        .bind(session.deadline)
        .bind(&session.sections)
        .bind(&session.study_methods)
        .bind(session.frequency)
        .bind(session.duration)
        .bind(&session.study_schedule)
        .bind(&session.ai_tips)
        .fetch_one(&self.pool)
        .await?;

        info!("Saved study session {} for user {}", saved.id, user_id);
        Ok(saved)
    }

    async fn list_sessions(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<StudySession>, StoreError> {
        // LIMIT NULL is LIMIT ALL in Postgres.
        Ok(sqlx::query_as::<_, StudySession>(
            r#"
            SELECT * FROM study_sessions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn append_interaction(
        &self,
        interaction: NewAiInteraction,
    ) -> Result<AiInteraction, StoreError> {
        Ok(sqlx::query_as::<_, AiInteraction>(
            r#"
            INSERT INTO ai_interactions
                (user_id, prompt, prompt_meta, response, raw_response_text, model)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&interaction.user_id)
        .bind(&interaction.prompt)
        .bind(&interaction.prompt_meta)
        .bind(&interaction.response)
        .bind(&interaction.raw_response_text)
        .bind(&interaction.model)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_interactions(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<AiInteraction>, StoreError> {
        Ok(sqlx::query_as::<_, AiInteraction>(
            r#"
            SELECT * FROM ai_interactions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_user_data(&self, user_id: &str) -> Result<DeletedCounts, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sessions = sqlx::query("DELETE FROM study_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let interactions = sqlx::query("DELETE FROM ai_interactions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        info!("Deleted {sessions} sessions and {interactions} interactions for user {user_id}");
        Ok(DeletedCounts {
            sessions,
            interactions,
        })
    }
}
