use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the append-only model invocation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AiInteraction {
    pub id: Uuid,
    pub user_id: String,
    pub prompt: String,
    pub prompt_meta: Option<Value>,
    pub response: Value,
    pub raw_response_text: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAiInteraction {
    pub user_id: String,
    pub prompt: String,
    pub prompt_meta: Option<Value>,
    pub response: Value,
    pub raw_response_text: String,
    pub model: String,
}
