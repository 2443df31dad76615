use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::planner::models::{GeneratedPlan, StudyPlanRequest};

/// A persisted plan. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: Uuid,
    pub user_id: String,
    pub subject: String,
    pub deadline: NaiveDate,
    pub sections: Vec<String>,
    pub study_methods: Vec<String>,
    pub frequency: i32,
    pub duration: i32,
    pub study_schedule: String,
    pub ai_tips: String,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to append a session; `id` and `created_at` come from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudySession {
    pub subject: String,
    pub deadline: NaiveDate,
    pub sections: Vec<String>,
    pub study_methods: Vec<String>,
    pub frequency: i32,
    pub duration: i32,
    pub study_schedule: String,
    pub ai_tips: String,
}

impl NewStudySession {
    pub fn from_plan(request: &StudyPlanRequest, plan: &GeneratedPlan) -> Self {
        Self {
            subject: request.subject.clone(),
            deadline: request.deadline,
            sections: request.sections.clone(),
            study_methods: request
                .study_methods
                .iter()
                .map(|m| m.label().to_string())
                .collect(),
            frequency: i32::try_from(request.frequency).unwrap_or(i32::MAX),
            duration: i32::try_from(request.duration).unwrap_or(i32::MAX),
            study_schedule: plan.study_schedule.clone(),
            ai_tips: plan.study_tips.clone(),
        }
    }
}
