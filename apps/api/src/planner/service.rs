//! Plan creation: validate, generate, then save exactly once.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::error;

use crate::errors::{AppError, NOT_SAVED_MESSAGE};
use crate::models::session::{NewStudySession, StudySession};
use crate::planner::models::PlanResponse;
use crate::planner::orchestrator::generate_plan;
use crate::planner::validation::{validate_form, FormField, StudyPlanForm};
use crate::state::AppState;
use crate::store::SaveOutcome;

pub const LOGIN_REQUIRED_MESSAGE: &str = "You must be logged in to create a study plan.";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutcome {
    pub plan: PlanResponse,
    pub persistence: SaveOutcome<StudySession>,
}

/// Returns the trimmed user id, or the login error when absent.
pub fn require_user(user_id: Option<&str>) -> Result<&str, AppError> {
    user_id
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Unauthorized(LOGIN_REQUIRED_MESSAGE.to_string()))
}

/// Full flow behind `POST /api/v1/plans`.
///
/// A failed write after a successful generation is reported in
/// `persistence`; the generated plan is still returned.
pub async fn create_study_plan(
    state: &AppState,
    form: StudyPlanForm,
    today: NaiveDate,
) -> Result<PlanOutcome, AppError> {
    let request = validate_form(&form, today).map_err(|e| AppError::Validation(e.to_string()))?;
    let user_id = form
        .user_id
        .as_ref()
        .and_then(FormField::expected)
        .map(String::as_str);
    let user_id = require_user(user_id)?.to_string();

    let plan = generate_plan(state.llm.clone(), state.dictionary.as_ref(), request).await?;

    let session = NewStudySession::from_plan(&plan.request, &plan.plan);
    let persistence = match state.store.save_session(&user_id, session).await {
        Ok(saved) => SaveOutcome::Saved { record: saved },
        Err(e) => {
            error!("Failed to save study session for user {user_id}: {e}");
            SaveOutcome::NotSaved {
                error: NOT_SAVED_MESSAGE.to_string(),
            }
        }
    };

    Ok(PlanOutcome { plan, persistence })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::planner::validation::FormNumber;
    use crate::testing::{test_state, FakeDictionary, MemoryStore, Reply, ScriptedBackend};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn history_form() -> StudyPlanForm {
        StudyPlanForm {
            subject: Some("History".into()),
            deadline: Some("2024-12-31".into()),
            sections: Some(vec!["The Great War".to_string(), "The Cold War".to_string()].into()),
            study_methods: Some(vec!["Flashcards".to_string(), "Practice Quizzes".to_string()].into()),
            frequency: Some(FormNumber::Number(3)),
            duration: Some(FormNumber::Text("60".into())),
            define: None,
            user_id: Some("user-1".into()),
        }
    }

    #[tokio::test]
    async fn test_success_saves_exactly_once() {
        let backend = Arc::new(ScriptedBackend::happy());
        let store = Arc::new(MemoryStore::default());
        let state = test_state(backend.clone(), Arc::new(FakeDictionary::default()), store.clone());

        let outcome = create_study_plan(&state, history_form(), today()).await.unwrap();

        match &outcome.persistence {
            SaveOutcome::Saved { record } => {
                assert_eq!(record.user_id, "user-1");
                assert_eq!(record.subject, "History");
                assert_eq!(record.study_methods, vec!["Flashcards", "Practice Quizzes"]);
                assert_eq!(record.study_schedule, outcome.plan.plan.study_schedule);
                assert_eq!(record.ai_tips, outcome.plan.plan.study_tips);
            }
            other => panic!("expected saved session, got {other:?}"),
        }
        assert_eq!(store.save_attempts(), 1);
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_generated_plan() {
        let store = Arc::new(MemoryStore::failing_writes());
        let state = test_state(
            Arc::new(ScriptedBackend::happy()),
            Arc::new(FakeDictionary::default()),
            store.clone(),
        );

        let outcome = create_study_plan(&state, history_form(), today()).await.unwrap();

        assert!(!outcome.plan.plan.study_schedule.is_empty());
        match outcome.persistence {
            SaveOutcome::NotSaved { error } => assert_eq!(error, NOT_SAVED_MESSAGE),
            other => panic!("expected notSaved, got {other:?}"),
        }
        // No automatic retry.
        assert_eq!(store.save_attempts(), 1);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_backend() {
        let backend = Arc::new(ScriptedBackend::happy());
        let store = Arc::new(MemoryStore::default());
        let state = test_state(backend.clone(), Arc::new(FakeDictionary::default()), store.clone());
        let mut form = history_form();
        form.sections = Some(vec!["The Great War".to_string(), "   ".to_string()].into());

        let err = create_study_plan(&state, form, today()).await.unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("sections.1")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(backend.calls().is_empty());
        assert_eq!(store.save_attempts(), 0);
    }

    #[tokio::test]
    async fn test_missing_user_is_reported_separately() {
        let backend = Arc::new(ScriptedBackend::happy());
        let state = test_state(
            backend.clone(),
            Arc::new(FakeDictionary::default()),
            Arc::new(MemoryStore::default()),
        );
        let mut form = history_form();
        form.user_id = None;

        let err = create_study_plan(&state, form, today()).await.unwrap_err();
        match err {
            AppError::Unauthorized(msg) => assert_eq!(msg, LOGIN_REQUIRED_MESSAGE),
            other => panic!("expected unauthorized, got {other:?}"),
        }
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_saves_nothing() {
        let store = Arc::new(MemoryStore::default());
        let state = test_state(
            Arc::new(ScriptedBackend::happy().with_schedule(Reply::Fail(500))),
            Arc::new(FakeDictionary::default()),
            store.clone(),
        );

        let err = create_study_plan(&state, history_form(), today()).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
        assert_eq!(store.save_attempts(), 0);
    }
}
