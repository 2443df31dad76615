//! In-memory fakes for the three external seams, shared by unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Barrier;
use uuid::Uuid;

use crate::dictionary::{DefinitionLookup, NOT_RETRIEVED};
use crate::llm_client::{CompletionBackend, LlmError};
use crate::models::interaction::{AiInteraction, NewAiInteraction};
use crate::models::session::{NewStudySession, StudySession};
use crate::state::AppState;
use crate::store::{DeletedCounts, StoreError, StudyStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Schedule,
    Tips,
    Planner,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub prompt: String,
    pub system: String,
}

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    /// Backend answered with an HTTP error status.
    Fail(u16),
    /// Backend answered with no text at all.
    Empty,
}

/// A `CompletionBackend` that answers by prompt kind and records every call.
pub struct ScriptedBackend {
    schedule: Reply,
    tips: Reply,
    planner: Reply,
    calls: Mutex<Vec<RecordedCall>>,
    rendezvous: Option<Barrier>,
}

impl ScriptedBackend {
    pub fn happy() -> Self {
        Self {
            schedule: Reply::Text(
                r##"{"studySchedule": "# Week 1\n- Mon: The Great War\n- Wed: The Cold War"}"##
                    .into(),
            ),
            tips: Reply::Text(r###"{"studyTips": "## Tips\n- Use flashcards daily"}"###.into()),
            planner: Reply::Text(
                r#"{"planSummary": "Review cell biology twice a week",
                    "tasks": [{"title": "Read chapter 3", "dueDate": "2024-12-01",
                               "estimatedMinutes": 45, "priority": "high"}],
                    "notes": "Start early"}"#
                    .into(),
            ),
            calls: Mutex::new(Vec::new()),
            rendezvous: None,
        }
    }

    pub fn with_schedule(mut self, reply: Reply) -> Self {
        self.schedule = reply;
        self
    }

    pub fn with_tips(mut self, reply: Reply) -> Self {
        self.tips = reply;
        self
    }

    pub fn with_planner(mut self, reply: Reply) -> Self {
        self.planner = reply;
        self
    }

    /// Every call blocks until a second call arrives.
    pub fn with_rendezvous(mut self) -> Self {
        self.rendezvous = Some(Barrier::new(2));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn kind_of(system: &str) -> CallKind {
        if system.contains("\"studySchedule\"") {
            CallKind::Schedule
        } else if system.contains("\"studyTips\"") {
            CallKind::Tips
        } else {
            CallKind::Planner
        }
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let kind = Self::kind_of(system);
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            prompt: prompt.to_string(),
            system: system.to_string(),
        });

        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }

        let reply = match kind {
            CallKind::Schedule => &self.schedule,
            CallKind::Tips => &self.tips,
            CallKind::Planner => &self.planner,
        };
        match reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(status) => Err(LlmError::Api {
                status: *status,
                message: "scripted failure".into(),
            }),
            Reply::Empty => Ok(String::new()),
        }
    }
}

/// A `DefinitionLookup` backed by a fixed word list.
#[derive(Default)]
pub struct FakeDictionary {
    entries: HashMap<String, String>,
    lookups: Mutex<Vec<String>>,
}

impl FakeDictionary {
    pub fn with(word: &str, definition: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(word.to_string(), definition.to_string());
        Self {
            entries,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl DefinitionLookup for FakeDictionary {
    async fn define(&self, word: &str) -> String {
        self.lookups.lock().unwrap().push(word.to_string());
        self.entries
            .get(word)
            .cloned()
            .unwrap_or_else(|| NOT_RETRIEVED.to_string())
    }
}

/// A `StudyStore` kept in memory. Insertion order doubles as creation order.
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<Vec<StudySession>>,
    interactions: Mutex<Vec<AiInteraction>>,
    fail_writes: AtomicBool,
    save_attempts: AtomicUsize,
}

impl MemoryStore {
    pub fn failing_writes() -> Self {
        let store = Self::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.lock().unwrap().len()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

fn newest_first<T: Clone>(rows: &[T], keep: impl Fn(&T) -> bool, limit: Option<i64>) -> Vec<T> {
    let iter = rows.iter().rev().filter(|r| keep(r)).cloned();
    match limit {
        Some(n) => iter.take(usize::try_from(n).unwrap_or(0)).collect(),
        None => iter.collect(),
    }
}

#[async_trait]
impl StudyStore for MemoryStore {
    async fn save_session(
        &self,
        user_id: &str,
        session: NewStudySession,
    ) -> Result<StudySession, StoreError> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        let saved = StudySession {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            subject: session.subject,
            deadline: session.deadline,
            sections: session.sections,
            study_methods: session.study_methods,
            frequency: session.frequency,
            duration: session.duration,
            study_schedule: session.study_schedule,
            ai_tips: session.ai_tips,
            created_at: Utc::now(),
        };
        self.sessions.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn list_sessions(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<StudySession>, StoreError> {
        let sessions = self.sessions.lock().unwrap();
        Ok(newest_first(&sessions, |s| s.user_id == user_id, limit))
    }

    async fn append_interaction(
        &self,
        interaction: NewAiInteraction,
    ) -> Result<AiInteraction, StoreError> {
        self.check_writable()?;
        let saved = AiInteraction {
            id: Uuid::new_v4(),
            user_id: interaction.user_id,
            prompt: interaction.prompt,
            prompt_meta: interaction.prompt_meta,
            response: interaction.response,
            raw_response_text: interaction.raw_response_text,
            model: interaction.model,
            created_at: Utc::now(),
        };
        self.interactions.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn list_interactions(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<AiInteraction>, StoreError> {
        let interactions = self.interactions.lock().unwrap();
        Ok(newest_first(
            &interactions,
            |i| i.user_id == user_id,
            Some(limit),
        ))
    }

    async fn delete_user_data(&self, user_id: &str) -> Result<DeletedCounts, StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let mut interactions = self.interactions.lock().unwrap();
        let (sessions_before, interactions_before) = (sessions.len(), interactions.len());
        sessions.retain(|s| s.user_id != user_id);
        interactions.retain(|i| i.user_id != user_id);
        Ok(DeletedCounts {
            sessions: (sessions_before - sessions.len()) as u64,
            interactions: (interactions_before - interactions.len()) as u64,
        })
    }
}

pub fn test_state(
    llm: Arc<ScriptedBackend>,
    dictionary: Arc<FakeDictionary>,
    store: Arc<MemoryStore>,
) -> AppState {
    AppState {
        llm,
        dictionary,
        store,
    }
}
