use std::sync::Arc;

use crate::dictionary::DefinitionLookup;
use crate::llm_client::CompletionBackend;
use crate::store::StudyStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model backend. Default: `LlmClient` against the Anthropic Messages API.
    pub llm: Arc<dyn CompletionBackend>,
    /// Definition lookups. Default: `DictionaryClient`.
    pub dictionary: Arc<dyn DefinitionLookup>,
    /// Sessions and the interaction log. Default: `PgStudyStore`.
    pub store: Arc<dyn StudyStore>,
}
