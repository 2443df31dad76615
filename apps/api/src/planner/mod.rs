// Study plan generation: form validation, prompt composition, two concurrent
// model calls, and the save that follows.
// All model calls go through llm_client via the CompletionBackend trait.

pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod response_parser;
pub mod service;
pub mod validation;
