//! Definition lookups against the free dictionary API.
//!
//! Enrichment is best effort: every failure mode collapses into a sentinel
//! string, so callers never see an error from this module.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_DICTIONARY_API_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

pub const NOT_RETRIEVED: &str = "Could not retrieve definition.";
pub const NOT_FOUND: &str = "No definition found.";
pub const FETCH_FAILED: &str = "Error fetching definition.";

/// A word together with its resolved definition (or sentinel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinedWord {
    pub word: String,
    pub definition: String,
}

/// Carried in `AppState` as `Arc<dyn DefinitionLookup>`.
#[async_trait]
pub trait DefinitionLookup: Send + Sync {
    /// Returns a definition or one of the sentinel strings. Never fails.
    async fn define(&self, word: &str) -> String;
}

/// Looks `word` up unless it is blank.
pub async fn enrich(lookup: &dyn DefinitionLookup, word: Option<&str>) -> Option<DefinedWord> {
    let word = word.map(str::trim).filter(|w| !w.is_empty())?;
    let definition = lookup.define(word).await;
    Some(DefinedWord {
        word: word.to_string(),
        definition,
    })
}

#[derive(Debug, Deserialize)]
struct DictionaryEntry {
    #[serde(default)]
    meanings: Vec<Meaning>,
}

#[derive(Debug, Deserialize)]
struct Meaning {
    #[serde(default)]
    definitions: Vec<DefinitionItem>,
}

#[derive(Debug, Deserialize)]
struct DefinitionItem {
    definition: String,
}

/// First entry, first meaning, first definition.
fn first_definition(body: &str) -> Option<String> {
    let entries: Vec<DictionaryEntry> = serde_json::from_str(body).ok()?;
    entries
        .into_iter()
        .next()?
        .meanings
        .into_iter()
        .next()?
        .definitions
        .into_iter()
        .next()
        .map(|d| d.definition)
}

#[derive(Clone)]
pub struct DictionaryClient {
    client: Client,
    base_url: String,
}

impl DictionaryClient {
    pub fn new(base_url: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()?,
            base_url,
        })
    }

    fn entry_url(&self, word: &str) -> Option<Url> {
        let mut url = Url::parse(&self.base_url).ok()?;
        url.path_segments_mut().ok()?.pop_if_empty().push(word);
        Some(url)
    }
}

#[async_trait]
impl DefinitionLookup for DictionaryClient {
    async fn define(&self, word: &str) -> String {
        let Some(url) = self.entry_url(word) else {
            warn!("Invalid dictionary base URL: {}", self.base_url);
            return FETCH_FAILED.to_string();
        };

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Error fetching definition for '{word}': {e}");
                return FETCH_FAILED.to_string();
            }
        };

        if !response.status().is_success() {
            debug!("Dictionary returned {} for '{word}'", response.status());
            return NOT_RETRIEVED.to_string();
        }

        match response.text().await {
            Ok(body) => first_definition(&body).unwrap_or_else(|| NOT_FOUND.to_string()),
            Err(e) => {
                warn!("Error reading definition for '{word}': {e}");
                FETCH_FAILED.to_string()
            }
        }
    }
}
