//! Per-question bookkeeping inside an answer session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::source::SourceRecord;

/// One question/answer round of an answer session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub interaction_id: String,
    pub query: String,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_query: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
    #[serde(default)]
    pub related_queries: Vec<String>,
    pub loading: bool,
    pub aborted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(interaction_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            interaction_id: interaction_id.into(),
            query: query.into(),
            response: String::new(),
            translated_query: None,
            sources: Vec::new(),
            related_queries: Vec::new(),
            loading: true,
            aborted: false,
            error: None,
            started_at: Utc::now(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
