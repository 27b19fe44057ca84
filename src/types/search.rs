//! Direct search parameters and results.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::source::SourceRecord;

/// Search mode understood by the hosted index.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchMode {
    Fulltext,
    #[default]
    Vector,
    Hybrid,
}

/// Inference mode an answer session is created with. Passed through verbatim.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InferenceType {
    #[default]
    Documentation,
}

/// Parameters of a direct search.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
pub struct SearchParams {
    #[builder(into)]
    pub term: String,
    #[builder(default)]
    pub mode: SearchMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Result set of a direct search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub hits: Vec<SourceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<SearchElapsed>,
}

/// Server-side timing of a search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchElapsed {
    #[serde(default)]
    pub raw: u64,
    #[serde(default)]
    pub formatted: String,
}
