//! Answer backend trait and the hosted-service client.

pub mod http;
pub mod orama;

pub use orama::OramaClient;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{InferenceType, Message, SearchParams, SearchResults, SourceRecord};

/// One question sent to the answer service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub conversation_id: String,
    pub interaction_id: String,
    pub query: String,
    /// Transcript before this question.
    pub messages: Vec<Message>,
    pub user_context: String,
    pub inference_type: InferenceType,
}

/// An incremental piece of an answer stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "kebab-case")]
pub enum AnswerChunk {
    /// Supporting records for the answer, replacing any earlier set.
    Sources(Vec<SourceRecord>),
    /// The query as rewritten by the service before searching.
    QueryTranslated(String),
    /// The next fragment of answer text.
    Text(String),
    /// Follow-up questions suggested by the service.
    RelatedQueries(Vec<String>),
}

/// A hosted semantic-search-and-answer service.
///
/// Retrieval, ranking and answer synthesis all happen behind this trait.
#[async_trait]
pub trait AnswerBackend: Send + Sync {
    /// Backend name for logs (e.g. "orama").
    fn backend_name(&self) -> &str;

    /// Open an answer stream for one question.
    ///
    /// An `Err` means the question was never accepted; errors after that
    /// arrive inside the stream.
    async fn answer(
        &self,
        request: &AnswerRequest,
    ) -> Result<BoxStream<'static, Result<AnswerChunk>>>;

    /// Direct search against the index, bypassing answer synthesis.
    async fn search(&self, params: &SearchParams) -> Result<SearchResults>;
}
