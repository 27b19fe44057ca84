//! Bridge between one answer session and the chat view.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::client::AnswerBackend;
use crate::config::{MedchatConfig, DEFAULT_USER_CONTEXT};
use crate::error::{MedchatError, Result};
use crate::session::{AnswerSession, SessionConfig, SessionEvent, SessionEventSink};
use crate::types::{InferenceType, SearchMode, SearchParams, SearchResults};

/// Owns the long-lived answer session behind the chat view.
///
/// The adapter's only job is forwarding: questions go in through
/// [`SessionAdapter::ask`], everything the session produces comes back as
/// [`SessionEvent`]s through the sink given at construction.
#[derive(Clone)]
pub struct SessionAdapter {
    session: AnswerSession,
}

impl SessionAdapter {
    /// Create the session with the fixed patient context and an empty history.
    pub fn new(backend: Arc<dyn AnswerBackend>, sink: SessionEventSink) -> Self {
        Self::with_context(
            backend,
            DEFAULT_USER_CONTEXT.to_string(),
            InferenceType::Documentation,
            sink,
        )
    }

    /// Create the session using the context and inference mode from `config`.
    pub fn from_config(
        backend: Arc<dyn AnswerBackend>,
        config: &MedchatConfig,
        sink: SessionEventSink,
    ) -> Self {
        Self::with_context(
            backend,
            config.user_context().to_string(),
            config.inference_type(),
            sink,
        )
    }

    fn with_context(
        backend: Arc<dyn AnswerBackend>,
        user_context: String,
        inference_type: InferenceType,
        sink: SessionEventSink,
    ) -> Self {
        let config = SessionConfig {
            user_context,
            inference_type,
            initial_messages: Vec::new(),
        };
        Self {
            session: AnswerSession::new(backend, config, sink),
        }
    }

    /// Create an adapter whose events land on an ordered queue.
    pub fn channel(
        backend: Arc<dyn AnswerBackend>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink: SessionEventSink = Arc::new(move |event| {
            // The receiver only goes away when the view shuts down.
            let _ = tx.send(event);
        });
        (Self::new(backend, sink), rx)
    }

    /// Forward a question to the session.
    ///
    /// `text` must already be trimmed and non-empty. Answer content arrives
    /// only through session events; the result reports failure alone.
    pub async fn ask(&self, text: &str) -> Result<()> {
        debug!(chars = text.len(), "Forwarding question");
        self.session.ask(text).await.map(|_| ())
    }

    /// Direct vector search, bypassing the answer session.
    pub async fn search(&self, term: &str) -> Result<SearchResults> {
        self.search_with(SearchParams::builder().term(term).mode(SearchMode::Vector).build())
            .await
    }

    /// Direct search with explicit parameters.
    pub async fn search_with(&self, params: SearchParams) -> Result<SearchResults> {
        if params.term.trim().is_empty() {
            return Err(MedchatError::InvalidArgument("search term is empty".into()));
        }
        self.session.backend().search(&params).await
    }

    /// Drop the conversation so far.
    pub fn clear(&self) {
        self.session.clear_session();
    }

    pub fn session(&self) -> &AnswerSession {
        &self.session
    }
}
