//! Stateful answer session over an [`AnswerBackend`].
//!
//! The session owns the authoritative transcript and the list of
//! interactions. Every change is reported through the event sink as a full
//! snapshot, so observers can mirror it without merge logic.

pub mod events;

pub use events::{SessionEvent, SessionEventSink, SessionObserver};

use std::sync::{Arc, Mutex, MutexGuard};

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::{AnswerBackend, AnswerChunk, AnswerRequest};
use crate::error::{MedchatError, Result};
use crate::types::{InferenceType, Interaction, Message};

/// Settings an answer session is created with.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub user_context: String,
    pub inference_type: InferenceType,
    pub initial_messages: Vec<Message>,
}

/// A long-lived conversational session.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct AnswerSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    backend: Arc<dyn AnswerBackend>,
    conversation_id: String,
    user_context: String,
    inference_type: InferenceType,
    sink: SessionEventSink,
    state: Mutex<SessionState>,
}

#[derive(Default)]
struct SessionState {
    messages: Vec<Message>,
    interactions: Vec<Interaction>,
    in_flight: Vec<(String, CancellationToken)>,
}

impl AnswerSession {
    /// Create a session. Events are pushed through `sink` while the session
    /// lock is held, so the sink must not block or call back into the
    /// session.
    pub fn new(
        backend: Arc<dyn AnswerBackend>,
        config: SessionConfig,
        sink: SessionEventSink,
    ) -> Self {
        let state = SessionState {
            messages: config.initial_messages,
            ..Default::default()
        };
        Self {
            inner: Arc::new(SessionInner {
                backend,
                conversation_id: Uuid::new_v4().to_string(),
                user_context: config.user_context,
                inference_type: config.inference_type,
                sink,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.inner.conversation_id
    }

    pub fn backend(&self) -> &Arc<dyn AnswerBackend> {
        &self.inner.backend
    }

    /// Snapshot of the transcript.
    pub fn messages(&self) -> Vec<Message> {
        self.state().messages.clone()
    }

    /// Snapshot of every interaction so far.
    pub fn interactions(&self) -> Vec<Interaction> {
        self.state().interactions.clone()
    }

    /// Whether any question is still being answered.
    pub fn is_loading(&self) -> bool {
        !self.state().in_flight.is_empty()
    }

    /// Ask a question and drive its answer stream to completion.
    ///
    /// Progress is reported only through events. The returned string is the
    /// final answer text, partial if the answer was aborted. When the
    /// service refuses the question the transcript is left untouched.
    pub async fn ask(&self, term: impl Into<String>) -> Result<String> {
        let query = term.into();
        if query.trim().is_empty() {
            return Err(MedchatError::InvalidArgument("question is empty".into()));
        }

        let interaction_id = Uuid::new_v4().to_string();
        let cancel = CancellationToken::new();
        let history = {
            let mut state = self.state();
            state
                .interactions
                .push(Interaction::new(&interaction_id, &query));
            state.in_flight.push((interaction_id.clone(), cancel.clone()));
            self.emit(SessionEvent::NewInteractionStarted {
                interaction_id: interaction_id.clone(),
            });
            self.emit(SessionEvent::LoadingChanged { loading: true });
            self.emit(SessionEvent::StateChanged {
                interactions: state.interactions.clone(),
            });
            state.messages.clone()
        };

        info!(
            backend = self.inner.backend.backend_name(),
            interaction_id = %interaction_id,
            "Interaction started"
        );

        let request = AnswerRequest {
            conversation_id: self.inner.conversation_id.clone(),
            interaction_id: interaction_id.clone(),
            query: query.clone(),
            messages: history,
            user_context: self.inner.user_context.clone(),
            inference_type: self.inner.inference_type,
        };

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            opened = self.inner.backend.answer(&request) => Some(opened),
        };
        let mut stream = match opened {
            None => {
                self.finish(&interaction_id, None, true);
                return Ok(String::new());
            }
            Some(Err(err)) => {
                self.finish(&interaction_id, Some(&err), false);
                return Err(err);
            }
            Some(Ok(stream)) => stream,
        };

        let assistant_index = {
            let mut state = self.state();
            if cancel.is_cancelled() {
                None
            } else {
                state.messages.push(Message::user(&query));
                state.messages.push(Message::assistant(""));
                self.emit(SessionEvent::MessagesChanged {
                    messages: state.messages.clone(),
                });
                Some(state.messages.len() - 1)
            }
        };
        let Some(assistant_index) = assistant_index else {
            self.finish(&interaction_id, None, true);
            return Ok(String::new());
        };

        let mut failure = None;
        let mut aborted = false;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    aborted = true;
                    break;
                }
                next = stream.next() => next,
            };
            match next {
                Some(Ok(chunk)) => {
                    if !self.apply_chunk(&interaction_id, assistant_index, &cancel, chunk) {
                        aborted = true;
                        break;
                    }
                }
                Some(Err(err)) => {
                    failure = Some(err);
                    break;
                }
                None => break,
            }
        }

        let response = self.finish(&interaction_id, failure.as_ref(), aborted);
        match failure {
            Some(err) => Err(err),
            None => Ok(response),
        }
    }

    /// Cancel the most recent in-flight answer. Returns whether one was running.
    pub fn abort_answer(&self) -> bool {
        let state = self.state();
        match state.in_flight.last() {
            Some((id, token)) => {
                debug!(interaction_id = %id, "Aborting answer");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Drop the transcript and interaction history, aborting anything in flight.
    pub fn clear_session(&self) {
        let mut state = self.state();
        for (_, token) in state.in_flight.drain(..) {
            token.cancel();
        }
        state.messages.clear();
        state.interactions.clear();
        self.emit(SessionEvent::MessagesChanged { messages: Vec::new() });
        self.emit(SessionEvent::LoadingChanged { loading: false });
        self.emit(SessionEvent::StateChanged {
            interactions: Vec::new(),
        });
        info!(conversation_id = %self.inner.conversation_id, "Session cleared");
    }

    /// Apply one chunk. Returns false when the answer was cancelled meanwhile.
    fn apply_chunk(
        &self,
        interaction_id: &str,
        assistant_index: usize,
        cancel: &CancellationToken,
        chunk: AnswerChunk,
    ) -> bool {
        let mut state = self.state();
        if cancel.is_cancelled() {
            return false;
        }

        match chunk {
            AnswerChunk::Text(text) => {
                if text.is_empty() {
                    return true;
                }
                if let Some(message) = state.messages.get_mut(assistant_index) {
                    message.content.push_str(&text);
                }
                if let Some(interaction) = find_interaction(&mut state, interaction_id) {
                    interaction.response.push_str(&text);
                }
                self.emit(SessionEvent::MessagesChanged {
                    messages: state.messages.clone(),
                });
            }
            AnswerChunk::Sources(sources) => {
                if let Some(interaction) = find_interaction(&mut state, interaction_id) {
                    interaction.sources = sources.clone();
                }
                self.emit(SessionEvent::SourcesChanged { sources });
            }
            AnswerChunk::QueryTranslated(query) => {
                if let Some(interaction) = find_interaction(&mut state, interaction_id) {
                    interaction.translated_query = Some(query.clone());
                }
                self.emit(SessionEvent::QueryTranslated { query });
            }
            AnswerChunk::RelatedQueries(queries) => {
                if let Some(interaction) = find_interaction(&mut state, interaction_id) {
                    interaction.related_queries = queries;
                }
            }
        }
        true
    }

    /// Close out an interaction and report the final loading state.
    fn finish(&self, interaction_id: &str, error: Option<&MedchatError>, aborted: bool) -> String {
        let mut state = self.state();
        state.in_flight.retain(|(id, _)| id != interaction_id);

        let mut response = String::new();
        if let Some(interaction) = find_interaction(&mut state, interaction_id) {
            interaction.loading = false;
            interaction.aborted = aborted;
            interaction.error = error.map(|e| e.to_string());
            response = interaction.response.clone();
        }

        match (error, aborted) {
            (Some(err), _) => warn!(interaction_id, error = %err, "Interaction failed"),
            (None, true) => info!(interaction_id, "Interaction aborted"),
            (None, false) => info!(interaction_id, chars = response.len(), "Interaction completed"),
        }

        if aborted {
            self.emit(SessionEvent::AnswerAborted { aborted: true });
        }
        self.emit(SessionEvent::LoadingChanged {
            loading: !state.in_flight.is_empty(),
        });
        self.emit(SessionEvent::StateChanged {
            interactions: state.interactions.clone(),
        });
        response
    }

    fn emit(&self, event: SessionEvent) {
        (self.inner.sink)(event);
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn find_interaction<'a>(
    state: &'a mut SessionState,
    interaction_id: &str,
) -> Option<&'a mut Interaction> {
    state
        .interactions
        .iter_mut()
        .find(|i| i.interaction_id == interaction_id)
}
