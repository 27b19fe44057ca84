//! Typed answer-session events and the observer they are dispatched to.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{Interaction, Message, SourceRecord};

/// One update emitted by an answer session.
///
/// Each variant corresponds to one named event slot of the session. Payloads
/// carry the full current value, never a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    MessagesChanged { messages: Vec<Message> },
    LoadingChanged { loading: bool },
    AnswerAborted { aborted: bool },
    SourcesChanged { sources: Vec<SourceRecord> },
    QueryTranslated { query: String },
    StateChanged { interactions: Vec<Interaction> },
    NewInteractionStarted { interaction_id: String },
}

impl SessionEvent {
    /// Route this event to the matching observer slot.
    pub fn dispatch<O: SessionObserver + ?Sized>(self, observer: &mut O) {
        match self {
            Self::MessagesChanged { messages } => observer.on_message_change(messages),
            Self::LoadingChanged { loading } => observer.on_message_loading(loading),
            Self::AnswerAborted { aborted } => observer.on_answer_aborted(aborted),
            Self::SourcesChanged { sources } => observer.on_source_change(sources),
            Self::QueryTranslated { query } => observer.on_query_translated(query),
            Self::StateChanged { interactions } => observer.on_state_change(interactions),
            Self::NewInteractionStarted { interaction_id } => {
                observer.on_new_interaction_started(interaction_id)
            }
        }
    }
}

/// Receiver of session events, one method per slot.
///
/// Every slot defaults to a no-op so observers only implement what they
/// render.
pub trait SessionObserver {
    fn on_message_change(&mut self, _messages: Vec<Message>) {}
    fn on_message_loading(&mut self, _loading: bool) {}
    fn on_answer_aborted(&mut self, _aborted: bool) {}
    fn on_source_change(&mut self, _sources: Vec<SourceRecord>) {}
    fn on_query_translated(&mut self, _query: String) {}
    fn on_state_change(&mut self, _interactions: Vec<Interaction>) {}
    fn on_new_interaction_started(&mut self, _interaction_id: String) {}
}

/// Callback the session pushes every event through.
pub type SessionEventSink = Arc<dyn Fn(SessionEvent) + Send + Sync>;
