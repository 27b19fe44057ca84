//! Chat view state and rendering.
//!
//! [`ChatState`] holds the local mirrors of the session (messages, loading
//! flag, sources) plus purely local state: the input line, the error banner
//! and the transcript scroll position. Mirrors change only through
//! [`SessionObserver`] callbacks; the rest changes only through user input.

pub mod markdown;
pub mod panel;
pub mod view;

use crate::error::MedchatError;
use crate::session::SessionObserver;
use crate::types::{Message, SourceRecord};

/// Most case panels shown at once.
pub const MAX_VISIBLE_SOURCES: usize = 3;

/// Input line command that clears the conversation.
pub const CLEAR_COMMAND: &str = "/clear";

/// What a submitted input line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A question for the answer session, trimmed.
    Ask(String),
    /// Start over with an empty conversation.
    Clear,
}

/// Dismissable notice shown after a failed question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub message: String,
}

/// Local state of the chat view.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    messages: Vec<Message>,
    loading: bool,
    sources: Vec<SourceRecord>,
    input: String,
    error: Option<ErrorBanner>,
    /// Lines scrolled up from the newest entry; 0 follows the tail.
    scroll_back: u16,
    tick: usize,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sources(&self) -> &[SourceRecord] {
        &self.sources
    }

    /// Sources that get a case panel.
    pub fn visible_sources(&self) -> &[SourceRecord] {
        let end = self.sources.len().min(MAX_VISIBLE_SOURCES);
        &self.sources[..end]
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    pub fn scroll_back(&self) -> u16 {
        self.scroll_back
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Take the input line for submission.
    ///
    /// Blank input is rejected and left in place. Anything else clears the
    /// input right away, before the question is known to succeed.
    pub fn submit(&mut self) -> Option<Submission> {
        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            return None;
        }
        let submission = if trimmed == CLEAR_COMMAND {
            Submission::Clear
        } else {
            Submission::Ask(trimmed.to_string())
        };
        self.input.clear();
        Some(submission)
    }

    /// Record a failed question by raising a banner.
    ///
    /// The loading flag is left to the session's own loading events, which
    /// stay true while any other question is still being answered.
    pub fn ask_failed(&mut self, err: &MedchatError) {
        self.error = Some(ErrorBanner {
            message: err.user_message(),
        });
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    /// Advance the loading animation.
    pub fn advance_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.scroll_back = 0;
        }
    }
}

impl SessionObserver for ChatState {
    fn on_message_change(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.scroll_back = 0;
    }

    fn on_message_loading(&mut self, loading: bool) {
        self.set_loading(loading);
    }

    fn on_source_change(&mut self, sources: Vec<SourceRecord>) {
        self.sources = sources;
    }
}
