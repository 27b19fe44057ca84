//! Core data types shared by the session and the chat view.

pub mod interaction;
pub mod message;
pub mod search;
pub mod source;

pub use interaction::Interaction;
pub use message::{Message, Role};
pub use search::{InferenceType, SearchElapsed, SearchMode, SearchParams, SearchResults};
pub use source::{CaseField, SourceRecord};
