//! Convenience re-exports for common use.

pub use crate::adapter::SessionAdapter;
pub use crate::chat::{ChatState, Submission};
pub use crate::client::{AnswerBackend, AnswerChunk, AnswerRequest, OramaClient};
pub use crate::config::MedchatConfig;
pub use crate::error::{MedchatError, Result};
pub use crate::session::{AnswerSession, SessionEvent, SessionObserver};
pub use crate::types::{Message, Role, SearchMode, SearchParams, SearchResults, SourceRecord};
