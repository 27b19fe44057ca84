//! medchat: terminal symptom chat over a hosted answer service.
//!
//! A demonstration client. Questions go to a hosted semantic-search-and-answer
//! service; the streamed reply and the most similar case records come back as
//! typed session events and are rendered in a terminal view. Nothing here
//! retrieves, ranks or generates on its own.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use medchat::prelude::*;
//!
//! # async fn example() -> medchat::error::Result<()> {
//! let config = MedchatConfig::from_env();
//! let client = OramaClient::new(&config)?;
//! let (adapter, mut events) = SessionAdapter::channel(Arc::new(client));
//!
//! let mut state = ChatState::new();
//! adapter.ask("I have a cough and fever").await?;
//! while let Ok(event) = events.try_recv() {
//!     event.dispatch(&mut state);
//! }
//! println!("{} messages", state.messages().len());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod session;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
