//! Shared test helpers and mock answer backend.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::json;
use tokio::sync::Notify;

use medchat::client::{AnswerBackend, AnswerChunk, AnswerRequest};
use medchat::error::{MedchatError, Result};
use medchat::session::{SessionEvent, SessionEventSink};
use medchat::types::{SearchParams, SearchResults, SourceRecord};

/// How the mock answers one question.
pub enum Script {
    /// Accept and stream these chunks.
    Chunks(Vec<AnswerChunk>),
    /// Refuse the question with an API error.
    Reject { status: u16, message: String },
    /// Stream these chunks, then fail.
    FailAfter(Vec<AnswerChunk>, String),
    /// Accept, then hold the stream until the gate is notified.
    Gated(Arc<Notify>, Vec<AnswerChunk>),
}

/// A mock backend that answers from queued scripts.
#[derive(Default)]
pub struct MockBackend {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<AnswerRequest>>,
    searches: Mutex<Vec<SearchParams>>,
    search_results: Mutex<Option<SearchResults>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    /// Queue a plain answer with sources.
    pub fn queue_answer(&self, text: &str, sources: Vec<SourceRecord>) {
        let mut chunks = vec![AnswerChunk::Sources(sources)];
        let words: Vec<&str> = text.split_inclusive(' ').collect();
        for part in words.chunks(3) {
            chunks.push(AnswerChunk::Text(part.concat()));
        }
        self.queue(Script::Chunks(chunks));
    }

    pub fn queue_reject(&self, status: u16, message: &str) {
        self.queue(Script::Reject {
            status,
            message: message.to_string(),
        });
    }

    pub fn set_search_results(&self, results: SearchResults) {
        *self.search_results.lock().unwrap() = Some(results);
    }

    pub fn requests(&self) -> Vec<AnswerRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn searches(&self) -> Vec<SearchParams> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerBackend for MockBackend {
    fn backend_name(&self) -> &str {
        "mock"
    }

    async fn answer(
        &self,
        request: &AnswerRequest,
    ) -> Result<BoxStream<'static, Result<AnswerChunk>>> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Script::Chunks(vec![AnswerChunk::Text("Mock answer".into())]));

        let stream = match script {
            Script::Reject { status, message } => {
                return Err(MedchatError::api(status, message));
            }
            Script::Chunks(chunks) => Box::pin(async_stream::stream! {
                for chunk in chunks {
                    yield Ok(chunk);
                }
            }) as BoxStream<'static, Result<AnswerChunk>>,
            Script::FailAfter(chunks, message) => Box::pin(async_stream::stream! {
                for chunk in chunks {
                    yield Ok(chunk);
                }
                yield Err(MedchatError::Stream(message));
            }),
            Script::Gated(gate, chunks) => Box::pin(async_stream::stream! {
                gate.notified().await;
                for chunk in chunks {
                    yield Ok(chunk);
                }
            }),
        };
        Ok(stream)
    }

    async fn search(&self, params: &SearchParams) -> Result<SearchResults> {
        self.searches.lock().unwrap().push(params.clone());
        Ok(self.search_results.lock().unwrap().clone().unwrap_or_default())
    }
}

/// A case record with every panel field filled in.
pub fn case(id: &str, disease: &str) -> SourceRecord {
    SourceRecord::new(
        id,
        0.87,
        json!({
            "Age": 30,
            "Gender": "Male",
            "Blood Pressure": "Normal",
            "Cholesterol Level": "Normal",
            "Cough": "Yes",
            "Fever": "Yes",
            "Fatigue": "Yes",
            "Difficulty Breathing": "No",
            "Disease": disease,
            "Outcome Variable": "Positive"
        }),
    )
}

/// A sink that records every event.
pub fn recording_sink() -> (SessionEventSink, Arc<Mutex<Vec<SessionEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let captured = events.clone();
    let sink: SessionEventSink = Arc::new(move |event| captured.lock().unwrap().push(event));
    (sink, events)
}

/// Yield until the backend has seen `count` answer requests.
pub async fn wait_for_requests(backend: &MockBackend, count: usize) {
    for _ in 0..1_000 {
        if backend.request_count() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("backend never received {count} requests");
}
