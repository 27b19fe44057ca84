//! HTTP client for the hosted Orama answer/search service.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{MedchatConfig, ServiceCredentials};
use crate::error::{MedchatError, Result};
use crate::types::{SearchParams, SearchResults, SourceRecord};

use super::http::{is_sse_done, parse_sse_data, shared_client, status_to_error, SseLineBuffer};
use super::{AnswerBackend, AnswerChunk, AnswerRequest};

/// Client for one hosted index.
#[derive(Debug, Clone)]
pub struct OramaClient {
    credentials: ServiceCredentials,
}

impl OramaClient {
    /// Build a client, failing when the endpoint or API key is missing.
    pub fn new(config: &MedchatConfig) -> Result<Self> {
        Ok(Self::from_credentials(config.validate()?))
    }

    pub fn from_credentials(credentials: ServiceCredentials) -> Self {
        Self { credentials }
    }

    pub fn endpoint(&self) -> &str {
        self.credentials.endpoint.as_str()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.endpoint().trim_end_matches('/'))
    }

    async fn post_form(&self, path: &str, form: &[(&str, String)]) -> Result<reqwest::Response> {
        let resp = shared_client()
            .post(self.url(path))
            .query(&[("api-key", self.credentials.api_key.as_str())])
            .form(form)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }
        Ok(resp)
    }
}

#[async_trait]
impl AnswerBackend for OramaClient {
    fn backend_name(&self) -> &str {
        "orama"
    }

    async fn answer(
        &self,
        request: &AnswerRequest,
    ) -> Result<BoxStream<'static, Result<AnswerChunk>>> {
        debug!(
            interaction_id = %request.interaction_id,
            history = request.messages.len(),
            "Orama answer"
        );

        let form = [
            ("type", request.inference_type.to_string()),
            ("query", request.query.clone()),
            ("messages", serde_json::to_string(&request.messages)?),
            ("conversationId", request.conversation_id.clone()),
            ("interactionId", request.interaction_id.clone()),
            ("userContext", request.user_context.clone()),
        ];
        let resp = self.post_form("answer", &form).await?;
        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut lines = SseLineBuffer::new();
            futures::pin_mut!(byte_stream);

            'read: while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(MedchatError::Network(e));
                        break;
                    }
                };

                for line in lines.push(&chunk) {
                    if is_sse_done(&line) {
                        break 'read;
                    }
                    if let Some(chunk) = parse_sse_data(&line).and_then(decode_event) {
                        yield Ok(chunk);
                    }
                }
            }

            if let Some(line) = lines.finish() {
                if let Some(chunk) = parse_sse_data(&line).and_then(decode_event) {
                    yield Ok(chunk);
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn search(&self, params: &SearchParams) -> Result<SearchResults> {
        debug!(term = %params.term, mode = %params.mode, "Orama search");

        let form = [("q", serde_json::to_string(params)?)];
        let resp = self.post_form("search", &form).await?;
        let results: SearchResults = resp.json().await?;
        Ok(results)
    }
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Value,
}

/// Decode one SSE data payload. Unknown or malformed events are skipped.
pub(crate) fn decode_event(data: &str) -> Option<AnswerChunk> {
    let event: WireEvent = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Skipping unparseable answer event");
            return None;
        }
    };

    match event.kind.as_str() {
        "text" => Some(AnswerChunk::Text(as_text(event.message))),
        "query-translated" => Some(AnswerChunk::QueryTranslated(as_text(event.message))),
        "sources" => match decode_sources(unwrap_json_string(event.message)) {
            Some(sources) => Some(AnswerChunk::Sources(sources)),
            None => {
                warn!("Skipping malformed sources event");
                None
            }
        },
        "related-queries" => {
            let queries = match unwrap_json_string(event.message) {
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|q| q.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            };
            Some(AnswerChunk::RelatedQueries(queries))
        }
        other => {
            debug!(kind = other, "Ignoring answer event");
            None
        }
    }
}

fn as_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// Some payloads arrive JSON-encoded inside a string.
fn unwrap_json_string(value: Value) -> Value {
    match value {
        Value::String(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
        other => other,
    }
}

fn decode_sources(value: Value) -> Option<Vec<SourceRecord>> {
    let hits = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("hits") {
            Some(Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };
    Some(
        hits.into_iter()
            .filter_map(|hit| serde_json::from_value(hit).ok())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_text_and_translated_query() {
        assert_eq!(
            decode_event(r#"{"type":"text","message":"You may"}"#),
            Some(AnswerChunk::Text("You may".into()))
        );
        assert_eq!(
            decode_event(r#"{"type":"query-translated","message":{"term":"cough"}}"#),
            Some(AnswerChunk::QueryTranslated(r#"{"term":"cough"}"#.into()))
        );
    }

    #[test]
    fn decodes_sources_from_array_object_or_string() {
        let array = r#"{"type":"sources","message":[{"id":"1","score":0.9,"document":{"Disease":"Flu"}}]}"#;
        let object = r#"{"type":"sources","message":{"count":1,"hits":[{"id":"1","score":0.9,"document":{"Disease":"Flu"}}]}}"#;
        let string = r#"{"type":"sources","message":"[{\"id\":\"1\",\"score\":0.9,\"document\":{\"Disease\":\"Flu\"}}]"}"#;

        for payload in [array, object, string] {
            match decode_event(payload) {
                Some(AnswerChunk::Sources(sources)) => {
                    assert_eq!(sources.len(), 1);
                    assert_eq!(sources[0].id, "1");
                }
                other => panic!("expected sources, got {other:?}"),
            }
        }
    }

    #[test]
    fn decodes_related_queries() {
        assert_eq!(
            decode_event(r#"{"type":"related-queries","message":"[\"Is it contagious?\"]"}"#),
            Some(AnswerChunk::RelatedQueries(vec!["Is it contagious?".into()]))
        );
    }

    #[test]
    fn skips_unknown_and_malformed_events() {
        assert_eq!(decode_event("not json"), None);
        assert_eq!(decode_event(r#"{"type":"telemetry","message":1}"#), None);
        assert_eq!(decode_event(r#"{"type":"sources","message":42}"#), None);
    }

    #[test]
    fn new_rejects_missing_configuration() {
        let err = OramaClient::new(&MedchatConfig::new()).unwrap_err();
        assert!(matches!(err, MedchatError::Configuration(_)));
    }
}
