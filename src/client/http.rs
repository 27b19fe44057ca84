//! Shared HTTP client, SSE decoding, and status mapping.

use std::sync::OnceLock;
use std::time::Duration;

use tracing::warn;

use crate::error::MedchatError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
///
/// Only the connect phase is bounded: an answer stream stays open for as long
/// as the service keeps producing.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(4)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "HTTP client setup failed, falling back to defaults without connect timeout");
                reqwest::Client::new()
            })
    })
}

/// Parse an SSE "data:" line, returning None for "[DONE]" and non-data lines.
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    if data == "[DONE]" {
        return None;
    }
    Some(data)
}

/// Whether a line carries the stream terminator.
pub fn is_sse_done(line: &str) -> bool {
    matches!(
        line.strip_prefix("data:").map(str::trim),
        Some("[DONE]")
    )
}

/// Incremental line splitter for an SSE byte stream.
///
/// Bytes are buffered until a full line is available so multi-byte UTF-8
/// sequences split across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete, non-empty, non-comment line.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(line) = clean_line(&raw) {
                lines.push(line);
            }
        }
        lines
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.pending);
        clean_line(&raw)
    }
}

fn clean_line(raw: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    Some(line.to_string())
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> MedchatError {
    match status {
        401 | 403 => MedchatError::Authentication(body.to_string()),
        429 => MedchatError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => MedchatError::api(status, body),
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_client_is_built_once() {
        assert!(std::ptr::eq(shared_client(), shared_client()));
    }

    #[test]
    fn parse_sse_data_accepts_both_prefix_styles() {
        assert_eq!(parse_sse_data("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(parse_sse_data("data:{\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(parse_sse_data("data: [DONE]"), None);
        assert_eq!(parse_sse_data("event: message"), None);
    }

    #[test]
    fn done_marker_is_detected() {
        assert!(is_sse_done("data: [DONE]"));
        assert!(!is_sse_done("data: {}"));
    }

    #[test]
    fn line_buffer_joins_split_chunks() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(b"data: {\"type\":").is_empty());
        let lines = buffer.push(b"\"text\"}\n\n: keep-alive\ndata: x\n");
        assert_eq!(lines, vec!["data: {\"type\":\"text\"}", "data: x"]);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn line_buffer_keeps_multibyte_chars_split_across_chunks() {
        let text = "data: fièvre\n".as_bytes();
        let split = text.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(&text[..split]).is_empty());
        assert_eq!(buffer.push(&text[split..]), vec!["data: fièvre"]);
    }

    #[test]
    fn line_buffer_flushes_unterminated_tail() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(b"data: tail").is_empty());
        assert_eq!(buffer.finish().as_deref(), Some("data: tail"));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(status_to_error(401, "no"), MedchatError::Authentication(_)));
        assert!(matches!(
            status_to_error(429, r#"{"error":{"retry_after":1.5}}"#),
            MedchatError::RateLimited { retry_after_ms: Some(1500) }
        ));
        assert!(matches!(status_to_error(502, "bad gateway"), MedchatError::Api { status: 502, .. }));
    }
}
