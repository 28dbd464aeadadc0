//! Server-sent-event token streaming.
//!
//! OpenAI-compatible endpoints stream completions as SSE `data:` lines, each
//! carrying a JSON chunk with a content delta, terminated by a `[DONE]`
//! sentinel. The stream is consumed cooperatively by a single consumer in
//! order; simple concatenation of the yielded fragments reconstructs the
//! completion.

use async_stream::try_stream;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;

use crate::error::LlmError;

/// A lazy, finite sequence of completion text fragments.
pub type TokenStream = BoxStream<'static, Result<String, LlmError>>;

/// One parsed SSE line.
#[derive(Debug, PartialEq)]
enum SseEvent {
    /// A content fragment to yield.
    Fragment(String),
    /// The `[DONE]` terminator.
    Done,
    /// Keep-alives, role-only deltas, empty lines.
    Ignore,
}

/// A streamed completion chunk.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Wraps an SSE response body into a [`TokenStream`].
pub(crate) fn sse_token_stream(response: reqwest::Response) -> TokenStream {
    let stream = try_stream! {
        let mut bytes = response.bytes_stream();
        let mut buffer = String::new();

        'outer: while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(|e| LlmError::StreamInterrupted(e.to_string()))?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(pos) = buffer.find('\n') {
                let line: String = buffer.drain(..=pos).collect();
                match parse_sse_line(line.trim())? {
                    SseEvent::Fragment(text) => yield text,
                    SseEvent::Done => break 'outer,
                    SseEvent::Ignore => {}
                }
            }
        }
    };

    Box::pin(stream)
}

/// Parses one SSE line into an event.
fn parse_sse_line(line: &str) -> Result<SseEvent, LlmError> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseEvent::Ignore);
    };
    let data = data.trim();

    if data.is_empty() {
        return Ok(SseEvent::Ignore);
    }
    if data == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| LlmError::ParseError(format!("Malformed stream chunk: {}", e)))?;

    match chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
    {
        Some(content) if !content.is_empty() => Ok(SseEvent::Fragment(content)),
        _ => Ok(SseEvent::Ignore),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_fragment() {
        let line = r#"data: {"choices":[{"delta":{"content":"impo"}}]}"#;
        assert_eq!(
            parse_sse_line(line).unwrap(),
            SseEvent::Fragment("impo".to_string())
        );
    }

    #[test]
    fn test_parse_done_sentinel() {
        assert_eq!(parse_sse_line("data: [DONE]").unwrap(), SseEvent::Done);
    }

    #[test]
    fn test_role_only_delta_is_ignored() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_sse_line(line).unwrap(), SseEvent::Ignore);
    }

    #[test]
    fn test_non_data_lines_are_ignored() {
        assert_eq!(parse_sse_line("").unwrap(), SseEvent::Ignore);
        assert_eq!(parse_sse_line(": keep-alive").unwrap(), SseEvent::Ignore);
        assert_eq!(
            parse_sse_line("event: completion").unwrap(),
            SseEvent::Ignore
        );
    }

    #[test]
    fn test_malformed_chunk_is_an_error() {
        let err = parse_sse_line("data: {not json").unwrap_err();
        assert!(matches!(err, LlmError::ParseError(_)));
    }

    #[test]
    fn test_empty_choices_is_ignored() {
        let line = r#"data: {"choices":[]}"#;
        assert_eq!(parse_sse_line(line).unwrap(), SseEvent::Ignore);
    }
}
