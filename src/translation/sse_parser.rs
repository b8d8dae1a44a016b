//! Server-Sent Events decoding for streaming chat completions.

use bytes::Bytes;
use futures_util::Stream;
use serde::Deserialize;

use super::error::TranslateError;

#[derive(Debug, Deserialize)]
struct StreamResponse {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

/// One decoded SSE event that matters to us.
#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    Text(String),
    Done,
}

/// Incremental line decoder. Chunks may split lines (and UTF-8 sequences)
/// anywhere, so bytes are buffered until a newline arrives.
#[derive(Debug, Default)]
struct SseDecoder {
    pending: Vec<u8>,
}

impl SseDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line_bytes: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(event) = decode_line(&line_bytes) {
                let done = event == SseEvent::Done;
                events.push(event);
                if done {
                    break;
                }
            }
        }
        events
    }

    /// Decodes a final line that arrived without a trailing newline.
    fn finish(&mut self) -> Option<SseEvent> {
        let rest = std::mem::take(&mut self.pending);
        decode_line(&rest)
    }
}

fn decode_line(bytes: &[u8]) -> Option<SseEvent> {
    let line = String::from_utf8_lossy(bytes);
    let line = line.trim();

    if line == "data: [DONE]" || line == "data:[DONE]" {
        return Some(SseEvent::Done);
    }
    parse_sse_line(line).map(SseEvent::Text)
}

/// Converts a raw SSE byte stream into a stream of text chunks.
///
/// A stream that ends without `data: [DONE]` yields a trailing
/// [`TranslateError::Stream`], so a cut-off reply is never taken as complete.
pub fn sse_to_text_stream(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
) -> impl Stream<Item = Result<String, TranslateError>> + Send {
    async_stream::stream! {
        use futures_util::StreamExt;

        let mut byte_stream = std::pin::pin!(byte_stream);
        let mut decoder = SseDecoder::default();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    yield Err(TranslateError::Stream(e.to_string()));
                    return;
                }
            };

            for event in decoder.feed(&chunk) {
                match event {
                    SseEvent::Text(text) => {
                        yield Ok(text);
                    }
                    SseEvent::Done => return,
                }
            }
        }

        match decoder.finish() {
            Some(SseEvent::Done) => {}
            Some(SseEvent::Text(text)) => {
                yield Ok(text);
                yield Err(incomplete());
            }
            None => {
                yield Err(incomplete());
            }
        }
    }
}

fn incomplete() -> TranslateError {
    TranslateError::Stream("stream ended before completion".to_string())
}

/// Extracts the delta text from a single trimmed `data:` line.
///
/// Returns `None` for comments, blank lines, empty deltas and malformed JSON.
fn parse_sse_line(line: &str) -> Option<String> {
    let json_str = line.strip_prefix("data:")?.trim_start();

    let response = serde_json::from_str::<StreamResponse>(json_str).ok()?;

    let content: String = response
        .choices
        .into_iter()
        .filter_map(|c| c.delta.content)
        .collect();

    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[test]
    fn test_parse_sse_line_with_content() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#;
        assert_eq!(parse_sse_line(line), Some("Hello".to_string()));
    }

    #[test]
    fn test_parse_sse_line_without_space_after_colon() {
        let line = r#"data:{"choices":[{"delta":{"content":"Hi"}}]}"#;
        assert_eq!(parse_sse_line(line), Some("Hi".to_string()));
    }

    #[test]
    fn test_parse_sse_line_with_null_content() {
        let line = r#"data: {"choices":[{"delta":{}}]}"#;
        assert_eq!(parse_sse_line(line), None);
    }

    #[test]
    fn test_parse_sse_line_ignores_non_data() {
        assert_eq!(parse_sse_line(": keep-alive"), None);
        assert_eq!(parse_sse_line(""), None);
        assert_eq!(parse_sse_line("data: not json"), None);
    }

    #[test]
    fn test_decoder_handles_split_lines() {
        let mut decoder = SseDecoder::default();
        let first = decoder.feed(br#"data: {"choices":[{"delta":{"con"#);
        assert!(first.is_empty());

        let second = decoder.feed(b"tent\":\"Bon\"}}]}\n\ndata: [DONE]\n");
        assert_eq!(
            second,
            vec![SseEvent::Text("Bon".to_string()), SseEvent::Done]
        );
    }

    #[test]
    fn test_decoder_handles_split_utf8() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"日本\"}}]}\n".as_bytes();
        // Split in the middle of the first multi-byte character.
        let split = line.iter().position(|b| *b >= 0x80).unwrap() + 1;

        let mut decoder = SseDecoder::default();
        assert!(decoder.feed(&line[..split]).is_empty());
        assert_eq!(
            decoder.feed(&line[split..]),
            vec![SseEvent::Text("日本".to_string())]
        );
    }

    #[tokio::test]
    async fn test_stream_stops_at_done() {
        let chunks: Vec<reqwest::Result<Bytes>> = vec![
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n",
            )),
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\ndata: [DONE]\n",
            )),
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n",
            )),
        ];

        let stream = sse_to_text_stream(futures_util::stream::iter(chunks));
        let collected: Vec<String> = stream.map(Result::unwrap).collect().await;

        assert_eq!(collected, vec!["Hello".to_string(), " world".to_string()]);
    }

    #[tokio::test]
    async fn test_stream_without_done_is_an_error() {
        let chunks: Vec<reqwest::Result<Bytes>> = vec![Ok(Bytes::from_static(
            "data: {\"choices\":[{\"delta\":{\"content\":\"你好\"}}]}\n\n".as_bytes(),
        ))];

        let stream = sse_to_text_stream(futures_util::stream::iter(chunks));
        let items: Vec<Result<String, TranslateError>> = stream.collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "你好");
        assert!(matches!(items[1], Err(TranslateError::Stream(_))));
    }

    #[tokio::test]
    async fn test_done_without_trailing_newline() {
        let chunks: Vec<reqwest::Result<Bytes>> = vec![Ok(Bytes::from_static(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]",
        ))];

        let stream = sse_to_text_stream(futures_util::stream::iter(chunks));
        let collected: Vec<String> = stream.map(Result::unwrap).collect().await;

        assert_eq!(collected, vec!["Hi".to_string()]);
    }
}
