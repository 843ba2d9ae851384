//! Decoding of server-sent-event chat streams.
//!
//! Chat-completions endpoints stream as `data: <json>` lines terminated by
//! a `data: [DONE]` sentinel. The decoder buffers lines across chunk
//! boundaries, drops lines that fail to parse, and goes quiet permanently
//! once the sentinel is seen.

use serde_json::Value;

/// Incremental decoder for a `data:`-framed SSE body.
///
/// Feed raw chunks as they arrive; complete JSON payloads come back out.
/// Malformed JSON lines are dropped without error. After `[DONE]` the
/// decoder ignores all further input, including the remainder of the chunk
/// the sentinel arrived in.
///
/// # Example
///
/// ```
/// use llm_workflow::transport::sse::SseDecoder;
///
/// let mut decoder = SseDecoder::new();
/// let body = b"data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\ndata: [DONE]\n\n";
/// let payloads = decoder.feed(body);
/// assert_eq!(payloads.len(), 1);
/// assert!(decoder.is_done());
/// ```
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: String,
    done: bool,
}

impl SseDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the `[DONE]` sentinel has been consumed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one chunk of the response body, returning decoded payloads.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Value> {
        let mut out = Vec::new();
        if self.done {
            return out;
        }

        self.buf.push_str(&String::from_utf8_lossy(chunk));
        while let Some(end) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=end).collect();
            self.accept(line.trim(), &mut out);
            if self.done {
                self.buf.clear();
                break;
            }
        }
        out
    }

    /// Drain whatever is left in the buffer.
    ///
    /// For bodies that close without a `[DONE]` sentinel, this recovers a
    /// final line that never got its newline.
    pub fn finish(&mut self) -> Vec<Value> {
        let mut out = Vec::new();
        let rest = std::mem::take(&mut self.buf);
        if self.done {
            return out;
        }

        for line in rest.lines() {
            self.accept(line.trim(), &mut out);
            if self.done {
                break;
            }
        }
        out
    }

    /// Handle one complete line.
    fn accept(&mut self, line: &str, out: &mut Vec<Value>) {
        // Comment, `event:`, and empty keep-alive lines carry no payload.
        let payload = match line.strip_prefix("data:") {
            Some(rest) => rest.trim(),
            None => return,
        };

        if payload == "[DONE]" {
            self.done = true;
        } else if let Ok(value) = serde_json::from_str(payload) {
            out.push(value);
        }
    }
}
