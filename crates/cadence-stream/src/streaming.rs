use std::pin::Pin;

use anyhow::Result;
use futures::{Stream, StreamExt};

use cadence_types::{DecodeResult, StreamEvent};

use crate::buffer_utils::LineBuffer;
use crate::traits::ChunkStream;

/// Marks a line whose remainder is a JSON-encoded [`StreamEvent`]
pub const EVENT_PREFIX: &str = "0:";

pub type DecodeStream = Pin<Box<dyn Stream<Item = Result<DecodeResult>> + Send>>;

/// Incremental decoder for the `0:{json}` line protocol
///
/// Decoding is total: a line that carries the prefix but does not parse as
/// an event becomes literal text. Any trailing partial line is held until
/// its newline arrives or [`StreamDecoder::finish`] is called.
#[derive(Default)]
pub struct StreamDecoder {
    pending: LineBuffer,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every line completed by `chunk`
    pub fn feed(&mut self, chunk: &[u8]) -> DecodeResult {
        self.pending.extend(chunk);

        let mut result = DecodeResult::new();
        while let Some(line) = self.pending.next_line() {
            decode_line(&line, &mut result);
        }
        result
    }

    /// Flush the pending partial line at end of stream
    pub fn finish(&mut self) -> DecodeResult {
        let mut result = DecodeResult::new();
        if let Some(line) = self.pending.take_remainder() {
            decode_line(&line, &mut result);
        }
        result
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

fn decode_line(line: &str, result: &mut DecodeResult) {
    if line.trim().is_empty() {
        return;
    }

    if let Some(payload) = line.strip_prefix(EVENT_PREFIX) {
        match serde_json::from_str::<StreamEvent>(payload) {
            Ok(event) => {
                result.push_event(event);
                return;
            }
            Err(e) => {
                tracing::debug!("Malformed event line kept as text: {}", e);
            }
        }
    }

    result.push_literal(line);
}

/// Decode a body chunk stream, yielding one result per chunk plus the
/// end-of-stream flush. Transport errors are passed through untouched.
pub fn decode_chunks(chunks: ChunkStream) -> DecodeStream {
    Box::pin(async_stream::stream! {
        let mut chunks = chunks;
        let mut decoder = StreamDecoder::new();

        while let Some(chunk_result) = chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    tracing::debug!(bytes = bytes.len(), "Received body chunk");
                    let decoded = decoder.feed(&bytes);
                    if !decoded.is_empty() {
                        yield Ok(decoded);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            yield Ok(tail);
        }
    })
}
