use std::pin::Pin;

use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;

use cadence_types::GenerationRequest;

/// Raw response body, chunked at whatever boundaries the transport chose
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// Remote generation service
///
/// Given the turn history, opens a streamed body in the `0:{json}` line
/// protocol. The returned stream ends when the service finishes.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn stream_chat(&self, request: GenerationRequest) -> Result<ChunkStream>;
}
