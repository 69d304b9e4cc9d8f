pub mod accumulator;
pub mod buffer_utils;
pub mod client;
pub mod streaming;
pub mod traits;

pub use accumulator::{AccumulatorUpdate, MessageAccumulator};
pub use buffer_utils::LineBuffer;
pub use client::HttpGenerationClient;
pub use streaming::{decode_chunks, DecodeStream, StreamDecoder, EVENT_PREFIX};
pub use traits::{ChunkStream, GenerationClient};

pub use cadence_types::{DecodeResult, Segment, StreamEvent};
