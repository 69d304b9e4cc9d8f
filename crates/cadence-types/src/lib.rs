pub mod events;
pub mod records;
pub mod state;

pub use events::{DecodeResult, Segment, StreamEvent};
pub use records::{ChatSummary, GenerationRequest, OutboundMessage, StoredMessage};
pub use state::{
    derive_title, ChatSession, ConversationTurn, Role, Transcript, TITLE_ELLIPSIS, TITLE_MAX_CHARS,
};
