pub mod error;
pub mod http;
pub mod memory;
pub mod trait_client;

pub use error::{Result, StoreError};
pub use http::HttpConversationStore;
pub use memory::MemoryConversationStore;
pub use trait_client::ConversationStore;
