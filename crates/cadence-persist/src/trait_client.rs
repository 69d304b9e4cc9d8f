use async_trait::async_trait;

use cadence_types::{ChatSummary, Role, StoredMessage};

use crate::error::Result;

/// Persistence collaborator for chats and their messages
///
/// The session controller only ever hands finished turns to the store; it
/// never reads the store back while a run is in progress.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a chat and return its record (carrying the new id)
    async fn create_chat(&self, title: &str) -> Result<ChatSummary>;
    
    /// All chats, most recently updated first
    async fn list_chats(&self) -> Result<Vec<ChatSummary>>;
    
    /// Chats whose title or messages contain `query`
    async fn search_chats(&self, query: &str) -> Result<Vec<ChatSummary>>;
    
    async fn get_chat(&self, chat_id: &str) -> Result<Option<ChatSummary>>;
    
    /// Messages of a chat in conversation order
    async fn list_messages(&self, chat_id: &str) -> Result<Vec<StoredMessage>>;
    
    async fn append_message(&self, chat_id: &str, role: Role, content: &str) -> Result<StoredMessage>;
    
    async fn delete_messages(&self, chat_id: &str) -> Result<()>;
    
    /// Delete a chat together with its messages
    async fn delete_chat(&self, chat_id: &str) -> Result<()>;
}
