use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use cadence_types::{ChatSummary, Role, StoredMessage};

use crate::error::{Result, StoreError};
use crate::trait_client::ConversationStore;

struct ChatEntry {
    summary: ChatSummary,
    messages: Vec<StoredMessage>,
    // Bumped on every write; orders chats when timestamps collide
    touched: u64,
}

#[derive(Default)]
struct Inner {
    chats: HashMap<String, ChatEntry>,
    clock: u64,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
    
    fn sorted(&self, mut keep: impl FnMut(&ChatEntry) -> bool) -> Vec<ChatSummary> {
        let mut entries: Vec<&ChatEntry> = self.chats.values().filter(|entry| keep(entry)).collect();
        entries.sort_by(|a, b| b.touched.cmp(&a.touched));
        entries.into_iter().map(|entry| entry.summary.clone()).collect()
    }
}

/// In-process conversation store
///
/// Full implementation of [`ConversationStore`] without a server behind it.
/// Contents live as long as the value does.
#[derive(Default)]
pub struct MemoryConversationStore {
    inner: RwLock<Inner>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn create_chat(&self, title: &str) -> Result<ChatSummary> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let summary = ChatSummary {
            id: uuid::Uuid::new_v4().to_string(),
            title: if title.is_empty() { "New Chat".to_string() } else { title.to_string() },
            created_at: Some(now),
            updated_at: Some(now),
        };
        
        let touched = inner.tick();
        inner.chats.insert(
            summary.id.clone(),
            ChatEntry {
                summary: summary.clone(),
                messages: Vec::new(),
                touched,
            },
        );
        
        Ok(summary)
    }
    
    async fn list_chats(&self) -> Result<Vec<ChatSummary>> {
        Ok(self.inner.read().await.sorted(|_| true))
    }
    
    async fn search_chats(&self, query: &str) -> Result<Vec<ChatSummary>> {
        let needle = query.to_lowercase();
        let inner = self.inner.read().await;
        
        Ok(inner.sorted(|entry| {
            entry.summary.title.to_lowercase().contains(&needle)
                || entry
                    .messages
                    .iter()
                    .any(|message| message.content.to_lowercase().contains(&needle))
        }))
    }
    
    async fn get_chat(&self, chat_id: &str) -> Result<Option<ChatSummary>> {
        let inner = self.inner.read().await;
        Ok(inner.chats.get(chat_id).map(|entry| entry.summary.clone()))
    }
    
    async fn list_messages(&self, chat_id: &str) -> Result<Vec<StoredMessage>> {
        let inner = self.inner.read().await;
        inner
            .chats
            .get(chat_id)
            .map(|entry| entry.messages.clone())
            .ok_or_else(|| StoreError::ChatNotFound(chat_id.to_string()))
    }
    
    async fn append_message(&self, chat_id: &str, role: Role, content: &str) -> Result<StoredMessage> {
        let mut inner = self.inner.write().await;
        let touched = inner.tick();
        let entry = inner
            .chats
            .get_mut(chat_id)
            .ok_or_else(|| StoreError::ChatNotFound(chat_id.to_string()))?;
        
        let now = Utc::now();
        let message = StoredMessage {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: chat_id.to_string(),
            role,
            content: content.to_string(),
            created_at: Some(now),
        };
        
        entry.messages.push(message.clone());
        entry.summary.updated_at = Some(now);
        entry.touched = touched;
        
        Ok(message)
    }
    
    async fn delete_messages(&self, chat_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .chats
            .get_mut(chat_id)
            .ok_or_else(|| StoreError::ChatNotFound(chat_id.to_string()))?;
        entry.messages.clear();
        Ok(())
    }
    
    async fn delete_chat(&self, chat_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .chats
            .remove(chat_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::ChatNotFound(chat_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[tokio::test]
    async fn test_messages_keep_order() {
        let store = MemoryConversationStore::new();
        let chat = store.create_chat("greeting").await.unwrap();
        
        store.append_message(&chat.id, Role::User, "hi").await.unwrap();
        store.append_message(&chat.id, Role::Assistant, "hello").await.unwrap();
        
        let messages = store.list_messages(&chat.id).await.unwrap();
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["hi", "hello"]);
        assert_eq!(messages[1].role, Role::Assistant);
    }
    
    #[tokio::test]
    async fn test_recently_updated_first() {
        let store = MemoryConversationStore::new();
        let older = store.create_chat("older").await.unwrap();
        let newer = store.create_chat("newer").await.unwrap();
        
        let ids: Vec<_> = store.list_chats().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, [newer.id.clone(), older.id.clone()]);
        
        store.append_message(&older.id, Role::User, "bump").await.unwrap();
        let ids: Vec<_> = store.list_chats().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, [older.id, newer.id]);
    }
    
    #[tokio::test]
    async fn test_search_matches_titles_and_messages() {
        let store = MemoryConversationStore::new();
        let rust = store.create_chat("Rust lifetimes").await.unwrap();
        let other = store.create_chat("Groceries").await.unwrap();
        store.append_message(&other.id, Role::User, "buy RUSTIC bread").await.unwrap();
        store.create_chat("Weather").await.unwrap();
        
        let found: Vec<_> = store.search_chats("rust").await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&rust.id));
        assert!(found.contains(&other.id));
    }
    
    #[tokio::test]
    async fn test_delete_chat_cascades() {
        let store = MemoryConversationStore::new();
        let chat = store.create_chat("gone").await.unwrap();
        store.append_message(&chat.id, Role::User, "x").await.unwrap();
        
        store.delete_chat(&chat.id).await.unwrap();
        
        assert!(store.get_chat(&chat.id).await.unwrap().is_none());
        assert!(matches!(
            store.list_messages(&chat.id).await,
            Err(StoreError::ChatNotFound(_))
        ));
        assert!(store.delete_chat(&chat.id).await.is_err());
    }
    
    #[tokio::test]
    async fn test_delete_messages_keeps_chat() {
        let store = MemoryConversationStore::new();
        let chat = store.create_chat("keep").await.unwrap();
        store.append_message(&chat.id, Role::User, "x").await.unwrap();
        
        store.delete_messages(&chat.id).await.unwrap();
        
        assert!(store.list_messages(&chat.id).await.unwrap().is_empty());
        assert!(store.get_chat(&chat.id).await.unwrap().is_some());
    }
}
