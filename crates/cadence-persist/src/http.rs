use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use cadence_types::{ChatSummary, Role, StoredMessage};

use crate::error::{Result, StoreError};
use crate::trait_client::ConversationStore;

#[derive(Serialize)]
struct CreateChatBody<'a> {
    title: &'a str,
}

#[derive(Serialize)]
struct AppendMessageBody<'a> {
    role: Role,
    content: &'a str,
}

/// Conversation store reached over its REST surface
///
/// Routes (relative to the base URL):
/// `POST /chats`, `GET /chats`, `GET /chats/search?q=`, `GET|DELETE /chats/{id}`,
/// `GET|POST|DELETE /chats/{id}/messages`.
pub struct HttpConversationStore {
    client: Client,
    base_url: Url,
}

impl HttpConversationStore {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Internal(format!("Invalid store URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Internal(format!("Store URL cannot be a base: {}", base_url)));
        }
        
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        
        Ok(Self { client, base_url })
    }
    
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Internal(format!("Store URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
    
    /// Turn a non-success status into an error, reading the body for context
    async fn check(&self, response: reqwest::Response, chat_id: Option<&str>) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        
        if status == StatusCode::NOT_FOUND {
            if let Some(chat_id) = chat_id {
                return Err(StoreError::ChatNotFound(chat_id.to_string()));
            }
        }
        
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response body".to_string());
        
        tracing::error!("Store request failed: status={}, body={}", status, body);
        
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
    
    async fn json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ConversationStore for HttpConversationStore {
    async fn create_chat(&self, title: &str) -> Result<ChatSummary> {
        let response = self
            .client
            .post(self.url(&["chats"])?)
            .json(&CreateChatBody { title })
            .send()
            .await?;
        
        let response = self.check(response, None).await?;
        Self::json(response).await
    }
    
    async fn list_chats(&self) -> Result<Vec<ChatSummary>> {
        let response = self.client.get(self.url(&["chats"])?).send().await?;
        
        let response = self.check(response, None).await?;
        Self::json(response).await
    }
    
    async fn search_chats(&self, query: &str) -> Result<Vec<ChatSummary>> {
        let response = self
            .client
            .get(self.url(&["chats", "search"])?)
            .query(&[("q", query)])
            .send()
            .await?;
        
        let response = self.check(response, None).await?;
        Self::json(response).await
    }
    
    async fn get_chat(&self, chat_id: &str) -> Result<Option<ChatSummary>> {
        let response = self.client.get(self.url(&["chats", chat_id])?).send().await?;
        
        match self.check(response, Some(chat_id)).await {
            Ok(response) => Self::json(response).await.map(Some),
            Err(StoreError::ChatNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
    
    async fn list_messages(&self, chat_id: &str) -> Result<Vec<StoredMessage>> {
        let response = self
            .client
            .get(self.url(&["chats", chat_id, "messages"])?)
            .send()
            .await?;
        
        let response = self.check(response, Some(chat_id)).await?;
        Self::json(response).await
    }
    
    async fn append_message(&self, chat_id: &str, role: Role, content: &str) -> Result<StoredMessage> {
        let response = self
            .client
            .post(self.url(&["chats", chat_id, "messages"])?)
            .json(&AppendMessageBody { role, content })
            .send()
            .await?;
        
        let response = self.check(response, Some(chat_id)).await?;
        Self::json(response).await
    }
    
    async fn delete_messages(&self, chat_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&["chats", chat_id, "messages"])?)
            .send()
            .await?;
        
        self.check(response, Some(chat_id)).await?;
        Ok(())
    }
    
    async fn delete_chat(&self, chat_id: &str) -> Result<()> {
        let response = self.client.delete(self.url(&["chats", chat_id])?).send().await?;
        
        self.check(response, Some(chat_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_url_joins_segments_under_base_path() {
        let store = HttpConversationStore::new("http://localhost:8000/api/").unwrap();
        let url = store.url(&["chats", "a b", "messages"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/chats/a%20b/messages");
    }
    
    #[test]
    fn test_rejects_bad_url() {
        assert!(HttpConversationStore::new("not a url").is_err());
        assert!(HttpConversationStore::new("mailto:someone@example.com").is_err());
    }
}
