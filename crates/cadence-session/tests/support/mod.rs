#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Notify;

use cadence_persist::{ConversationStore, MemoryConversationStore, StoreError};
use cadence_session::{SessionBuilder, SessionHandle};
use cadence_stream::{ChunkStream, GenerationClient};
use cadence_types::{ChatSummary, GenerationRequest, Role, StoredMessage};

/// One step of a scripted response
#[derive(Clone)]
pub enum Step {
    /// Deliver these bytes as one body chunk
    Chunk(String),
    /// Wait until the gate is notified
    Gate(Arc<Notify>),
    /// Fail the body stream
    Fail(String),
    /// Never produce anything again
    Hang,
}

/// What `stream_chat` does for one request
#[derive(Clone)]
pub enum Script {
    Body(Vec<Step>),
    /// Opening the request fails
    Reject(String),
    /// Opening the request never completes
    NeverOpens,
}

/// Generation client replaying canned scripts, one per request
#[derive(Default)]
pub struct ScriptedGeneration {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGeneration {
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedGeneration {
    async fn stream_chat(&self, request: GenerationRequest) -> Result<ChunkStream> {
        self.requests.lock().unwrap().push(request);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Body(Vec::new()));

        let steps = match script {
            Script::Body(steps) => steps,
            Script::Reject(message) => return Err(anyhow!(message)),
            Script::NeverOpens => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
        };

        Ok(Box::pin(async_stream::stream! {
            for step in steps {
                match step {
                    Step::Chunk(text) => yield Ok(text.into_bytes()),
                    Step::Gate(gate) => gate.notified().await,
                    Step::Fail(message) => {
                        yield Err(anyhow!(message));
                        return;
                    }
                    Step::Hang => futures::future::pending::<()>().await,
                }
            }
        }))
    }
}

/// Wire line for a text fragment
pub fn text(content: &str) -> Step {
    Step::Chunk(format!("0:{{\"type\":\"text\",\"content\":\"{}\"}}\n", content))
}

pub fn status(content: &str) -> Step {
    Step::Chunk(format!("0:{{\"type\":\"status\",\"content\":\"{}\"}}\n", content))
}

pub fn error(content: &str) -> Step {
    Step::Chunk(format!("0:{{\"type\":\"error\",\"content\":\"{}\"}}\n", content))
}

/// Memory store whose appends can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryConversationStore,
    fail_appends: bool,
    fail_create: bool,
}

impl FlakyStore {
    pub fn failing_appends() -> Self {
        Self { fail_appends: true, ..Self::default() }
    }

    pub fn failing_create() -> Self {
        Self { fail_create: true, ..Self::default() }
    }
}

#[async_trait]
impl ConversationStore for FlakyStore {
    async fn create_chat(&self, title: &str) -> cadence_persist::Result<ChatSummary> {
        if self.fail_create {
            return Err(StoreError::Status { status: 503, body: "unavailable".to_string() });
        }
        self.inner.create_chat(title).await
    }

    async fn list_chats(&self) -> cadence_persist::Result<Vec<ChatSummary>> {
        self.inner.list_chats().await
    }

    async fn search_chats(&self, query: &str) -> cadence_persist::Result<Vec<ChatSummary>> {
        self.inner.search_chats(query).await
    }

    async fn get_chat(&self, chat_id: &str) -> cadence_persist::Result<Option<ChatSummary>> {
        self.inner.get_chat(chat_id).await
    }

    async fn list_messages(&self, chat_id: &str) -> cadence_persist::Result<Vec<StoredMessage>> {
        self.inner.list_messages(chat_id).await
    }

    async fn append_message(
        &self,
        chat_id: &str,
        role: Role,
        content: &str,
    ) -> cadence_persist::Result<StoredMessage> {
        if self.fail_appends {
            return Err(StoreError::Status { status: 500, body: "disk full".to_string() });
        }
        self.inner.append_message(chat_id, role, content).await
    }

    async fn delete_messages(&self, chat_id: &str) -> cadence_persist::Result<()> {
        self.inner.delete_messages(chat_id).await
    }

    async fn delete_chat(&self, chat_id: &str) -> cadence_persist::Result<()> {
        self.inner.delete_chat(chat_id).await
    }
}

pub fn spawn_session(
    generation: Arc<ScriptedGeneration>,
    store: Arc<dyn ConversationStore>,
) -> SessionHandle {
    let (handle, _task) = SessionBuilder::new()
        .generation(generation)
        .store(store)
        .spawn()
        .expect("session should build");
    handle
}

/// Stored messages of the only chat in the store
pub async fn stored_messages(store: &dyn ConversationStore) -> Vec<(Role, String)> {
    let chats = store.list_chats().await.unwrap();
    assert_eq!(chats.len(), 1, "expected exactly one chat");
    store
        .list_messages(&chats[0].id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| (m.role, m.content))
        .collect()
}
