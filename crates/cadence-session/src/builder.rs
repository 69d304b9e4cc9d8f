use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use cadence_persist::ConversationStore;
use cadence_stream::GenerationClient;

use crate::controller::SessionController;
use crate::handle::SessionHandle;
use crate::types::{SessionConfig, SessionSnapshot};

/// Builder wiring a session controller to its collaborators
pub struct SessionBuilder {
    generation: Option<Arc<dyn GenerationClient>>,
    store: Option<Arc<dyn ConversationStore>>,
    config: SessionConfig,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            generation: None,
            store: None,
            config: SessionConfig::default(),
        }
    }
    
    /// Set the generation service client
    pub fn generation(mut self, client: Arc<dyn GenerationClient>) -> Self {
        self.generation = Some(client);
        self
    }
    
    /// Set the conversation store
    pub fn store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }
    
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }
    
    /// Build the controller and its handle without starting it
    pub fn build(self) -> Result<(SessionController, SessionHandle)> {
        let generation = self.generation
            .ok_or_else(|| anyhow!("Generation client is required"))?;
        let store = self.store
            .ok_or_else(|| anyhow!("Conversation store is required"))?;
        
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());
        
        let controller = SessionController::new(generation, store, self.config, command_rx, snapshot_tx);
        Ok((controller, SessionHandle::new(command_tx, snapshot_rx)))
    }
    
    /// Build and run the controller on the current tokio runtime
    pub fn spawn(self) -> Result<(SessionHandle, JoinHandle<()>)> {
        let (controller, handle) = self.build()?;
        let task = tokio::spawn(controller.run());
        Ok((handle, task))
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
