use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, oneshot, watch};

use crate::types::{SessionCommand, SessionSnapshot};

/// Cloneable front door to a running [`crate::SessionController`]
///
/// This is the presentation binding: views read [`SessionSnapshot`]s and
/// issue commands; they never touch the transcript directly.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<SessionCommand>,
        snapshots: watch::Receiver<SessionSnapshot>,
    ) -> Self {
        Self { commands, snapshots }
    }
    
    /// Send user input. `Ok(false)` means nothing was sent (blank input,
    /// a run already active, or the chat could not be created).
    pub async fn submit(&self, text: impl Into<String>) -> Result<bool> {
        let text = text.into();
        self.request(|reply| SessionCommand::Submit { text, reply }).await
    }
    
    /// Replace the last assistant reply with a fresh one
    pub async fn regenerate(&self) -> Result<bool> {
        self.request(|reply| SessionCommand::Regenerate { reply }).await
    }
    
    /// Stop the active run, if any
    pub async fn cancel(&self) -> Result<()> {
        self.send(SessionCommand::Cancel).await
    }
    
    /// Switch to a stored chat (idle only)
    pub async fn open_chat(&self, chat_id: impl Into<String>) -> Result<bool> {
        let chat_id = chat_id.into();
        self.request(|reply| SessionCommand::OpenChat { chat_id, reply }).await
    }
    
    /// Start over with a brand-new conversation (idle only)
    pub async fn new_chat(&self) -> Result<bool> {
        self.request(|reply| SessionCommand::NewChat { reply }).await
    }
    
    pub async fn shutdown(&self) -> Result<()> {
        self.send(SessionCommand::Shutdown).await
    }
    
    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }
    
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
    
    /// Wait for the first snapshot satisfying `predicate`
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(predicate)
            .await
            .map_err(|_| anyhow!("Session controller has stopped"))?;
        Ok(snapshot.clone())
    }
    
    pub async fn wait_until_idle(&self) -> Result<SessionSnapshot> {
        self.wait_for(|snapshot| snapshot.state.is_idle()).await
    }
    
    async fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("Session controller has stopped"))
    }
    
    async fn request(
        &self,
        command: impl FnOnce(oneshot::Sender<bool>) -> SessionCommand,
    ) -> Result<bool> {
        let (reply, answer) = oneshot::channel();
        self.send(command(reply)).await?;
        answer
            .await
            .map_err(|_| anyhow!("Session controller dropped the command"))
    }
}
