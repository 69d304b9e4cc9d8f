use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use cadence_persist::ConversationStore;
use cadence_stream::{decode_chunks, GenerationClient, MessageAccumulator};
use cadence_types::{
    derive_title, ChatSession, ConversationTurn, GenerationRequest, Role, Transcript,
};

use crate::types::{RunOutcome, SessionCommand, SessionConfig, SessionSnapshot, SessionState};

/// Owns the transcript and drives every run of one chat session
///
/// The controller is the only writer of the transcript. It processes
/// [`SessionCommand`]s one at a time; while a run is active it keeps
/// draining the command channel so `Cancel` is honored at every await and
/// competing submits are refused.
pub struct SessionController {
    generation: Arc<dyn GenerationClient>,
    store: Arc<dyn ConversationStore>,
    config: SessionConfig,
    commands: mpsc::Receiver<SessionCommand>,
    snapshot_tx: watch::Sender<SessionSnapshot>,

    session: ChatSession,
    transcript: Transcript,
    state: SessionState,
    status: Option<String>,
    error: Option<String>,
    last_outcome: Option<RunOutcome>,
    revision: u64,
    shutdown_requested: bool,
}

impl SessionController {
    pub(crate) fn new(
        generation: Arc<dyn GenerationClient>,
        store: Arc<dyn ConversationStore>,
        config: SessionConfig,
        commands: mpsc::Receiver<SessionCommand>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        Self {
            generation,
            store,
            config,
            commands,
            snapshot_tx,
            session: ChatSession::new(),
            transcript: Transcript::new(),
            state: SessionState::Idle,
            status: None,
            error: None,
            last_outcome: None,
            revision: 0,
            shutdown_requested: false,
        }
    }

    /// Process commands until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        self.publish();

        while let Some(command) = self.commands.recv().await {
            match command {
                SessionCommand::Submit { text, reply } => {
                    match self.begin_submit(&text).await {
                        Some(request) => {
                            let token = self.enter_sending();
                            let _ = reply.send(true);
                            self.drive_run(request, token).await;
                        }
                        None => {
                            let _ = reply.send(false);
                        }
                    }
                }
                SessionCommand::Regenerate { reply } => match self.begin_regenerate() {
                    Some(request) => {
                        let token = self.enter_sending();
                        let _ = reply.send(true);
                        self.drive_run(request, token).await;
                    }
                    None => {
                        let _ = reply.send(false);
                    }
                },
                SessionCommand::OpenChat { chat_id, reply } => {
                    let opened = self.open_chat(&chat_id).await;
                    let _ = reply.send(opened);
                }
                SessionCommand::NewChat { reply } => {
                    self.reset();
                    let _ = reply.send(true);
                }
                SessionCommand::Cancel => {
                    tracing::debug!("Cancel ignored: no run in progress");
                }
                SessionCommand::Shutdown => break,
            }

            if self.shutdown_requested {
                break;
            }
        }

        tracing::info!("Session controller stopped");
    }

    /// Idle-state entry actions for a submit. Returns the request to send,
    /// or `None` when the submit is a no-op or could not start.
    async fn begin_submit(&mut self, text: &str) -> Option<GenerationRequest> {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring empty submit");
            return None;
        }

        let existing = self.session.chat_id().map(str::to_string);
        let chat_id = match existing {
            Some(chat_id) => chat_id,
            None => {
                let title = derive_title(text);
                match self.store.create_chat(&title).await {
                    Ok(chat) => {
                        tracing::info!(chat_id = %chat.id, "Created chat");
                        self.session.assign(chat.id.clone(), title);
                        chat.id
                    }
                    Err(e) => {
                        tracing::error!("Failed to create chat: {}", e);
                        self.error = Some(format!("Could not create chat: {}", e));
                        self.publish();
                        return None;
                    }
                }
            }
        };

        self.error = None;
        self.status = None;
        let turn = self.transcript.push_user(text);
        self.publish();

        self.persist(&chat_id, &turn).await;

        Some(GenerationRequest::new(chat_id, self.transcript.history()))
    }

    fn begin_regenerate(&mut self) -> Option<GenerationRequest> {
        let chat_id = self.session.chat_id()?.to_string();

        let turns = self.transcript.turns();
        let has_prompt = turns.len() >= 2 && turns[turns.len() - 2].role == Role::User;
        if !has_prompt {
            tracing::debug!("Regenerate ignored: no assistant reply to replace");
            return None;
        }

        let removed = self.transcript.pop_trailing_assistant()?;
        tracing::info!(turn_id = %removed.id, "Regenerating last response");

        self.error = None;
        self.status = None;
        Some(GenerationRequest::new(chat_id, self.transcript.history()))
    }

    fn enter_sending(&mut self) -> CancellationToken {
        self.set_state(SessionState::Sending);
        CancellationToken::new()
    }

    async fn drive_run(&mut self, request: GenerationRequest, token: CancellationToken) {
        let generation = Arc::clone(&self.generation);
        let mut accumulator = MessageAccumulator::new();

        let opened = {
            let open = generation.stream_chat(request);
            tokio::pin!(open);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        self.finish_cancelled();
                        return;
                    }
                    Some(command) = self.commands.recv() => self.handle_while_busy(command, &token),
                    result = &mut open => break result,
                }
            }
        };

        let chunks = match opened {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::error!("Failed to open generation stream: {:#}", e);
                self.finish_errored(format!("{:#}", e));
                return;
            }
        };

        self.set_state(SessionState::Streaming);
        let mut decoded = decode_chunks(chunks);

        loop {
            if token.is_cancelled() {
                self.finish_cancelled();
                return;
            }

            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    self.finish_cancelled();
                    return;
                }
                Some(command) = self.commands.recv() => self.handle_while_busy(command, &token),
                next = decoded.next() => match next {
                    Some(Ok(result)) => {
                        let update = accumulator.apply(&mut self.transcript, result);
                        if let Some(error) = update.error {
                            tracing::warn!("Generation service reported an error: {}", error);
                            self.finish_errored(error);
                            return;
                        }
                        let status_changed = update.status.is_some();
                        if let Some(status) = update.status {
                            self.status = Some(status);
                        }
                        if update.content_changed || status_changed {
                            self.publish();
                        }
                    }
                    Some(Err(e)) => {
                        tracing::error!("Generation stream failed: {:#}", e);
                        self.finish_errored(format!("{:#}", e));
                        return;
                    }
                    None => {
                        self.finish_completed().await;
                        return;
                    }
                }
            }
        }
    }

    fn handle_while_busy(&mut self, command: SessionCommand, token: &CancellationToken) {
        match command {
            SessionCommand::Cancel => {
                tracing::info!("Cancelling run");
                token.cancel();
            }
            SessionCommand::Shutdown => {
                self.shutdown_requested = true;
                token.cancel();
            }
            other => {
                tracing::debug!("Ignoring {:?} while a run is in progress", other);
                other.reject();
            }
        }
    }

    async fn finish_completed(&mut self) {
        if let Some(turn) = self.transcript.seal() {
            if !turn.content.is_empty() {
                if let Some(chat_id) = self.session.chat_id().map(str::to_string) {
                    self.persist(&chat_id, &turn).await;
                }
            }
        }

        self.status = None;
        self.finish(RunOutcome::Completed);
    }

    /// Partial content stays visible but is never persisted
    fn finish_cancelled(&mut self) {
        self.transcript.seal();
        self.status = Some(self.config.stopped_label.clone());
        self.finish(RunOutcome::Cancelled);
    }

    fn finish_errored(&mut self, message: String) {
        self.transcript.seal();
        self.status = None;
        self.error = Some(message);
        self.finish(RunOutcome::Errored);
    }

    fn finish(&mut self, outcome: RunOutcome) {
        tracing::info!(?outcome, "Run finished");
        self.last_outcome = Some(outcome);
        self.set_state(outcome.into());
        self.set_state(SessionState::Idle);
    }

    async fn open_chat(&mut self, chat_id: &str) -> bool {
        let chat = match self.store.get_chat(chat_id).await {
            Ok(Some(chat)) => chat,
            Ok(None) => {
                self.error = Some(format!("Chat not found: {}", chat_id));
                self.publish();
                return false;
            }
            Err(e) => {
                tracing::error!("Failed to load chat {}: {}", chat_id, e);
                self.error = Some(format!("Could not load chat: {}", e));
                self.publish();
                return false;
            }
        };

        match self.store.list_messages(chat_id).await {
            Ok(messages) => {
                let turns = messages.into_iter().map(ConversationTurn::from).collect();
                self.session = ChatSession::existing(chat.id, chat.title);
                self.transcript = Transcript::from_turns(turns);
                self.status = None;
                self.error = None;
                self.last_outcome = None;
                tracing::info!(chat_id, turns = self.transcript.len(), "Opened chat");
                self.publish();
                true
            }
            Err(e) => {
                tracing::error!("Failed to load messages for {}: {}", chat_id, e);
                self.error = Some(format!("Could not load messages: {}", e));
                self.publish();
                false
            }
        }
    }

    fn reset(&mut self) {
        self.session = ChatSession::new();
        self.transcript = Transcript::new();
        self.status = None;
        self.error = None;
        self.last_outcome = None;
        self.publish();
    }

    /// Store a finished turn. Failures are logged; the transcript stays the
    /// source of truth for the current view.
    async fn persist(&self, chat_id: &str, turn: &ConversationTurn) {
        if let Err(e) = self
            .store
            .append_message(chat_id, turn.role, &turn.content)
            .await
        {
            tracing::warn!(
                chat_id,
                role = turn.role.as_str(),
                "Failed to persist message: {}",
                e
            );
        }
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.publish();
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = SessionSnapshot {
            chat_id: self.session.chat_id().map(str::to_string),
            title: self.session.title().map(str::to_string),
            turns: self.transcript.turns().to_vec(),
            in_flight: self.transcript.in_flight().is_some(),
            state: self.state,
            status: self.status.clone(),
            error: self.error.clone(),
            last_outcome: self.last_outcome,
            revision: self.revision,
        };
        self.snapshot_tx.send_replace(snapshot);
    }
}
