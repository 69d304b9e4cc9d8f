use tokio::sync::oneshot;

/// Messages a [`crate::SessionHandle`] sends to the controller task
///
/// Commands carrying a `reply` get `true` when the controller acted on them
/// and `false` when they were a guarded no-op (busy, empty input, nothing
/// to regenerate).
#[derive(Debug)]
pub enum SessionCommand {
    Submit {
        text: String,
        reply: oneshot::Sender<bool>,
    },
    Regenerate {
        reply: oneshot::Sender<bool>,
    },
    Cancel,
    OpenChat {
        chat_id: String,
        reply: oneshot::Sender<bool>,
    },
    NewChat {
        reply: oneshot::Sender<bool>,
    },
    Shutdown,
}

impl SessionCommand {
    /// Refuse the command, answering any waiting caller with `false`
    pub(crate) fn reject(self) {
        match self {
            SessionCommand::Submit { reply, .. }
            | SessionCommand::Regenerate { reply }
            | SessionCommand::OpenChat { reply, .. }
            | SessionCommand::NewChat { reply } => {
                let _ = reply.send(false);
            }
            SessionCommand::Cancel | SessionCommand::Shutdown => {}
        }
    }
}
