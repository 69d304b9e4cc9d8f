use cadence_types::ConversationTurn;

/// Lifecycle of one chat session
///
/// `Idle -> Sending -> Streaming -> {Completed | Cancelled | Errored} -> Idle`.
/// The three terminal states are published once and immediately followed
/// by `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Sending,
    Streaming,
    Completed,
    Cancelled,
    Errored,
}

impl SessionState {
    /// Request or response body is still in flight
    pub fn is_awaiting_network(&self) -> bool {
        matches!(self, SessionState::Sending | SessionState::Streaming)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}

/// How the most recent run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
    Errored,
}

impl From<RunOutcome> for SessionState {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed => SessionState::Completed,
            RunOutcome::Cancelled => SessionState::Cancelled,
            RunOutcome::Errored => SessionState::Errored,
        }
    }
}

/// Everything a view needs to draw the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub chat_id: Option<String>,
    pub title: Option<String>,
    pub turns: Vec<ConversationTurn>,
    /// The last turn is still receiving streamed content
    pub in_flight: bool,
    pub state: SessionState,
    pub status: Option<String>,
    pub error: Option<String>,
    pub last_outcome: Option<RunOutcome>,
    /// Increases with every published change
    pub revision: u64,
}

impl SessionSnapshot {
    pub fn loading(&self) -> bool {
        self.state.is_awaiting_network()
    }

    pub fn in_flight_turn(&self) -> Option<&ConversationTurn> {
        if self.in_flight {
            self.turns.last()
        } else {
            None
        }
    }
}
