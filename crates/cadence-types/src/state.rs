use serde::{Deserialize, Serialize};

use crate::records::{OutboundMessage, StoredMessage};

pub const TITLE_MAX_CHARS: usize = 50;
pub const TITLE_ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
        }
    }
    
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
    
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl From<StoredMessage> for ConversationTurn {
    fn from(message: StoredMessage) -> Self {
        Self {
            id: message.id,
            role: message.role,
            content: message.content,
        }
    }
}

/// Ordered turns of one conversation
///
/// At most one turn is in flight, and it is always the trailing assistant
/// turn. The only way in is [`Transcript::set_in_flight_content`], the only
/// way out is [`Transcript::seal`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
    in_flight: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn from_turns(turns: Vec<ConversationTurn>) -> Self {
        Self { turns, in_flight: false }
    }
    
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }
    
    pub fn len(&self) -> usize {
        self.turns.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
    
    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }
    
    /// Append a finished user turn, sealing any in-flight turn first
    pub fn push_user(&mut self, content: impl Into<String>) -> ConversationTurn {
        self.seal();
        let turn = ConversationTurn::user(content);
        self.turns.push(turn.clone());
        turn
    }
    
    /// Replace the in-flight turn's content, or open a new in-flight
    /// assistant turn holding it
    pub fn set_in_flight_content(&mut self, content: &str) {
        if self.in_flight {
            if let Some(turn) = self.turns.last_mut() {
                turn.content.clear();
                turn.content.push_str(content);
                return;
            }
        }
        
        self.turns.push(ConversationTurn::assistant(content));
        self.in_flight = true;
    }
    
    pub fn in_flight(&self) -> Option<&ConversationTurn> {
        if self.in_flight {
            self.turns.last()
        } else {
            None
        }
    }
    
    /// Freeze the in-flight turn and hand back a copy of it
    pub fn seal(&mut self) -> Option<ConversationTurn> {
        if !std::mem::take(&mut self.in_flight) {
            return None;
        }
        self.turns.last().cloned()
    }
    
    /// Remove the trailing assistant turn if there is a sealed one
    pub fn pop_trailing_assistant(&mut self) -> Option<ConversationTurn> {
        if self.in_flight {
            return None;
        }
        match self.turns.last() {
            Some(turn) if turn.role == Role::Assistant => self.turns.pop(),
            _ => None,
        }
    }
    
    /// Role/content history in conversation order
    pub fn history(&self) -> Vec<OutboundMessage> {
        self.turns
            .iter()
            .map(|turn| OutboundMessage {
                role: turn.role,
                content: turn.content.clone(),
            })
            .collect()
    }
}

/// Identity of the chat a session is attached to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSession {
    chat_id: Option<String>,
    title: Option<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn existing(chat_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            chat_id: Some(chat_id.into()),
            title: Some(title.into()),
        }
    }
    
    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }
    
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
    
    /// Bind the session to a freshly created chat. Returns false if an id
    /// was already assigned; the first id wins.
    pub fn assign(&mut self, chat_id: impl Into<String>, title: impl Into<String>) -> bool {
        if self.chat_id.is_some() {
            return false;
        }
        self.chat_id = Some(chat_id.into());
        self.title = Some(title.into());
        true
    }
}

/// Title for a new chat: the first [`TITLE_MAX_CHARS`] characters of the
/// opening message, with [`TITLE_ELLIPSIS`] when anything was cut
pub fn derive_title(message: &str) -> String {
    let message = message.trim();
    match message.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &message[..cut], TITLE_ELLIPSIS),
        None => message.to_string(),
    }
}
