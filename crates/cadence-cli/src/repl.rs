use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use cadence_persist::ConversationStore;
use cadence_session::SessionHandle;
use cadence_types::{ChatSummary, Role};

use crate::commands::{Command, HELP};

const HISTORY_PREVIEW_CHARS: usize = 100;

enum Flow {
    Continue,
    Exit,
}

/// Line-oriented front end over a [`SessionHandle`]
///
/// Replies are drawn by the terminal view; the REPL only reports the
/// outcome of commands.
pub struct Repl {
    handle: SessionHandle,
    store: Arc<dyn ConversationStore>,
    exit_armed: bool,
}

impl Repl {
    pub fn new(handle: SessionHandle, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            handle,
            store,
            exit_armed: false,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let flow = tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => {
                        self.exit_armed = false;
                        self.handle_line(&line).await?
                    }
                    None => Flow::Exit,
                },
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    self.interrupt().await?
                }
            };

            if let Flow::Exit = flow {
                break;
            }
        }

        Ok(())
    }

    /// Ctrl-C stops a streaming reply; pressed twice while idle it exits
    async fn interrupt(&mut self) -> Result<Flow> {
        if self.handle.snapshot().loading() {
            self.handle.cancel().await?;
            self.exit_armed = false;
            return Ok(Flow::Continue);
        }

        if self.exit_armed {
            return Ok(Flow::Exit);
        }

        self.exit_armed = true;
        println!("\n(Press Ctrl-C again or type /quit to exit)");
        Ok(Flow::Continue)
    }

    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                println!("{}", e);
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Quit => {
                println!("Goodbye!");
                return Ok(Flow::Exit);
            }
            Command::Message(text) => {
                if !self.handle.submit(text).await? && self.handle.snapshot().loading() {
                    println!("A reply is still streaming; /stop it first.");
                }
            }
            Command::NewChat => {
                if self.handle.new_chat().await? {
                    println!("Started a new chat.");
                } else {
                    println!("Cannot start a new chat while a reply is streaming.");
                }
            }
            Command::Open(chat_id) => {
                if self.handle.open_chat(chat_id).await? {
                    let snapshot = self.handle.snapshot();
                    println!(
                        "Opened \"{}\" ({} messages)",
                        snapshot.title.unwrap_or_default(),
                        snapshot.turns.len()
                    );
                }
            }
            Command::ListChats => match self.store.list_chats().await {
                Ok(chats) => print_chats(&chats, "No stored chats."),
                Err(e) => println!("error: {}", e),
            },
            Command::Search(query) => match self.store.search_chats(&query).await {
                Ok(chats) => print_chats(&chats, "No chats matched."),
                Err(e) => println!("error: {}", e),
            },
            Command::Delete(chat_id) => self.delete_chat(&chat_id).await?,
            Command::Regenerate => {
                if !self.handle.regenerate().await? {
                    println!("Nothing to regenerate.");
                }
            }
            Command::Stop => self.handle.cancel().await?,
            Command::History => self.print_history(),
            Command::Help => println!("{}", HELP),
        }

        Ok(Flow::Continue)
    }

    async fn delete_chat(&mut self, chat_id: &str) -> Result<()> {
        if let Err(e) = self.store.delete_chat(chat_id).await {
            println!("error: {}", e);
            return Ok(());
        }
        println!("Deleted chat {}", chat_id);

        let current = self.handle.snapshot().chat_id;
        if current.as_deref() == Some(chat_id) {
            self.handle.new_chat().await?;
        }
        Ok(())
    }

    fn print_history(&self) {
        let snapshot = self.handle.snapshot();
        if snapshot.turns.is_empty() {
            println!("No conversation history.");
            return;
        }

        for turn in &snapshot.turns {
            let speaker = match turn.role {
                Role::User => "You",
                Role::Assistant => "AI",
            };
            println!("{}: {}", speaker, preview(&turn.content, HISTORY_PREVIEW_CHARS));
        }
    }
}

fn print_chats(chats: &[ChatSummary], empty: &str) {
    if chats.is_empty() {
        println!("{}", empty);
        return;
    }
    for chat in chats {
        println!("{}  {}", chat.id, chat.title);
    }
}

/// First `limit` characters of `text`, marked when cut
fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
