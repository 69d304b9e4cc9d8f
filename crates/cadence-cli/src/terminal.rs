use std::io::Write;

use cadence_session::{SessionSnapshot, SessionView};
use cadence_types::ConversationTurn;

const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Streams assistant replies to a terminal
///
/// Only the new suffix of the in-flight reply is written for each
/// snapshot, so output reads as one continuous line of text.
pub struct TerminalView<W: Write + Send> {
    out: W,
    /// Turn currently being printed and how many bytes of it are out
    active: Option<(String, usize)>,
    line_open: bool,
    status: Option<String>,
    error: Option<String>,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            active: None,
            line_open: false,
            status: None,
            error: None,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            tracing::debug!("Terminal write failed: {}", e);
        }
    }

    fn break_line(&mut self) {
        if self.line_open {
            self.emit("\n");
            self.line_open = false;
        }
    }

    fn print_suffix(&mut self, turn: &ConversationTurn) {
        let printed = match &self.active {
            Some((id, printed)) if *id == turn.id => *printed,
            _ => 0,
        };

        let suffix = if turn.content.len() > printed && turn.content.is_char_boundary(printed) {
            &turn.content[printed..]
        } else {
            ""
        };

        if !suffix.is_empty() {
            if !self.line_open {
                self.emit("assistant> ");
                self.line_open = true;
            }
            self.emit(suffix);
        }
        self.active = Some((turn.id.clone(), printed + suffix.len()));
    }

    /// Print whatever arrived for a reply that is no longer in flight
    fn close_finished(&mut self, snapshot: &SessionSnapshot) {
        let Some((id, _)) = self.active.clone() else {
            return;
        };
        if snapshot.in_flight_turn().map(|t| &t.id) == Some(&id) {
            return;
        }

        if let Some(turn) = snapshot.turns.iter().find(|t| t.id == id) {
            self.print_suffix(turn);
        }
        self.active = None;
        self.break_line();
    }
}

impl<W: Write + Send> SessionView for TerminalView<W> {
    fn render(&mut self, snapshot: &SessionSnapshot) {
        self.close_finished(snapshot);

        if snapshot.status != self.status {
            if let Some(status) = snapshot.status.as_deref().filter(|s| !s.is_empty()) {
                self.break_line();
                self.emit(&format!("{}[{}]{}\n", DIM, status, RESET));
            }
            self.status = snapshot.status.clone();
        }

        if let Some(turn) = snapshot.in_flight_turn() {
            self.print_suffix(turn);
        }

        if snapshot.error != self.error {
            if let Some(error) = &snapshot.error {
                self.break_line();
                self.emit(&format!("{}error: {}{}\n", RED, error, RESET));
            }
            self.error = snapshot.error.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_session::SessionState;

    fn streaming(turns: &[ConversationTurn], status: Option<&str>) -> SessionSnapshot {
        SessionSnapshot {
            turns: turns.to_vec(),
            in_flight: true,
            state: SessionState::Streaming,
            status: status.map(str::to_string),
            ..SessionSnapshot::default()
        }
    }

    fn output(view: TerminalView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn test_prints_only_new_suffix() {
        let user = ConversationTurn::user("hi");
        let mut reply = ConversationTurn::assistant("Hel");
        let mut view = TerminalView::new(Vec::new());

        view.render(&streaming(&[user.clone(), reply.clone()], None));
        reply.content = "Hello".to_string();
        view.render(&streaming(&[user.clone(), reply.clone()], None));
        view.render(&streaming(&[user, reply], None));

        assert_eq!(output(view), "assistant> Hello");
    }

    #[test]
    fn test_flushes_tail_of_sealed_reply() {
        let user = ConversationTurn::user("hi");
        let mut reply = ConversationTurn::assistant("Hel");
        let mut view = TerminalView::new(Vec::new());

        view.render(&streaming(&[user.clone(), reply.clone()], None));

        reply.content = "Hello!".to_string();
        let done = SessionSnapshot {
            turns: vec![user, reply],
            ..SessionSnapshot::default()
        };
        view.render(&done);

        assert_eq!(output(view), "assistant> Hello!\n");
    }

    #[test]
    fn test_status_and_error_on_own_lines() {
        let user = ConversationTurn::user("hi");
        let reply = ConversationTurn::assistant("par");
        let mut view = TerminalView::new(Vec::new());

        let sending = SessionSnapshot {
            turns: vec![user.clone()],
            state: SessionState::Sending,
            status: Some("thinking".to_string()),
            ..SessionSnapshot::default()
        };
        view.render(&sending);
        view.render(&streaming(&[user.clone(), reply.clone()], Some("thinking")));

        let failed = SessionSnapshot {
            turns: vec![user, reply],
            error: Some("model crashed".to_string()),
            ..SessionSnapshot::default()
        };
        view.render(&failed);

        let text = output(view);
        assert_eq!(
            text,
            format!(
                "{DIM}[thinking]{RESET}\nassistant> par\n{RED}error: model crashed{RESET}\n"
            )
        );
    }

    #[test]
    fn test_same_error_printed_once() {
        let snapshot = SessionSnapshot {
            error: Some("boom".to_string()),
            ..SessionSnapshot::default()
        };
        let mut view = TerminalView::new(Vec::new());
        view.render(&snapshot);
        view.render(&snapshot);

        assert_eq!(output(view).matches("boom").count(), 1);
    }
}
