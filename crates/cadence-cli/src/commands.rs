use thiserror::Error;

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    NewChat,
    ListChats,
    Open(String),
    Search(String),
    Delete(String),
    Regenerate,
    Stop,
    History,
    Help,
    /// Anything that is not a slash command
    Message(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: /{0} (try /help)")]
    Unknown(String),

    #[error("/{command} needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
}

pub const HELP: &str = "\
Commands:
  /new, /clear      start a new chat
  /chats            list stored chats
  /open <id>        continue a stored chat
  /search <query>   find chats by title or content
  /delete <id>      delete a stored chat
  /regen            regenerate the last reply
  /stop             stop the reply being streamed (or press Ctrl-C)
  /history          show the current conversation
  /quit             exit";

impl Command {
    /// Parse a trimmed input line. Returns `Ok(None)` for blank input.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Some(Command::Message(line.to_string())));
        };

        let (name, argument) = match rest.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (rest, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "quit" | "exit" => Command::Quit,
            "new" | "clear" => Command::NewChat,
            "chats" => Command::ListChats,
            "open" => Command::Open(required(argument, "open", "a chat id")?),
            "search" => Command::Search(required(argument, "search", "a query")?),
            "delete" => Command::Delete(required(argument, "delete", "a chat id")?),
            "regen" | "regenerate" => Command::Regenerate,
            "stop" => Command::Stop,
            "history" => Command::History,
            "help" => Command::Help,
            _ => return Err(CommandError::Unknown(name.to_string())),
        };

        Ok(Some(command))
    }
}

fn required(
    argument: &str,
    command: &'static str,
    description: &'static str,
) -> Result<String, CommandError> {
    if argument.is_empty() {
        Err(CommandError::MissingArgument {
            command,
            argument: description,
        })
    } else {
        Ok(argument.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            Command::parse("  hello there \n").unwrap(),
            Some(Command::Message("hello there".to_string()))
        );
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_commands_are_case_insensitive() {
        assert_eq!(Command::parse("/QUIT").unwrap(), Some(Command::Quit));
        assert_eq!(Command::parse("/Clear").unwrap(), Some(Command::NewChat));
    }

    #[test]
    fn test_arguments() {
        assert_eq!(
            Command::parse("/open abc-123").unwrap(),
            Some(Command::Open("abc-123".to_string()))
        );
        assert_eq!(
            Command::parse("/search   rust lifetimes ").unwrap(),
            Some(Command::Search("rust lifetimes".to_string()))
        );
    }

    #[test]
    fn test_missing_argument() {
        let err = Command::parse("/open").unwrap_err();
        assert_eq!(
            err,
            CommandError::MissingArgument { command: "open", argument: "a chat id" }
        );
        assert_eq!(err.to_string(), "/open needs a chat id");
    }

    #[test]
    fn test_unknown_command() {
        let err = Command::parse("/frobnicate now").unwrap_err();
        assert_eq!(err, CommandError::Unknown("frobnicate".to_string()));
    }
}
