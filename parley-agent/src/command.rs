//! Slash command parsing

use crate::error::ChatError;
use std::path::PathBuf;

pub const HELP_TEXT: &str = "\
Commands:
  /save [path]   save the conversation (auto-named in the storage directory if no path)
  /load <path>   replace the conversation with a saved one
  /list          list saved conversations
  /clear         forget the current conversation
  /tokens        approximate token count (word count) of the conversation
  /help          show this help
  /quit          exit";

/// A local command, executed without contacting the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Save(Option<PathBuf>),
    Load(PathBuf),
    Clear,
    Tokens,
    List,
    Help,
}

/// One classified line of console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Blank or whitespace-only line
    Empty,
    /// Text for the model, already trimmed
    Message(String),
    Command(Command),
}

/// Classify a console line.
///
/// Lines starting with `/` are commands (the command word is
/// case-insensitive, the argument is the rest of the line). Bare `quit` and
/// `exit` are accepted as well. Everything else is a chat message.
pub fn parse_input(line: &str) -> Result<Input, ChatError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }

    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
        return Ok(Input::Command(Command::Quit));
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Input::Message(line.to_string()));
    };

    let (word, arg) = match rest.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg.trim()),
        None => (rest, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "quit" | "exit" => Command::Quit,
        "save" => Command::Save((!arg.is_empty()).then(|| PathBuf::from(arg))),
        "load" => {
            if arg.is_empty() {
                return Err(ChatError::Usage("Usage: /load <path>".to_string()));
            }
            Command::Load(PathBuf::from(arg))
        }
        "clear" => Command::Clear,
        "tokens" => Command::Tokens,
        "list" => Command::List,
        "help" => Command::Help,
        _ => {
            return Err(ChatError::Usage(format!(
                "Unknown command: /{} (type /help for a list)",
                word
            )))
        }
    };

    Ok(Input::Command(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> Command {
        match parse_input(line).unwrap() {
            Input::Command(command) => command,
            other => panic!("expected command, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_lines_are_empty() {
        assert_eq!(parse_input("").unwrap(), Input::Empty);
        assert_eq!(parse_input("   \t\n").unwrap(), Input::Empty);
    }

    #[test]
    fn test_messages_are_trimmed() {
        assert_eq!(
            parse_input("  Hello there \n").unwrap(),
            Input::Message("Hello there".to_string())
        );
    }

    #[test]
    fn test_quit_variants() {
        assert_eq!(command("/quit"), Command::Quit);
        assert_eq!(command("/exit"), Command::Quit);
        assert_eq!(command("QUIT"), Command::Quit);
        assert_eq!(command("exit"), Command::Quit);
        assert_eq!(command("/Quit"), Command::Quit);
    }

    #[test]
    fn test_quit_inside_sentence_is_a_message() {
        assert_eq!(
            parse_input("I quit").unwrap(),
            Input::Message("I quit".to_string())
        );
    }

    #[test]
    fn test_save_with_and_without_path() {
        assert_eq!(command("/save"), Command::Save(None));
        assert_eq!(
            command("/save my chats/today.json"),
            Command::Save(Some(PathBuf::from("my chats/today.json")))
        );
    }

    #[test]
    fn test_load_requires_path() {
        assert_eq!(
            command("/load missing.json"),
            Command::Load(PathBuf::from("missing.json"))
        );
        let err = parse_input("/load").unwrap_err();
        assert!(matches!(err, ChatError::Usage(ref m) if m.contains("/load <path>")));
        assert!(parse_input("/load    ").is_err());
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(command("/clear"), Command::Clear);
        assert_eq!(command("/tokens"), Command::Tokens);
        assert_eq!(command("/list"), Command::List);
        assert_eq!(command("/help"), Command::Help);
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_input("/frobnicate now").unwrap_err();
        assert!(matches!(err, ChatError::Usage(ref m) if m.contains("/frobnicate")));
    }
}
