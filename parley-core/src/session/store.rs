//! Session data structures

use serde::{Deserialize, Serialize};

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who said it
    pub role: Role,
    /// Message text, stored exactly as sent or received
    pub content: String,
}

impl Turn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Number of whitespace-delimited words in the content
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// An ordered conversation history.
///
/// Turns are kept in insertion order and replayed verbatim to the model on
/// every request. Role alternation is not enforced: two user turns in a row
/// are legal (a failed request leaves one behind).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    turns: Vec<Turn>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a session from existing turns
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Append a turn
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Remove and return the most recent turn
    pub fn pop(&mut self) -> Option<Turn> {
        self.turns.pop()
    }

    /// All turns in chronological order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Clear all messages
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Approximate token count: the total number of whitespace-delimited
    /// words across every turn. This is not a real tokenizer.
    pub fn estimate_tokens(&self) -> usize {
        self.turns.iter().map(Turn::word_count).sum()
    }
}
