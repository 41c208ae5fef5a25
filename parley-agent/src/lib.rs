//! Conversation logic for parley
//!
//! This crate provides the chat session that owns the conversation history,
//! drives one request per user message and executes slash commands.

pub mod chat;
pub mod command;
pub mod error;

pub use chat::{ChatSession, ChatSettings, Outcome};
pub use command::{parse_input, Command, Input, HELP_TEXT};
pub use error::{ChatError, ChatResult};
