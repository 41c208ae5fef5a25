//! Conversation history and transcript persistence
//!
//! A session is the in-memory list of turns; transcripts are sessions saved
//! to disk as indented JSON arrays of `{role, content}` objects.

pub mod store;
pub mod transcript;

pub use store::{Role, Session, Turn};
pub use transcript::{TranscriptInfo, TranscriptStore};
