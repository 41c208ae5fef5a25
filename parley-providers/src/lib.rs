//! Completion service clients for parley
//!
//! This crate defines the provider abstraction the chat session talks to and
//! the Anthropic Messages API implementation of it.

pub mod anthropic;
pub mod base;

pub use anthropic::AnthropicClient;
pub use base::{LLMProvider, LLMResponse, Message, ProviderError, ProviderResult, Usage};
