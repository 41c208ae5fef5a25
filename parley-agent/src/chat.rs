//! Chat session: owns the conversation and drives one request per message

use parley_core::config::{Config, ServiceErrorPolicy};
use parley_core::session::{Session, TranscriptInfo, TranscriptStore, Turn};
use parley_core::utils::truncate;
use parley_providers::{LLMProvider, Message, Usage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::command::{parse_input, Command, Input};
use crate::error::{ChatError, ChatResult};

/// Per-request settings, fixed for the life of a session
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model: String,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub on_service_error: ServiceErrorPolicy,
}

impl ChatSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.chat.model.clone(),
            max_tokens: config.chat.max_tokens,
            system_prompt: config.chat.system_prompt.clone(),
            on_service_error: config.chat.on_service_error,
        }
    }
}

/// Result of handling one console line
#[derive(Debug)]
pub enum Outcome {
    /// Blank input, nothing happened
    Ignored,
    /// The model's reply to a chat message
    Reply(String),
    Saved(PathBuf),
    Loaded { path: PathBuf, turns: usize },
    Cleared,
    Tokens(usize),
    Transcripts(Vec<TranscriptInfo>),
    Help,
    Quit,
}

/// The conversation session manager.
///
/// Owns the history exclusively. Every chat message appends a user turn,
/// sends the full history to the provider and, on success, appends the
/// assistant turn. Nothing here is fatal: every failure comes back as a
/// [`ChatError`] and the session stays usable.
pub struct ChatSession {
    provider: Arc<dyn LLMProvider>,
    settings: ChatSettings,
    store: TranscriptStore,
    session: Session,
    last_usage: Option<Usage>,
}

impl ChatSession {
    /// Create an empty chat session
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        settings: ChatSettings,
        store: TranscriptStore,
    ) -> Self {
        Self {
            provider,
            settings,
            store,
            session: Session::new(),
            last_usage: None,
        }
    }

    /// Create a chat session from loaded configuration
    pub fn from_config(provider: Arc<dyn LLMProvider>, config: &Config) -> Self {
        Self::new(
            provider,
            ChatSettings::from_config(config),
            TranscriptStore::new(config.storage_dir()),
        )
    }

    /// Current conversation history
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Provider-reported usage of the last successful request
    pub fn last_usage(&self) -> Option<Usage> {
        self.last_usage
    }

    /// Classify a console line and act on it
    pub async fn handle_line(&mut self, line: &str) -> ChatResult<Outcome> {
        match parse_input(line)? {
            Input::Empty => Ok(Outcome::Ignored),
            Input::Message(text) => Ok(self
                .submit(&text)
                .await?
                .map_or(Outcome::Ignored, Outcome::Reply)),
            Input::Command(command) => self.execute(command),
        }
    }

    /// Run a local command
    pub fn execute(&mut self, command: Command) -> ChatResult<Outcome> {
        debug!(?command, "Executing command");
        match command {
            Command::Quit => Ok(Outcome::Quit),
            Command::Save(path) => self.save(path.as_deref()).map(Outcome::Saved),
            Command::Load(path) => {
                let turns = self.load(&path)?;
                Ok(Outcome::Loaded { path, turns })
            }
            Command::Clear => {
                self.clear();
                Ok(Outcome::Cleared)
            }
            Command::Tokens => Ok(Outcome::Tokens(self.estimate_tokens())),
            Command::List => self.list_saved().map(Outcome::Transcripts),
            Command::Help => Ok(Outcome::Help),
        }
    }

    /// Send a chat message and return the reply.
    ///
    /// Blank input is ignored and yields `Ok(None)`. The user turn is
    /// appended before the request goes out. If the request fails the turn
    /// stays in the history unless the session is configured to roll back.
    pub async fn submit(&mut self, text: &str) -> ChatResult<Option<String>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        self.session.push(Turn::user(text));
        let messages: Vec<Message> = self.session.turns().iter().map(Message::from).collect();

        info!(
            model = %self.settings.model,
            turns = messages.len(),
            preview = %truncate(text, 80),
            "Submitting message"
        );

        let system = Some(self.settings.system_prompt.clone()).filter(|s| !s.trim().is_empty());
        let result = self
            .provider
            .chat(
                messages,
                system,
                Some(self.settings.model.clone()),
                self.settings.max_tokens,
            )
            .await;

        match result {
            Ok(response) => {
                self.last_usage = Some(response.usage);
                self.session.push(Turn::assistant(response.content.clone()));
                debug!(turns = self.session.len(), "Reply appended");
                Ok(Some(response.content))
            }
            Err(e) => {
                warn!(error = %e, policy = ?self.settings.on_service_error, "Completion request failed");
                if self.settings.on_service_error == ServiceErrorPolicy::Rollback {
                    self.session.pop();
                }
                Err(ChatError::Service(e))
            }
        }
    }

    /// Save the conversation. Without a path it is written to the storage
    /// directory as `conversation_<YYYYMMDD_HHMMSS>.json`.
    pub fn save(&self, path: Option<&Path>) -> ChatResult<PathBuf> {
        let saved = self.store.save(&self.session, path)?;
        info!(path = %saved.display(), turns = self.session.len(), "Conversation saved");
        Ok(saved)
    }

    /// Replace the conversation with a saved one and return its turn count.
    /// On any error the current conversation is left untouched.
    pub fn load(&mut self, path: &Path) -> ChatResult<usize> {
        let loaded = self.store.load(path)?;
        let turns = loaded.len();
        self.session = loaded;
        info!(path = %path.display(), turns, "Conversation loaded");
        Ok(turns)
    }

    /// Forget the conversation
    pub fn clear(&mut self) {
        self.session.clear();
        debug!("Conversation cleared");
    }

    /// Approximate token count: total whitespace-delimited words
    pub fn estimate_tokens(&self) -> usize {
        self.session.estimate_tokens()
    }

    /// Saved conversations in the storage directory, newest first
    pub fn list_saved(&self) -> ChatResult<Vec<TranscriptInfo>> {
        Ok(self.store.list()?)
    }
}
