//! CLI entry point for parley

mod onboard;
mod repl;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use console::{style, Term};
use parley_agent::ChatSession;
use parley_core::config::{
    load_dotenv, validate_config, validate_credentials, Config, ConfigLoader,
};
use parley_core::logging::init_logging;
use parley_providers::{AnthropicClient, LLMProvider};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::repl::Repl;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Chat with Claude from your terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat (the default)
    Chat(ChatArgs),
    /// Create or update the configuration file
    Onboard,
}

#[derive(Args, Debug, Default)]
struct ChatArgs {
    /// Model to use
    #[arg(short, long)]
    model: Option<String>,
    /// Maximum reply length in tokens
    #[arg(long)]
    max_tokens: Option<u32>,
    /// System prompt
    #[arg(long)]
    system: Option<String>,
    /// Directory for saved conversations
    #[arg(long)]
    storage_dir: Option<String>,
    /// Start from a saved conversation
    #[arg(short, long)]
    load: Option<PathBuf>,
}

impl ChatArgs {
    /// Command-line flags take precedence over file and environment
    fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.chat.model = model.clone();
        }
        if let Some(max_tokens) = self.max_tokens {
            config.chat.max_tokens = max_tokens;
        }
        if let Some(system) = &self.system {
            config.chat.system_prompt = system.clone();
        }
        if let Some(storage_dir) = &self.storage_dir {
            config.chat.storage_dir = storage_dir.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    load_dotenv();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    match cli.command {
        Some(Commands::Onboard) => onboard::run_onboard(&config_loader)?,
        Some(Commands::Chat(args)) => run_chat(&config_loader, args).await?,
        None => run_chat(&config_loader, ChatArgs::default()).await?,
    }

    Ok(())
}

/// Build the chat session and run the console loop
async fn run_chat(loader: &ConfigLoader, args: ChatArgs) -> Result<()> {
    let mut config = loader.load().with_context(|| {
        format!(
            "failed to load configuration from {}",
            loader.config_dir().display()
        )
    })?;
    args.apply(&mut config);
    validate_config(&config)?;
    validate_credentials(&config)?;

    let _log_guard = init_logging(&config.logging)?;
    info!(
        model = %config.chat.model,
        max_tokens = config.chat.max_tokens,
        storage_dir = %config.storage_dir().display(),
        "Starting chat"
    );

    let provider = AnthropicClient::from_config(&config.provider, &config.chat.model)?;
    debug!(default_model = %provider.get_default_model(), "Provider ready");
    let mut chat = ChatSession::from_config(Arc::new(provider), &config);

    if let Some(path) = &args.load {
        match chat.load(path) {
            Ok(turns) => println!("Loaded {} messages from {}", turns, path.display()),
            Err(e) => {
                error!(error = %e, "Failed to load starting conversation");
                println!("{} {}", style("Error:").bold().red(), e);
            }
        }
    }

    let stdin = io::stdin();
    let mut repl = Repl::new(stdin.lock(), io::stdout()).with_spinner(Term::stdout().is_term());
    repl.run(&mut chat).await?;
    Ok(())
}
