//! Interactive first-run setup

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Password};
use parley_core::config::{Config, ConfigLoader};
use parley_core::utils::expand_tilde;
use tracing::{info, warn};

/// Run the onboard wizard
pub fn run_onboard(loader: &ConfigLoader) -> Result<()> {
    println!("{}", style("Welcome to parley!").bold().cyan());
    println!("Let's set up your configuration.\n");

    let config_path = loader.config_path();
    let mut config = if config_path.exists() {
        let overwrite = Confirm::new()
            .with_prompt("Configuration already exists. Update it?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Onboard cancelled.");
            return Ok(());
        }
        loader.load().unwrap_or_else(|e| {
            warn!(error = %e, "Existing configuration is invalid, starting from defaults");
            Config::default()
        })
    } else {
        Config::default()
    };

    let api_key = Password::new()
        .with_prompt("Enter your Anthropic API key (leave empty to use ANTHROPIC_API_KEY)")
        .allow_empty_password(true)
        .interact()?;
    if !api_key.trim().is_empty() {
        config.provider.api_key = api_key.trim().to_string();
    }

    config.chat.model = Input::new()
        .with_prompt("Model")
        .default(config.chat.model.clone())
        .interact_text()?;

    config.chat.max_tokens = Input::new()
        .with_prompt("Maximum reply length (tokens)")
        .default(config.chat.max_tokens)
        .validate_with(|value: &u32| {
            if *value > 0 {
                Ok(())
            } else {
                Err("must be greater than zero")
            }
        })
        .interact_text()?;

    config.chat.storage_dir = Input::new()
        .with_prompt("Directory for saved conversations")
        .default(config.chat.storage_dir.clone())
        .interact_text()?;

    loader.save(&config)?;
    std::fs::create_dir_all(config.storage_dir())?;
    info!(path = %config_path.display(), "Configuration written");

    println!(
        "\n{}",
        style("Configuration saved successfully!").green().bold()
    );
    println!("Config location: {}", config_path.display());
    println!(
        "Conversations:   {}",
        expand_tilde(&config.chat.storage_dir).display()
    );
    println!("\nYou can now run:");
    println!("  {} - Start chatting", style("parley").cyan());
    Ok(())
}
