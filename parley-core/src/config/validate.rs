//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.chat.model.trim().is_empty() {
        errors.push("chat.model must not be empty".to_string());
    }
    if config.chat.max_tokens == 0 {
        errors.push("chat.max_tokens must be > 0".to_string());
    }
    if config.chat.storage_dir.trim().is_empty() {
        errors.push("chat.storage_dir must not be empty".to_string());
    }
    if config.provider.api_base.trim().is_empty() {
        errors.push("provider.api_base must not be empty".to_string());
    }
    if config.provider.timeout_secs == 0 {
        errors.push("provider.timeout_secs must be > 0".to_string());
    }

    let format = config.logging.format.to_lowercase();
    if format != "text" && format != "json" {
        errors.push(format!(
            "logging.format must be \"text\" or \"json\", got \"{}\"",
            config.logging.format
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}

/// Check that the settings needed to reach the completion service are present.
///
/// Kept apart from [`validate_config`] so configuration can be loaded and
/// edited before a key exists.
pub fn validate_credentials(config: &Config) -> crate::Result<()> {
    if config.provider.api_key.trim().is_empty() {
        return Err(crate::Error::Config(
            "no API key configured; set ANTHROPIC_API_KEY (environment or .env) or run `parley onboard`"
                .to_string(),
        ));
    }
    Ok(())
}
