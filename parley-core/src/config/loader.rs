//! Configuration loading and management

use super::schema::Config;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE: &str = "config.json";
const PATH_OVERRIDE_PREFIX: &str = "PARLEY__";

/// Configuration loader
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader with the default config directory
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .map(|h| h.join(".parley"))
            .unwrap_or_else(|| PathBuf::from(".parley"));

        Self { config_dir }
    }

    /// Create a new config loader with a custom config directory
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load configuration from file and environment.
    ///
    /// Precedence, lowest first: defaults, `config.json`, alias variables
    /// such as `ANTHROPIC_API_KEY`, then `PARLEY__SECTION__KEY` overrides.
    /// Values are not validated here; callers layer command-line flags on
    /// top and then run `validate_config`.
    pub fn load(&self) -> crate::Result<Config> {
        let config_path = self.config_path();
        let mut merged = serde_json::to_value(Config::default())?;

        if config_path.exists() {
            debug!(path = %config_path.display(), "Reading config file");
            let content = std::fs::read_to_string(&config_path)?;
            let file_value: Value = serde_json::from_str(&content).map_err(|e| {
                crate::Error::Config(format!("{}: {}", config_path.display(), e))
            })?;
            merge_values(&mut merged, file_value);
        }

        apply_alias_overrides(&mut merged);
        apply_path_overrides(&mut merged);

        let config: Config = serde_json::from_value(merged)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> crate::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(self.config_path(), content)?;
        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a `.env` file from the working directory (or a parent) into the
/// process environment. A missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenv::dotenv().ok()
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(existing) = base_map.get_mut(&key) {
                    merge_values(existing, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn parse_env_value(raw: &str) -> Value {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        return v;
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(raw.to_string())
}

fn set_path_value(root: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for segment in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Some(map) = current.as_object_mut() else {
            return;
        };
        current = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Some(map) = current.as_object_mut() {
        map.insert(last.clone(), value);
    }
}

fn apply_alias_overrides(config: &mut Value) {
    let aliases = [
        ("ANTHROPIC_API_KEY", "provider.api_key"),
        ("ANTHROPIC_BASE_URL", "provider.api_base"),
        ("PARLEY_MODEL", "chat.model"),
    ];

    for (env_key, target_path) in aliases {
        if let Ok(value) = std::env::var(env_key) {
            if value.trim().is_empty() {
                continue;
            }
            let path: Vec<String> = target_path.split('.').map(ToString::to_string).collect();
            set_path_value(config, &path, Value::String(value));
        }
    }
}

fn apply_path_overrides(config: &mut Value) {
    for (key, value) in std::env::vars() {
        let Some(suffix) = key.strip_prefix(PATH_OVERRIDE_PREFIX) else {
            continue;
        };
        let segments: Vec<String> = suffix
            .split("__")
            .filter(|s| !s.is_empty())
            .map(|s| s.to_ascii_lowercase())
            .collect();
        if segments.is_empty() {
            continue;
        }
        // String settings keep the raw text, so `PARLEY__CHAT__MODEL=2` stays "2"
        let parsed = match get_path_value(config, &segments) {
            Some(Value::String(_)) => Value::String(value),
            _ => parse_env_value(&value),
        };
        set_path_value(config, &segments, parsed);
    }
}

fn get_path_value<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter()
        .try_fold(root, |current, segment| current.get(segment.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceErrorPolicy;
    use once_cell::sync::Lazy;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    struct EnvVarGuard {
        key: String,
        original: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &str, value: &str) -> Self {
            let original = std::env::var(key).ok();
            // SAFETY: tests serialize env mutations with ENV_LOCK.
            unsafe { std::env::set_var(key, value) };
            Self {
                key: key.to_string(),
                original,
            }
        }

        fn unset(key: &str) -> Self {
            let original = std::env::var(key).ok();
            // SAFETY: tests serialize env mutations with ENV_LOCK.
            unsafe { std::env::remove_var(key) };
            Self {
                key: key.to_string(),
                original,
            }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.original {
                // SAFETY: tests serialize env mutations with ENV_LOCK.
                unsafe { std::env::set_var(&self.key, value) };
            } else {
                // SAFETY: tests serialize env mutations with ENV_LOCK.
                unsafe { std::env::remove_var(&self.key) };
            }
        }
    }

    fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn clean_env() -> Vec<EnvVarGuard> {
        vec![
            EnvVarGuard::unset("ANTHROPIC_API_KEY"),
            EnvVarGuard::unset("ANTHROPIC_BASE_URL"),
            EnvVarGuard::unset("PARLEY_MODEL"),
        ]
    }

    #[test]
    fn test_load_default_config() {
        let _lock = lock_env();
        let _clean = clean_env();
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let config = loader.load().unwrap();

        assert_eq!(config.chat.model, "claude-3-opus-20240229");
        assert_eq!(config.chat.max_tokens, 1024);
        assert!(config.provider.api_key.is_empty());
    }

    #[test]
    fn test_save_and_load_config() {
        let _lock = lock_env();
        let _clean = clean_env();
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());

        let mut config = Config::default();
        config.chat.model = "test-model".to_string();
        config.chat.on_service_error = ServiceErrorPolicy::Rollback;

        loader.save(&config).unwrap();
        let loaded = loader.load().unwrap();

        assert_eq!(loaded.chat.model, "test-model");
        assert_eq!(loaded.chat.on_service_error, ServiceErrorPolicy::Rollback);
    }

    #[test]
    fn test_load_applies_alias_env_overrides() {
        let _lock = lock_env();
        let _clean = clean_env();
        let _key_guard = EnvVarGuard::set("ANTHROPIC_API_KEY", "sk-ant-from-env");
        let _model_guard = EnvVarGuard::set("PARLEY_MODEL", "claude-3-haiku-20240307");

        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let config = loader.load().unwrap();

        assert_eq!(config.provider.api_key, "sk-ant-from-env");
        assert_eq!(config.chat.model, "claude-3-haiku-20240307");
    }

    #[test]
    fn test_load_applies_path_env_overrides() {
        let _lock = lock_env();
        let _clean = clean_env();
        let _tokens_guard = EnvVarGuard::set("PARLEY__CHAT__MAX_TOKENS", "2048");
        let _console_guard = EnvVarGuard::set("PARLEY__LOGGING__CONSOLE", "true");
        let _prompt_guard = EnvVarGuard::set("PARLEY__CHAT__SYSTEM_PROMPT", "Be terse.");

        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let config = loader.load().unwrap();

        assert_eq!(config.chat.max_tokens, 2048);
        assert!(config.logging.console);
        assert_eq!(config.chat.system_prompt, "Be terse.");
    }

    #[test]
    fn test_path_env_overrides_alias_and_file() {
        let _lock = lock_env();
        let _clean = clean_env();
        let _alias_guard = EnvVarGuard::set("ANTHROPIC_API_KEY", "sk-ant-alias");
        let _path_guard = EnvVarGuard::set("PARLEY__PROVIDER__API_KEY", "sk-ant-path");

        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        std::fs::write(
            loader.config_path(),
            r#"{"provider":{"api_key":"sk-ant-file"}}"#,
        )
        .unwrap();

        let config = loader.load().unwrap();
        assert_eq!(config.provider.api_key, "sk-ant-path");
    }

    #[test]
    fn test_file_values_survive_without_env() {
        let _lock = lock_env();
        let _clean = clean_env();
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        std::fs::write(
            loader.config_path(),
            r#"{"provider":{"api_key":"sk-ant-file"},"chat":{"storage_dir":"/tmp/p"}}"#,
        )
        .unwrap();

        let config = loader.load().unwrap();
        assert_eq!(config.provider.api_key, "sk-ant-file");
        assert_eq!(config.chat.storage_dir, "/tmp/p");
        assert_eq!(config.chat.max_tokens, 1024);
    }

    #[test]
    fn test_load_leaves_validation_to_caller() {
        let _lock = lock_env();
        let _clean = clean_env();
        let _guard = EnvVarGuard::set("PARLEY__CHAT__MAX_TOKENS", "0");

        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let mut config = loader.load().unwrap();
        assert_eq!(config.chat.max_tokens, 0);

        let err = crate::config::validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_tokens"));

        config.chat.max_tokens = 100;
        assert!(crate::config::validate_config(&config).is_ok());
    }

    #[test]
    fn test_numeric_env_value_for_string_setting_stays_text() {
        let _lock = lock_env();
        let _clean = clean_env();
        let _model_guard = EnvVarGuard::set("PARLEY__CHAT__MODEL", "2");
        let _prompt_guard = EnvVarGuard::set("PARLEY__CHAT__SYSTEM_PROMPT", "42");
        let _key_guard = EnvVarGuard::set("PARLEY__PROVIDER__API_KEY", "true");
        let _tokens_guard = EnvVarGuard::set("PARLEY__CHAT__MAX_TOKENS", "512");

        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let config = loader.load().unwrap();

        assert_eq!(config.chat.model, "2");
        assert_eq!(config.chat.system_prompt, "42");
        assert_eq!(config.provider.api_key, "true");
        assert_eq!(config.chat.max_tokens, 512);
    }

    #[test]
    fn test_invalid_config_file_reports_path() {
        let _lock = lock_env();
        let _clean = clean_env();
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        std::fs::write(loader.config_path(), "{ broken").unwrap();

        let err = loader.load().unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_set_path_value_creates_objects() {
        let mut root = serde_json::json!({"chat": 1});
        set_path_value(
            &mut root,
            &["chat".to_string(), "model".to_string()],
            Value::String("m".to_string()),
        );
        assert_eq!(root, serde_json::json!({"chat": {"model": "m"}}));
    }
}
