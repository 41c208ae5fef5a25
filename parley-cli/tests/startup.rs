use std::process::{Command, Output};

fn parley(args: &[&str], config_dir: &std::path::Path) -> Output {
    parley_with_env(args, config_dir, &[])
}

fn parley_with_env(args: &[&str], config_dir: &std::path::Path, envs: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_parley"))
        .args(args)
        .arg("--config-dir")
        .arg(config_dir)
        .current_dir(config_dir)
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("PARLEY__PROVIDER__API_KEY")
        .env_remove("RUST_LOG")
        .env_remove("PARLEY__LOGGING__DIR")
        .envs(envs.iter().copied())
        .output()
        .expect("Failed to run parley")
}

#[test]
fn test_missing_api_key_fails_before_chat_loop() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let output = parley(&["chat"], temp_dir.path());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("ANTHROPIC_API_KEY"), "stderr: {}", stderr);
    // The loop never started, so no banner was printed.
    assert!(!stdout.contains("Welcome"), "stdout: {}", stdout);
}

#[test]
fn test_invalid_config_file_is_fatal() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("config.json"),
        r#"{"chat": {"max_tokens": 0}, "provider": {"api_key": "sk-ant-test"}}"#,
    )
    .unwrap();

    let output = parley(&[], temp_dir.path());
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("max_tokens"), "stderr: {}", stderr);
}

#[test]
fn test_help_lists_subcommands() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let output = parley(&["--help"], temp_dir.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("chat"));
    assert!(stdout.contains("onboard"));
}

#[test]
fn test_max_tokens_flag_overrides_invalid_file_value() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("config.json"),
        r#"{"chat": {"max_tokens": 0}, "provider": {"api_key": "sk-ant-test"}}"#,
    )
    .unwrap();
    let log_dir = temp_dir.path().join("logs");
    let log_dir = log_dir.to_str().unwrap();

    // stdin is closed, so the loop starts and ends immediately.
    let output = parley_with_env(
        &["chat", "--max-tokens", "100"],
        temp_dir.path(),
        &[("PARLEY__LOGGING__DIR", log_dir)],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stdout.contains("Welcome"), "stdout: {}", stdout);
    assert!(stdout.contains("Goodbye!"), "stdout: {}", stdout);
}

#[test]
fn test_unusable_log_dir_is_reported_not_a_crash() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let blocker = temp_dir.path().join("notadir");
    std::fs::write(&blocker, "x").unwrap();
    let log_dir = blocker.join("logs");

    let output = parley_with_env(
        &["chat"],
        temp_dir.path(),
        &[
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
            ("PARLEY__LOGGING__DIR", log_dir.to_str().unwrap()),
        ],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr);
    assert!(!stderr.contains("panicked"), "stderr: {}", stderr);
    assert!(stderr.contains("logging.dir"), "stderr: {}", stderr);
    assert!(!stdout.contains("Welcome"), "stdout: {}", stdout);
}
