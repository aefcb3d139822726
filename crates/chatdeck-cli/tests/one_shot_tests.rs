use chatdeck_core::error::RETRY_MESSAGE;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

// ========================================================================
// One-shot failures (app.rs run_single_prompt)
// ========================================================================

const KEY_ENV: &str = "CHATDECK_CLI_TEST_API_KEY";
const SECRET: &str = "sk-cli-test-secret";

/// Config pointing at a port nothing listens on, so every generation call
/// fails with a connection error.
fn write_unreachable_config(dir: &Path) -> std::path::PathBuf {
    let prompt = dir.join("chatbot.txt");
    std::fs::write(&prompt, "You write slides.").unwrap();

    let config = dir.join("config.toml");
    std::fs::write(
        &config,
        format!(
            "[llm]\nbase_url = \"http://127.0.0.1:1\"\napi_key_env = \"{KEY_ENV}\"\ntimeout_secs = 5\n\n\
             [reflection]\nmax_rounds = 2\n\n[chat]\nprompt_file = '{}'\n",
            prompt.display()
        ),
    )
    .unwrap();
    config
}

fn run_one_shot(config: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chatdeck"))
        .arg("--config")
        .arg(config)
        .args(["-p", "AI in education"])
        .args(extra)
        .env(KEY_ENV, SECRET)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn assert_only_retry_message(output: &Output) {
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "stderr: {stderr}");
    assert_eq!(stderr.lines().last(), Some(RETRY_MESSAGE), "stderr: {stderr}");
    for detail in ["Error:", "Caused by", "127.0.0.1", "Generation failed", SECRET] {
        assert!(!stderr.contains(detail), "leaked {detail:?} in: {stderr}");
    }
    assert!(output.stdout.is_empty());
}

#[test]
fn test_failed_one_shot_prints_only_retry_message() {
    let dir = TempDir::new().unwrap();
    let config = write_unreachable_config(dir.path());

    assert_only_retry_message(&run_one_shot(&config, &[]));
}

#[test]
fn test_failed_one_shot_with_rounds_or_json_prints_only_retry_message() {
    let dir = TempDir::new().unwrap();
    let config = write_unreachable_config(dir.path());

    assert_only_retry_message(&run_one_shot(&config, &["--show-rounds"]));
    assert_only_retry_message(&run_one_shot(&config, &["--json"]));
}
