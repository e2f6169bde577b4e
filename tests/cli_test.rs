/// CLI binary integration tests using assert_cmd
///
/// These tests invoke the actual binary and verify command-line behavior
mod common;

use std::process::Command;

use assert_cmd::prelude::*;
use common::*;
use predicates::prelude::*;

fn explorer(dir: &ExportDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_chat-history-explorer"));
    for var in [
        "CHAT_HISTORY_DATA_DIR",
        "CHAT_HISTORY_CHATGPT_PATH",
        "CHAT_HISTORY_CLAUDE_PATH",
        "CHAT_HISTORY_FAVORITES_PATH",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("CHAT_HISTORY_DATA_DIR", dir.path());
    cmd
}

fn with_both_exports() -> ExportDir {
    let dir = ExportDir::new();
    dir.write_chatgpt(&export_of(vec![
        ChatGptConversationBuilder::new("gpt-1", "Rust lifetimes")
            .message("a", "user", "explain lifetimes")
            .message("b", "assistant", "lifetimes name how long a borrow lives")
            .build(),
    ]));
    dir.write_claude(&export_of(vec![
        ClaudeConversationBuilder::new("claude-1", "Garden")
            .created_at("2024-03-01T10:00:00Z")
            .message(ClaudeMessageBuilder::new("m1", "human").text("when to plant tomatoes"))
            .message(ClaudeMessageBuilder::new("m2", "assistant").text("after the last frost"))
            .build(),
        ClaudeConversationBuilder::new("claude-2", "Lifetimes again")
            .created_at("2024-04-01T10:00:00Z")
            .message(ClaudeMessageBuilder::new("m3", "human").text("static lifetimes?"))
            .build(),
    ]));
    dir
}

#[test]
fn test_cli_no_command_shows_help_message() {
    let dir = ExportDir::new();
    explorer(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Use --help for usage information"));
}

#[test]
fn test_cli_help_flag() {
    let dir = ExportDir::new();
    explorer(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("search"));
}

#[test]
fn test_cli_version_flag() {
    let dir = ExportDir::new();
    explorer(&dir).arg("--version").assert().success().stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_cli_inspect_reports_both_providers() {
    let dir = with_both_exports();
    explorer(&dir)
        .args(["--chatgpt-path", &dir.chatgpt_dir().to_string_lossy()])
        .args(["--claude-path", &dir.claude_dir().to_string_lossy()])
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chat History Inspection"))
        .stdout(predicate::str::contains("ChatGPT ("))
        .stdout(predicate::str::contains("Claude ("))
        .stdout(predicate::str::contains("Conversations: 2"))
        .stdout(predicate::str::contains("Messages: 3"))
        .stdout(predicate::str::contains("Warnings: 0"));
}

#[test]
fn test_cli_inspect_picks_up_bare_chatgpt_export_in_data_dir() {
    let dir = ExportDir::new();
    dir.write_export(
        dir.path(),
        &export_of(vec![ChatGptConversationBuilder::new("c", "Bare").message("a", "user", "hi").build()])
            .to_string(),
    );

    explorer(&dir)
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversations: 1"))
        .stdout(predicate::str::contains("Claude: not configured"));
}

#[test]
fn test_cli_inspect_unsupported_export_is_reported_not_fatal() {
    let dir = ExportDir::new();
    dir.write_export(&dir.claude_dir(), r#"[{"messages": []}]"#);

    explorer(&dir)
        .env("CHAT_HISTORY_CLAUDE_PATH", dir.claude_dir())
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("no conversations found / unsupported format"));
}

#[test]
fn test_cli_inspect_lists_unknown_tags() {
    let dir = ExportDir::new();
    let message = serde_json::json!({
        "id": "x",
        "author": {"role": "assistant"},
        "create_time": BASE_TIME,
        "content": {"content_type": "hologram_v9", "text": "cube"}
    });
    dir.write_chatgpt(&export_of(vec![
        ChatGptConversationBuilder::new("c", "Drift").node("x", "root", message).build(),
    ]));

    explorer(&dir)
        .env("CHAT_HISTORY_CHATGPT_PATH", dir.chatgpt_dir())
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown tags:"))
        .stdout(predicate::str::contains("hologram_v9: 1"));
}

#[test]
fn test_cli_detect_claude_export() {
    let dir = with_both_exports();
    explorer(&dir)
        .arg("detect")
        .arg(dir.claude_dir().join("conversations.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider: Claude"))
        .stdout(predicate::str::contains("Conversations: 2"))
        .stdout(predicate::str::contains("First conversation: 2024-03-01 10:00 UTC"))
        .stdout(predicate::str::contains("Last conversation: 2024-04-01 10:00 UTC"));
}

#[test]
fn test_cli_detect_missing_file_fails() {
    let dir = ExportDir::new();
    explorer(&dir)
        .arg("detect")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open export file"));
}

#[test]
fn test_cli_export_writes_filtered_files() {
    let dir = with_both_exports();
    let out = dir.path().join("out");

    explorer(&dir)
        .env("CHAT_HISTORY_CHATGPT_PATH", dir.chatgpt_dir())
        .env("CHAT_HISTORY_CLAUDE_PATH", dir.claude_dir())
        .args(["export", "--out", &out.to_string_lossy(), "--filter", "provider:claude"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 conversations"));

    let written: Vec<_> = std::fs::read_dir(out.join("claude")).unwrap().collect();
    assert_eq!(written.len(), 2);
    assert!(!out.join("chatgpt").exists());
}

#[test]
fn test_cli_export_text_format() {
    let dir = with_both_exports();
    let out = dir.path().join("out");

    explorer(&dir)
        .env("CHAT_HISTORY_CHATGPT_PATH", dir.chatgpt_dir())
        .args(["export", "--out", &out.to_string_lossy(), "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 conversations"));

    let file = std::fs::read_dir(out.join("chatgpt")).unwrap().next().unwrap().unwrap().path();
    assert_eq!(file.extension().unwrap(), "txt");
    let content = std::fs::read_to_string(file).unwrap();
    assert!(content.starts_with("Rust lifetimes\nProvider: chatgpt\n"));
}

#[test]
fn test_cli_export_invalid_filter_fails() {
    let dir = with_both_exports();
    explorer(&dir)
        .args(["export", "--filter", "colour:blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --filter"));
}

#[test]
fn test_cli_search_finds_titles_and_messages() {
    let dir = with_both_exports();
    explorer(&dir)
        .env("CHAT_HISTORY_CHATGPT_PATH", dir.chatgpt_dir())
        .env("CHAT_HISTORY_CLAUDE_PATH", dir.claude_dir())
        .args(["search", "lifetimes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[claude]"))
        .stdout(predicate::str::contains("[chatgpt]"))
        .stdout(predicate::str::contains("https://chat.openai.com/c/gpt-1"))
        .stdout(predicate::str::contains("5 result(s)"));
}

#[test]
fn test_cli_search_respects_provider_and_limit() {
    let dir = with_both_exports();
    explorer(&dir)
        .env("CHAT_HISTORY_CHATGPT_PATH", dir.chatgpt_dir())
        .env("CHAT_HISTORY_CLAUDE_PATH", dir.claude_dir())
        .args(["search", "lifetimes", "--provider", "chatgpt", "--limit", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[claude]").not())
        .stdout(predicate::str::contains("2 result(s)"));
}

#[test]
fn test_cli_search_no_matches() {
    let dir = with_both_exports();
    explorer(&dir)
        .env("CHAT_HISTORY_CLAUDE_PATH", dir.claude_dir())
        .args(["search", "zeppelin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches for zeppelin"));
}
