use chatdeck_cli::commands::{handle_command, CommandResult};

// ========================================================================
// Command Parsing Tests (commands.rs)
// ========================================================================

// --- BASIC SLASH COMMANDS ---

#[test]
fn test_help_command() {
    let result = handle_command("/help");

    if let CommandResult::Message(msg) = result {
        assert!(msg.contains("ChatDeck CLI Commands"));
        assert!(msg.contains("/rounds"));
        assert!(msg.contains("/session"));
    } else {
        panic!("expected help text");
    }
}

#[test]
fn test_help_command_short_alias() {
    assert!(matches!(handle_command("/h"), CommandResult::Message(_)));
}

#[test]
fn test_quit_aliases() {
    for cmd in ["/exit", "/quit", "/q"] {
        assert_eq!(handle_command(cmd), CommandResult::Quit, "{cmd}");
    }
}

#[test]
fn test_clear_command() {
    assert_eq!(handle_command("/clear"), CommandResult::Clear);
}

#[test]
fn test_history_and_sessions_commands() {
    assert_eq!(handle_command("/history"), CommandResult::ShowHistory);
    assert_eq!(handle_command("/sessions"), CommandResult::ListSessions);
    assert_eq!(handle_command("/status"), CommandResult::ShowStatus);
}

// --- COMMANDS WITH ARGUMENTS ---

#[test]
fn test_session_command_with_id() {
    assert_eq!(
        handle_command("/session  quarterly-review "),
        CommandResult::SwitchSession("quarterly-review".into())
    );
}

#[test]
fn test_session_command_without_id_shows_usage() {
    match handle_command("/session") {
        CommandResult::Message(msg) => assert!(msg.contains("Usage")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_rounds_command_parses_number() {
    assert_eq!(handle_command("/rounds 5"), CommandResult::SetRounds(5));
    assert_eq!(handle_command("/rounds 1"), CommandResult::SetRounds(1));
}

#[test]
fn test_rounds_command_rejects_invalid_values() {
    for cmd in ["/rounds", "/rounds 0", "/rounds -2", "/rounds many"] {
        assert!(
            matches!(handle_command(cmd), CommandResult::Message(ref m) if m.contains("Usage")),
            "{cmd}"
        );
    }
}

#[test]
fn test_version_command() {
    match handle_command("/version") {
        CommandResult::Message(msg) => assert!(msg.starts_with("ChatDeck CLI v")),
        other => panic!("unexpected: {other:?}"),
    }
}

// --- NON-COMMANDS ---

#[test]
fn test_unknown_slash_command() {
    match handle_command("/deploy") {
        CommandResult::Message(msg) => assert!(msg.contains("Unknown command: /deploy")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_plain_text_is_not_a_command() {
    assert_eq!(
        handle_command("AI in education"),
        CommandResult::NotACommand
    );
    assert_eq!(
        handle_command("slides about /etc/hosts"),
        CommandResult::NotACommand
    );
}

#[test]
fn test_leading_whitespace_is_ignored() {
    assert_eq!(handle_command("   /clear"), CommandResult::Clear);
}
