/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Clear the current session transcript.
    Clear,
    /// Quit the application.
    Quit,
    /// Print the current session transcript.
    ShowHistory,
    /// Switch to another session.
    SwitchSession(String),
    /// List known sessions.
    ListSessions,
    /// Change the number of reflection rounds.
    SetRounds(usize),
    /// Show status (session, rounds, strategy, model).
    ShowStatus,
    /// Not a command - treat as regular input.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/clear" => CommandResult::Clear,
        "/history" => CommandResult::ShowHistory,
        "/sessions" => CommandResult::ListSessions,
        "/status" => CommandResult::ShowStatus,

        "/session" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /session <session-id>".into())
            } else {
                CommandResult::SwitchSession(arg.to_string())
            }
        }
        "/rounds" => match arg.parse::<usize>() {
            Ok(n) if n >= 1 => CommandResult::SetRounds(n),
            _ => CommandResult::Message(
                "Usage: /rounds <n>  (n >= 1; 1 means no refinement)".into(),
            ),
        },
        "/version" => CommandResult::Message(format!("ChatDeck CLI v{}", env!("CARGO_PKG_VERSION"))),

        // Unknown command
        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
╭─ ChatDeck CLI Commands ────────────────────────────────────────╮

  SESSION
    /clear                    Clear the current session transcript
    /history                  Show the current session transcript
    /session <id>             Switch to another session
    /sessions                 List sessions

  REFLECTION
    /rounds <n>               Set reflection rounds (1 = no refinement)
    /status                   Show session, rounds, strategy, model

  OTHER
    /help, /h                 Show this help message
    /version                  Show version information
    /exit, /quit, /q          Quit the application

  Anything else is sent as a topic for the slide deck.

╰────────────────────────────────────────────────────────────────╯";

    CommandResult::Message(help_text.into())
}
