use anyhow::Result;
use chatdeck_core::{ChatBot, DeckError, ReflectionEvent, Role};
use std::io::Write;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::commands::{handle_command, CommandResult};

/// Prints reflection progress to stderr until the sender side is dropped.
fn spawn_progress_printer(
    mut event_rx: mpsc::UnboundedReceiver<ReflectionEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                ReflectionEvent::RoundStarted { round, total } => {
                    eprintln!("[round {}/{}: refining...]", round + 1, total)
                }
                ReflectionEvent::RoundCompleted { round, chars } => {
                    eprintln!("[round {}: {} chars]", round + 1, chars)
                }
                ReflectionEvent::Complete { rounds } => {
                    eprintln!("[done after {rounds} rounds]")
                }
                ReflectionEvent::Error(_) => {}
            }
        }
    })
}

// ── One-shot ────────────────────────────────────────────────────────────

/// Failed turns are reported with the generic retry text only and turn into
/// a failing exit code. The error itself never reaches `main`.
pub async fn run_single_prompt(
    bot: &ChatBot,
    prompt: &str,
    show_rounds: bool,
    json: bool,
) -> Result<ExitCode> {
    if show_rounds {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let printer = spawn_progress_printer(event_rx);
        let result = bot
            .engine()
            .optimize_content_with_events(prompt, bot.system_prompt(), event_tx)
            .await;
        printer.await?;

        let history = match result {
            Ok(history) => history,
            Err(e) => return Ok(report(&e)),
        };
        if json {
            println!("{}", serde_json::to_string_pretty(&history)?);
        } else {
            for (key, content) in history.iter() {
                println!("── {key} ──\n{content}\n");
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let printer = spawn_progress_printer(event_rx);
    let result = bot.chat_with_events(bot.session_id(), prompt, event_tx).await;
    printer.await?;

    let reply = match result {
        Ok(reply) => reply,
        Err(e) => return Ok(report(&e)),
    };
    if json {
        println!("{}", serde_json::json!({ "content": reply }));
    } else {
        println!("{reply}");
    }
    Ok(ExitCode::SUCCESS)
}

fn report(e: &DeckError) -> ExitCode {
    eprintln!("{}", e.user_message());
    ExitCode::FAILURE
}

// ── Interactive ─────────────────────────────────────────────────────────

pub async fn run_interactive(mut bot: ChatBot) -> Result<()> {
    println!(
        "ChatDeck v{} - enter a topic for your slides, /help for commands.",
        env!("CARGO_PKG_VERSION")
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}> ", bot.session_id());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match handle_command(input) {
            CommandResult::Quit => break,
            CommandResult::Message(msg) => println!("{msg}"),
            CommandResult::Clear => {
                bot.sessions().clear(bot.session_id()).await;
                println!("Cleared session '{}'.", bot.session_id());
            }
            CommandResult::ShowHistory => print_history(&bot).await,
            CommandResult::SwitchSession(id) => {
                bot = bot.with_session_id(id);
                println!("Switched to session '{}'.", bot.session_id());
            }
            CommandResult::ListSessions => {
                let ids = bot.sessions().session_ids();
                if ids.is_empty() {
                    println!("No sessions yet.");
                }
                for id in ids {
                    let marker = if id == bot.session_id() { "*" } else { " " };
                    println!("{marker} {id}");
                }
            }
            CommandResult::SetRounds(n) => {
                bot = bot.with_max_rounds(n);
                println!("Reflection rounds set to {}.", bot.engine().max_rounds());
            }
            CommandResult::ShowStatus => {
                let history = bot.history();
                let history = history.lock().await;
                println!(
                    "session: {}\nmodel: {}\nrounds: {}\nstrategy: {:?}\nmessages: {} (~{} tokens)",
                    bot.session_id(),
                    bot.model_name().unwrap_or("unknown"),
                    bot.engine().max_rounds(),
                    bot.engine().strategy(),
                    history.len(),
                    history.estimate_tokens(),
                );
            }
            CommandResult::NotACommand => {
                let (event_tx, event_rx) = mpsc::unbounded_channel();
                let printer = spawn_progress_printer(event_rx);
                let result = bot.chat_with_events(bot.session_id(), input, event_tx).await;
                printer.await?;

                match result {
                    Ok(reply) => println!("\n{reply}\n"),
                    Err(e) => {
                        report(&e);
                    }
                }
            }
        }
    }

    Ok(())
}

async fn print_history(bot: &ChatBot) {
    let history = bot.history();
    let history = history.lock().await;
    if history.is_empty() {
        println!("Session '{}' is empty.", bot.session_id());
        return;
    }
    for message in history.get_conversation_messages() {
        let who = match message.role {
            Role::User => "you",
            Role::Assistant => "deck",
            Role::System => "system",
        };
        println!("[{who}] {}\n", message.content);
    }
}
