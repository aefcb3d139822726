use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod app;
mod commands;

#[derive(Parser)]
#[command(name = "chatdeck")]
#[command(about = "ChatDeck - slide-deck content through reflective refinement")]
#[command(version)]
struct Cli {
    /// Run a single prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// LLM model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Reflection rounds, counting the original input (1 = no refinement)
    #[arg(short, long)]
    rounds: Option<usize>,

    /// Session id for the transcript
    #[arg(short, long)]
    session: Option<String>,

    /// File holding the system prompt
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Reflection control flow (sequential, graph)
    #[arg(long)]
    strategy: Option<String>,

    /// Alternate config file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every round of the refinement (one-shot mode)
    #[arg(long)]
    show_rounds: bool,

    /// Print output as JSON (one-shot mode)
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = match cli.config {
        Some(ref path) => chatdeck_core::Settings::load_from(path)?,
        None => chatdeck_core::Settings::load(),
    };

    if let Some(ref model) = cli.model {
        settings.llm.model = model.clone();
    }
    if let Some(rounds) = cli.rounds {
        settings.reflection.max_rounds = rounds;
    }
    if let Some(ref session) = cli.session {
        settings.chat.session_id = session.clone();
    }
    if let Some(ref prompt_file) = cli.prompt_file {
        settings.chat.prompt_file = prompt_file.clone();
    }
    if let Some(ref strategy) = cli.strategy {
        settings.reflection.strategy = strategy.parse()?;
    }

    tracing::debug!(
        model = %settings.llm.model,
        rounds = settings.reflection.max_rounds,
        strategy = ?settings.reflection.strategy,
        "settings resolved"
    );
    let bot = chatdeck_core::ChatBot::from_settings(&settings)?;

    if let Some(prompt) = cli.prompt {
        return app::run_single_prompt(&bot, &prompt, cli.show_rounds, cli.json).await;
    }

    app::run_interactive(bot).await?;
    Ok(ExitCode::SUCCESS)
}
