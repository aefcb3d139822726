use thiserror::Error;

/// Shown to end users in place of internal error detail.
pub const RETRY_MESSAGE: &str = "Network problem, please try again :)";

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A generation call failed while refining content. `round` is 1-indexed
    /// in the same numbering as the history keys (`round_1` is the first call).
    #[error("Generation failed in round {round}: {source}")]
    Generation {
        round: usize,
        #[source]
        source: Box<DeckError>,
    },
}

impl DeckError {
    pub fn generation(round: usize, source: DeckError) -> Self {
        Self::Generation {
            round,
            source: Box::new(source),
        }
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation { .. })
    }

    /// Round in which a reflection run aborted, if this error came from one.
    pub fn failed_round(&self) -> Option<usize> {
        match self {
            Self::Generation { round, .. } => Some(*round),
            _ => None,
        }
    }

    /// Message suitable for an end user. Input problems are explained,
    /// everything else collapses to a generic retry prompt.
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(_) => "Please enter some content first.".to_string(),
            Self::Config(msg) => format!("ChatDeck is not configured correctly: {msg}"),
            _ => RETRY_MESSAGE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
