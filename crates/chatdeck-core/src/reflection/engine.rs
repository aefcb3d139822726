use crate::constants::defaults;
use crate::error::DeckError;
use crate::llm::{LlmClient, Message};
use crate::reflection::graph::{ReflectionState, Workflow};
use crate::reflection::{critique_prompt, OptimizationHistory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Events emitted while a reflection run progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectionEvent {
    RoundStarted { round: usize, total: usize },
    RoundCompleted { round: usize, chars: usize },
    Complete { rounds: usize },
    Error(String),
}

/// Control-flow used to drive the rounds. Both produce identical histories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReflectionStrategy {
    /// Plain bounded loop.
    #[default]
    Sequential,
    /// Two-node `optimize`/`end` workflow with a conditional self-loop.
    Graph,
}

impl std::str::FromStr for ReflectionStrategy {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "loop" => Ok(Self::Sequential),
            "graph" | "workflow" => Ok(Self::Graph),
            other => Err(DeckError::Config(format!(
                "unknown reflection strategy '{other}' (expected sequential or graph)"
            ))),
        }
    }
}

/// Multi-round critique-and-regenerate over a single piece of content.
///
/// `max_rounds` counts stored rounds including the untouched `round_0`, so a
/// run makes exactly `max_rounds - 1` generation calls. The engine holds no
/// per-run state and can serve concurrent runs.
pub struct ReflectionEngine {
    llm: Arc<dyn LlmClient>,
    max_rounds: usize,
    strategy: ReflectionStrategy,
}

impl ReflectionEngine {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            max_rounds: defaults::MAX_ROUNDS,
            strategy: ReflectionStrategy::default(),
        }
    }

    /// Values below 1 are raised to 1 (no refinement at all).
    pub fn with_max_rounds(mut self, max: usize) -> Self {
        self.max_rounds = max.max(1);
        self
    }

    pub fn with_strategy(mut self, strategy: ReflectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    pub fn strategy(&self) -> ReflectionStrategy {
        self.strategy
    }

    /// Refine `initial_content` and return every round's output.
    pub async fn optimize_content(
        &self,
        initial_content: &str,
        system_prompt: &str,
    ) -> Result<OptimizationHistory, DeckError> {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        self.optimize_content_with_events(initial_content, system_prompt, tx)
            .await
    }

    /// Same as [`optimize_content`](Self::optimize_content), emitting
    /// `ReflectionEvent`s through the channel.
    pub async fn optimize_content_with_events(
        &self,
        initial_content: &str,
        system_prompt: &str,
        event_tx: UnboundedSender<ReflectionEvent>,
    ) -> Result<OptimizationHistory, DeckError> {
        if initial_content.trim().is_empty() {
            let err = DeckError::Input("initial content is empty".into());
            let _ = event_tx.send(ReflectionEvent::Error(err.to_string()));
            return Err(err);
        }

        let result = match self.strategy {
            ReflectionStrategy::Sequential => {
                self.run_sequential(initial_content, system_prompt, &event_tx)
                    .await
            }
            ReflectionStrategy::Graph => {
                let state = ReflectionState::new(initial_content, system_prompt);
                Workflow::new(self, &event_tx)
                    .run(state)
                    .await
                    .map(|state| state.optimization_history)
            }
        };

        match result {
            Ok(history) => {
                tracing::info!(rounds = history.len(), "Content optimization complete");
                let _ = event_tx.send(ReflectionEvent::Complete {
                    rounds: history.len(),
                });
                Ok(history)
            }
            Err(e) => {
                tracing::debug!("Content optimization failed: {}", e);
                let _ = event_tx.send(ReflectionEvent::Error(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run_sequential(
        &self,
        initial_content: &str,
        system_prompt: &str,
        event_tx: &UnboundedSender<ReflectionEvent>,
    ) -> Result<OptimizationHistory, DeckError> {
        let mut history = OptimizationHistory::new(initial_content);

        for round in 1..self.max_rounds {
            let refined = self
                .refine(round, system_prompt, history.final_content(), event_tx)
                .await?;
            history.record(round, refined);
        }

        Ok(history)
    }

    /// One critique-and-regenerate step. Failures are tagged with `round`.
    pub(crate) async fn refine(
        &self,
        round: usize,
        system_prompt: &str,
        current_content: &str,
        event_tx: &UnboundedSender<ReflectionEvent>,
    ) -> Result<String, DeckError> {
        tracing::info!("Starting optimization round {}/{}", round + 1, self.max_rounds);
        let _ = event_tx.send(ReflectionEvent::RoundStarted {
            round,
            total: self.max_rounds,
        });

        let messages = round_messages(system_prompt, current_content, round);
        let response = self
            .llm
            .chat(&messages)
            .await
            .map_err(|e| {
                tracing::debug!(round, "Generation call failed: {}", e);
                DeckError::generation(round, e)
            })?;

        let refined = response.message.content;
        tracing::info!("Finished optimization round {}/{}", round + 1, self.max_rounds);
        let _ = event_tx.send(ReflectionEvent::RoundCompleted {
            round,
            chars: refined.chars().count(),
        });
        Ok(refined)
    }
}

/// `[system prompt, current content, critique]` for one round.
pub fn round_messages(system_prompt: &str, current_content: &str, round: usize) -> Vec<Message> {
    vec![
        Message::system(system_prompt),
        Message::user(current_content),
        Message::system(critique_prompt(round)),
    ]
}
