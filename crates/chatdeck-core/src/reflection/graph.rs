//! Reflection expressed as a two-node workflow: `optimize` loops back to
//! itself while `current_round < max_rounds`, otherwise control moves to the
//! terminal `end` node.

use crate::error::DeckError;
use crate::llm::Message;
use crate::reflection::engine::{ReflectionEngine, ReflectionEvent};
use crate::reflection::OptimizationHistory;
use tokio::sync::mpsc::UnboundedSender;

/// State threaded through the workflow. Owned by a single run.
#[derive(Debug, Clone)]
pub struct ReflectionState {
    /// System prompt first, then the original content, then every refinement.
    pub messages: Vec<Message>,
    pub current_round: usize,
    pub optimization_history: OptimizationHistory,
    pub should_continue: bool,
}

impl ReflectionState {
    pub fn new(initial_content: &str, system_prompt: &str) -> Self {
        Self {
            messages: vec![
                Message::system(system_prompt),
                Message::user(initial_content),
            ],
            current_round: 1,
            optimization_history: OptimizationHistory::new(initial_content),
            should_continue: true,
        }
    }

    fn system_prompt(&self) -> &str {
        self.messages
            .first()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    fn current_content(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Optimize,
    End,
}

pub struct Workflow<'a> {
    engine: &'a ReflectionEngine,
    event_tx: &'a UnboundedSender<ReflectionEvent>,
}

impl<'a> Workflow<'a> {
    pub fn new(engine: &'a ReflectionEngine, event_tx: &'a UnboundedSender<ReflectionEvent>) -> Self {
        Self { engine, event_tx }
    }

    /// Conditional edge. Also checked before the first `optimize`, so a
    /// single-round run goes straight to `end`.
    fn route(&self, state: &mut ReflectionState) -> Node {
        state.should_continue = state.current_round < self.engine.max_rounds();
        if state.should_continue {
            Node::Optimize
        } else {
            Node::End
        }
    }

    async fn optimize(&self, mut state: ReflectionState) -> Result<ReflectionState, DeckError> {
        let round = state.current_round;
        let refined = self
            .engine
            .refine(
                round,
                state.system_prompt(),
                state.current_content(),
                self.event_tx,
            )
            .await?;

        state.messages.push(Message::assistant(refined.clone()));
        state.optimization_history.record(round, refined);
        state.current_round += 1;
        Ok(state)
    }

    pub async fn run(&self, mut state: ReflectionState) -> Result<ReflectionState, DeckError> {
        let mut node = self.route(&mut state);
        loop {
            match node {
                Node::Optimize => {
                    state = self.optimize(state).await?;
                    node = self.route(&mut state);
                }
                Node::End => return Ok(state),
            }
        }
    }
}
