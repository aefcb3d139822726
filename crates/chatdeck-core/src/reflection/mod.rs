mod engine;
pub mod graph;
mod history;
mod prompt;

pub use engine::{round_messages, ReflectionEngine, ReflectionEvent, ReflectionStrategy};
pub use graph::{Node, ReflectionState, Workflow};
pub use history::{round_key, OptimizationHistory, FINAL_CONTENT_KEY};
pub use prompt::critique_prompt;
