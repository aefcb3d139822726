pub mod chat;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod llm;
pub mod reflection;

// Re-export key types
pub use chat::{load_prompt, ChatBot};
pub use config::{GenerationConfig, Settings};
pub use context::{ConversationHistory, SessionStore};
pub use error::DeckError;
pub use llm::{LlmClient, LlmResponse, Message, OpenAIClient, Role, Usage};
pub use reflection::{
    critique_prompt, OptimizationHistory, ReflectionEngine, ReflectionEvent, ReflectionState,
    ReflectionStrategy,
};
