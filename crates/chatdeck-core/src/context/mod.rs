mod history;
mod sessions;

pub use history::ConversationHistory;
pub use sessions::{SessionStore, SharedHistory};
