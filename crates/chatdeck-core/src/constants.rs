/// ChatDeck — centralized constants.
/// Defaults, endpoints, and limits live here.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
    pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
    pub const TEMPERATURE: f32 = 0.7;
    pub const MAX_TOKENS: u32 = 4096;
    pub const TIMEOUT_SECS: u64 = 120;

    pub const MAX_ROUNDS: usize = 3;

    pub const PROMPT_FILE: &str = "prompts/chatbot.txt";
    pub const SESSION_ID: &str = "default_session_id";
    pub const MAX_MESSAGES: usize = 100;
}

// ─── Limits ───────────────────────────────────────────────────────────────────

pub mod limits {
    pub const MAX_TEMPERATURE: f32 = 2.0;
}
