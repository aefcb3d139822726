use crate::config::Settings;
use crate::constants::defaults;
use crate::context::{SessionStore, SharedHistory};
use crate::error::DeckError;
use crate::llm::LlmClient;
use crate::reflection::{ReflectionEngine, ReflectionEvent, ReflectionStrategy};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Read a system prompt from disk, trimmed.
pub fn load_prompt(path: &Path) -> Result<String, DeckError> {
    std::fs::read_to_string(path)
        .map(|content| content.trim().to_string())
        .map_err(|e| {
            DeckError::Config(format!("Prompt file {} not found: {}", path.display(), e))
        })
}

/// Answers user turns: every turn goes through the reflection engine and the
/// refined content is recorded in the session transcript.
pub struct ChatBot {
    engine: ReflectionEngine,
    sessions: Arc<SessionStore>,
    system_prompt: String,
    session_id: String,
    model: Option<String>,
}

impl ChatBot {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            engine: ReflectionEngine::new(llm),
            sessions: Arc::new(SessionStore::new()),
            system_prompt: system_prompt.into(),
            session_id: defaults::SESSION_ID.to_string(),
            model: None,
        }
    }

    /// Build a bot from settings: validates them, loads the prompt file, and
    /// resolves credentials before anything talks to the provider.
    pub fn from_settings(settings: &Settings) -> Result<Self, DeckError> {
        settings.validate()?;
        let system_prompt = load_prompt(&settings.chat.prompt_file)?;
        let llm = settings.build_llm_client()?;
        Ok(Self::with_settings(Arc::new(llm), system_prompt, settings))
    }

    /// Like `from_settings` but with a caller-supplied client and prompt.
    pub fn with_settings(
        llm: Arc<dyn LlmClient>,
        system_prompt: impl Into<String>,
        settings: &Settings,
    ) -> Self {
        Self::new(llm, system_prompt)
            .with_sessions(Arc::new(
                SessionStore::new().with_max_messages(settings.chat.max_messages),
            ))
            .with_session_id(settings.chat.session_id.clone())
            .with_max_rounds(settings.reflection.max_rounds)
            .with_strategy(settings.reflection.strategy)
            .with_model_name(settings.llm.model.clone())
    }

    pub fn with_sessions(mut self, sessions: Arc<SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Empty ids fall back to the default session.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        self.session_id = if session_id.trim().is_empty() {
            defaults::SESSION_ID.to_string()
        } else {
            session_id
        };
        self
    }

    pub fn with_max_rounds(mut self, max: usize) -> Self {
        self.engine = self.engine.with_max_rounds(max);
        self
    }

    pub fn with_strategy(mut self, strategy: ReflectionStrategy) -> Self {
        self.engine = self.engine.with_strategy(strategy);
        self
    }

    /// Label for the model behind the client. Display only.
    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn engine(&self) -> &ReflectionEngine {
        &self.engine
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Transcript of the bot's current session.
    pub fn history(&self) -> SharedHistory {
        self.sessions.get_history(&self.session_id)
    }

    /// Answer one turn in the bot's own session.
    pub async fn chat_with_history(&self, text: &str) -> Result<String, DeckError> {
        self.chat_in_session(&self.session_id, text).await
    }

    pub async fn chat_in_session(&self, session_id: &str, text: &str) -> Result<String, DeckError> {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        self.chat_with_events(session_id, text, tx).await
    }

    pub async fn chat_with_events(
        &self,
        session_id: &str,
        text: &str,
        event_tx: UnboundedSender<ReflectionEvent>,
    ) -> Result<String, DeckError> {
        if text.trim().is_empty() {
            return Err(DeckError::Input("please enter some content".into()));
        }

        let history = self
            .engine
            .optimize_content_with_events(text, &self.system_prompt, event_tx)
            .await
            .inspect_err(|e| tracing::debug!("Chat turn failed: {}", e))?;

        let reply = history.into_final();
        tracing::debug!("AI response: {}", reply);

        let transcript = self.sessions.get_history(session_id);
        let mut transcript = transcript.lock().await;
        transcript.add_user_message(text);
        transcript.add_assistant_message(reply.clone());

        Ok(reply)
    }
}
