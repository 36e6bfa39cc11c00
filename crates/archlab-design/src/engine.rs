use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;

use archlab_core::AiSettings;

use crate::prompt::Prompt;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("build LLM: {0}")]
    Build(String),

    #[error("provider rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("chat: {0}")]
    Provider(String),

    #[error("LLM returned no text")]
    EmptyResponse,
}

/// The text-generation service a design is requested from.
#[async_trait]
pub trait DesignModel: Send + Sync {
    /// Short identifier for logs, e.g. "google/gemini-2.0-flash".
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &Prompt) -> Result<String, EngineError>;
}

fn map_backend(provider: &str) -> Result<LLMBackend, EngineError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(EngineError::UnknownProvider(other.to_string())),
    }
}

/// Sort a provider failure into rate limiting or anything else.
fn classify(message: String) -> EngineError {
    let lower = message.to_lowercase();
    if lower.contains("429")
        || lower.contains("rate limit")
        || lower.contains("too many requests")
        || lower.contains("quota")
    {
        EngineError::RateLimited(message)
    } else {
        EngineError::Provider(message)
    }
}

/// `DesignModel` backed by the `llm` crate's provider clients.
pub struct LlmEngine {
    settings: AiSettings,
    name: String,
}

impl LlmEngine {
    /// Fails fast on providers the `llm` crate does not know.
    pub fn new(settings: AiSettings) -> Result<Self, EngineError> {
        map_backend(&settings.provider)?;
        let name = format!("{}/{}", settings.provider, settings.model);
        Ok(Self { settings, name })
    }
}

#[async_trait]
impl DesignModel for LlmEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, EngineError> {
        let backend = map_backend(&self.settings.provider)?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&self.settings.model)
            .system(&prompt.system)
            .timeout_seconds(self.settings.timeout_secs);

        if !self.settings.api_key.is_empty() {
            builder = builder.api_key(&self.settings.api_key);
        }

        let llm = builder.build().map_err(|e| EngineError::Build(e.to_string()))?;

        let messages = vec![ChatMessage::user().content(&prompt.user).build()];

        tracing::info!(model = %self.name, "requesting design");
        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| classify(e.to_string()))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(EngineError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_provider() {
        let settings = AiSettings { provider: "acme".into(), ..AiSettings::default() };
        assert!(matches!(LlmEngine::new(settings), Err(EngineError::UnknownProvider(p)) if p == "acme"));
    }

    #[test]
    fn names_engine_after_provider_and_model() {
        let engine = LlmEngine::new(AiSettings::default()).unwrap();
        assert_eq!(engine.name(), "google/gemini-2.0-flash");
    }

    #[test]
    fn classifies_rate_limits() {
        assert!(matches!(classify("HTTP 429 Too Many Requests".into()), EngineError::RateLimited(_)));
        assert!(matches!(classify("Quota exceeded for metric".into()), EngineError::RateLimited(_)));
        assert!(matches!(classify("connection reset".into()), EngineError::Provider(_)));
    }
}
