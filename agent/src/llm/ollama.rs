//! Ollama LLM implementation

use anyhow::{Context, Result};
use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{request::ChatMessageRequest, ChatMessage},
    Ollama,
};

use super::{Llm, Message, Role};

/// Ollama client wrapper
pub struct OllamaClient {
    client: Ollama,
    model: String,
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// Fails if `url` is not a valid absolute URL with a host.
    pub fn new(url: &str, model: &str) -> Result<Self> {
        let parsed =
            url::Url::parse(url).with_context(|| format!("Invalid Ollama URL: {}", url))?;

        let host = parsed
            .host_str()
            .with_context(|| format!("Ollama URL has no host: {}", url))?
            .to_string();
        let port = parsed.port().unwrap_or(11434);

        tracing::debug!(host = %host, port, model, "Creating Ollama client");

        Ok(Self {
            client: Ollama::new(format!("{}://{}", parsed.scheme(), host), port),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Llm for OllamaClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let messages: Vec<ChatMessage> = messages
            .iter()
            .map(|m| match m.role {
                Role::System => ChatMessage::system(m.content.clone()),
                Role::User => ChatMessage::user(m.content.clone()),
                Role::Assistant => ChatMessage::assistant(m.content.clone()),
            })
            .collect();

        let request = ChatMessageRequest::new(self.model.clone(), messages);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .with_context(|| format!("Ollama chat request failed (model {})", self.model))?;

        Ok(response.message.content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_url_with_port() {
        let client = OllamaClient::new("http://192.168.1.4:11434", "llama3.1:8b").unwrap();
        assert_eq!(client.model(), "llama3.1:8b");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(OllamaClient::new("not a url", "llama3.1:8b").is_err());
    }
}
