//! LLM abstraction layer

mod ollama;

pub use ollama::OllamaClient;

use anyhow::Result;
use async_trait::async_trait;

/// Message in a conversation
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Trait for LLM backends
#[async_trait]
pub trait Llm: Send + Sync {
    /// Send a fixed conversation (system prompt + user turn) and get a response
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Get the model name
    fn model(&self) -> &str;
}
