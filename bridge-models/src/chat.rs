//! Chat message shapes and the model trait.

use std::fmt;

use async_trait::async_trait;
use bridge_primitives::ToolCallRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result alias used by chat model implementations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors surfaced by model providers and connectors.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Provider is misconfigured or missing credentials.
    #[error("model not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// No provider with the requested name is deployed.
    #[error("unknown model provider `{name}`")]
    UnknownProvider {
        /// The requested provider name.
        name: String,
    },

    /// The connector failed while talking to the backend.
    #[error("model transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The backend returned a malformed response.
    #[error("model response error: {reason}")]
    Response {
        /// Additional context about the response failure.
        reason: String,
    },
}

impl ModelError {
    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for malformed responses.
    #[must_use]
    pub fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }
}

/// Roles supported in chat-style prompts.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System messages steer the assistant behaviour.
    System,
    /// User-authored content.
    User,
    /// Assistant (model) responses.
    Assistant,
    /// Tool results fed back into the loop.
    Tool,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        })
    }
}

/// One message in a chat-style prompt.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    role: ChatRole,
    content: String,
}

impl ChatMessage {
    /// Creates a new chat message.
    #[must_use]
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Returns the message role.
    #[must_use]
    pub const fn role(&self) -> ChatRole {
        self.role
    }

    /// Returns the message content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Request submitted to a chat model.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(default)]
    json_response: bool,
}

impl ChatRequest {
    /// Creates a request with the supplied messages.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] if the message list is empty.
    pub fn new(messages: Vec<ChatMessage>) -> ModelResult<Self> {
        if messages.is_empty() {
            return Err(ModelError::configuration(
                "chat request requires at least one message",
            ));
        }

        Ok(Self {
            messages,
            tools: Vec::new(),
            json_response: false,
        })
    }

    /// Attaches tool descriptors the model may call.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    /// Requests a JSON-formatted answer from the model.
    #[must_use]
    pub fn expecting_json(mut self) -> Self {
        self.json_response = true;
        self
    }

    /// Returns the prompt messages.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns the attached tool descriptors.
    #[must_use]
    pub fn tools(&self) -> &[Value] {
        &self.tools
    }

    /// Returns whether a JSON answer was requested.
    #[must_use]
    pub const fn json_response(&self) -> bool {
        self.json_response
    }
}

/// Reply produced by a chat model.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ToolCallRequest>,
}

impl ChatReply {
    /// Creates a plain text reply.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Creates a reply requesting tool invocations.
    #[must_use]
    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            text: String::new(),
            tool_calls: calls,
        }
    }

    /// Returns the textual answer.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.text
    }

    /// Returns the requested tool invocations.
    #[must_use]
    pub fn requested_calls(&self) -> &[ToolCallRequest] {
        &self.tool_calls
    }

    /// Returns whether the model asked for tool execution.
    #[must_use]
    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Trait implemented by all chat model backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends the request and waits for the model's reply.
    async fn chat(&self, request: ChatRequest) -> ModelResult<ChatReply>;
}

impl fmt::Debug for dyn ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn ChatModel")
    }
}
