//! Typed conversation front-end over a chat model.

use std::marker::PhantomData;
use std::sync::Arc;

use bridge_models::{ChatMessage, ChatModel, ChatRequest};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::contract::{OutputContract, OutputResult, OutputSynthesizer};

const DEFAULT_INSTRUCTIONS: &str =
    "Answer with a single JSON object matching the requested structure. \
     Do not wrap the object in prose or markdown.";

/// Chat front-end whose replies decode into one fixed output type.
///
/// The agent binds a model to the contract for `T`; every call sends the
/// user message under a respond-as-JSON instruction and decodes the reply
/// through the contract. A reply that does not decode fails the call.
pub struct StructuredAgent<T> {
    model: Arc<dyn ChatModel>,
    contract: Arc<OutputContract>,
    instructions: Option<String>,
    _output: PhantomData<fn() -> T>,
}

impl<T> StructuredAgent<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Creates an agent for output type `T`, reusing the synthesizer's
    /// contract cache.
    #[must_use]
    pub fn new(model: Arc<dyn ChatModel>, synthesizer: &OutputSynthesizer) -> Self {
        Self {
            model,
            contract: synthesizer.contract::<T>(),
            instructions: None,
            _output: PhantomData,
        }
    }

    /// Replaces the default system instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Sends one user message and decodes the reply into `T`.
    ///
    /// # Errors
    ///
    /// Propagates model failures and returns [`crate::OutputError::Decode`]
    /// when the reply is not valid JSON for `T`.
    pub async fn chat(&self, message: impl Into<String>) -> OutputResult<T> {
        let system = self
            .instructions
            .as_deref()
            .unwrap_or(DEFAULT_INSTRUCTIONS);
        let request = ChatRequest::new(vec![
            ChatMessage::system(system),
            ChatMessage::user(message),
        ])?
        .expecting_json();

        let reply = self.model.chat(request).await?;
        debug!(
            type_name = self.contract.type_name(),
            "decoding structured reply"
        );
        self.contract.decode(reply.content())
    }
}

impl<T> std::fmt::Debug for StructuredAgent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuredAgent")
            .field("contract", &self.contract)
            .finish()
    }
}
