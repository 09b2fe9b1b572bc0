//! Chat model abstraction and pluggable provider registry.
//!
//! Concrete network connectors live outside this workspace; they plug in
//! as [`ChatModelProvider`] implementations advertised through service
//! manifests and are selected by name or configuration.

#![warn(missing_docs, clippy::pedantic)]

mod chat;
mod provider;

/// Chat message shapes and the model trait.
pub use chat::{ChatMessage, ChatModel, ChatReply, ChatRequest, ChatRole, ModelError, ModelResult};
/// Provider SPI and the discovering factory.
pub use provider::{ChatModelFactory, ChatModelProvider, ModelOptions, PROVIDER_ABSTRACTION};
