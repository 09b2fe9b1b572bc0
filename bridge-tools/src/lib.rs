//! Tool bridging between callable processes and the chat model.
//!
//! Callable processes tagged as tools are turned into JSON-schema tool
//! descriptors for the model, and tool-call requests coming back from the
//! model are mapped back onto the typed process signatures.

#![warn(missing_docs, clippy::pedantic)]

mod catalog;
mod executor;
mod process;
mod schema;

/// Catalog construction with allow-list filtering.
pub use catalog::{ToolCatalogBuilder, ToolDescriptor};
/// Execution of model-issued tool calls.
pub use executor::ToolExecutor;
/// Callable process definitions and their registry.
pub use process::{
    CallArguments, CallableProcess, CallableProcessBuilder, ProcessError, ProcessHandler,
    ProcessOutputs, ProcessRegistry, ProcessResult, TOOL_TAG,
};
/// JSON schema synthesis with a cycle-safe type cache.
pub use schema::{SchemaCache, SchemaError, SchemaResult, SchemaSynthesizer};
