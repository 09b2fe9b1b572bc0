//! Prompt template expansion for the flowbridge runtime.
//!
//! System messages and prompts carry `{{name}}` placeholders which are
//! substituted against a variable context before being handed to the
//! chat model. Context variables hold JSON values so catalog and decision
//! outputs can be inlined directly into prompt text.

#![warn(missing_docs, clippy::pedantic)]

mod context;
mod expander;

/// Variable context backing an expansion pass.
pub use context::TemplateContext;
/// Placeholder substitution engine.
pub use expander::MacroExpander;
