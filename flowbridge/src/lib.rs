//! Tool-bridging and structured-output facade for workflow-hosted agents.
//!
//! Depend on this crate via `cargo add flowbridge`. It bundles the runtime
//! crates behind feature flags so hosting modules can enable only the
//! components their agents use.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use bridge_primitives as primitives;

/// Module-scoped service discovery (enabled by `discovery` feature).
#[cfg(feature = "discovery")]
pub use bridge_discovery as discovery;

/// Resolved configuration surface (enabled by `config` feature).
#[cfg(feature = "config")]
pub use bridge_config as config;

/// Chat models and provider selection (enabled by `models` feature).
#[cfg(feature = "models")]
pub use bridge_models as models;

/// Tool catalogs, schemas, and execution (enabled by `tools` feature).
#[cfg(feature = "tools")]
pub use bridge_tools as tools;

/// Message screening (enabled by `guardrails` feature).
#[cfg(feature = "guardrails")]
pub use bridge_guardrails as guardrails;

/// Structured output and decisions (enabled by `output` feature).
#[cfg(feature = "output")]
pub use bridge_output as output;

/// Prompt template expansion (enabled by `prompts` feature).
#[cfg(feature = "prompts")]
pub use bridge_prompts as prompts;
