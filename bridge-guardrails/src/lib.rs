//! Guardrails screening messages before and after the model.
//!
//! Guardrails are deployed like any other service: modules advertise
//! implementations in their manifests and the pipeline discovers the ones
//! in scope, optionally narrowed to an explicit name list.

#![warn(missing_docs, clippy::pedantic)]

mod guard;
mod injection;
mod pipeline;

/// Guardrail trait, kinds, and verdicts.
pub use guard::{Guardrail, GuardrailKind, GuardrailVerdict};
/// Bundled prompt-injection input guardrail.
pub use injection::PromptInjectionGuardrail;
/// Discovery-backed guardrail selection and screening.
pub use pipeline::{GUARDRAIL_ABSTRACTION, GuardrailPipeline};
