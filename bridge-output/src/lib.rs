//! Structured output synthesis over plain chat models.
//!
//! A chat model only returns text; the synthesizer manufactures a decode
//! contract per output type so callers get typed values back, and the
//! decision maker builds on it to pick one option out of a fixed set.

#![warn(missing_docs, clippy::pedantic)]

mod agent;
mod contract;
mod decision;

/// Typed conversation front-end over a chat model.
pub use agent::StructuredAgent;
/// Per-type decode contracts and their process-lifetime cache.
pub use contract::{OutputContract, OutputError, OutputResult, OutputSynthesizer};
/// Option-set decisions driven by a structured call.
pub use decision::{DecisionMaker, DecisionMakerBuilder, DecisionOption};
