//! Option-set decisions driven by a structured model call.

use std::sync::Arc;

use bridge_models::ChatModel;
use bridge_prompts::{MacroExpander, TemplateContext};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::StructuredAgent;
use crate::contract::{OutputError, OutputResult, OutputSynthesizer};

const DECISION_TEMPLATE: &str = "\
You route one incoming message to exactly one of the options below.\n\
Each option lists the condition under which it applies.\n\
Answer with the JSON object of the single best matching option, unchanged.\n\
Options:\n{{options}}\n{{instructions}}";

/// One selectable outcome and the condition under which it applies.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct DecisionOption {
    id: String,
    condition: String,
}

impl DecisionOption {
    /// Creates an option.
    #[must_use]
    pub fn new(id: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            condition: condition.into(),
        }
    }

    /// Returns the option id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the applicability condition.
    #[must_use]
    pub fn condition(&self) -> &str {
        &self.condition
    }
}

/// Picks exactly one option out of a fixed set for each message.
///
/// The answer is always one of the configured options; an id outside the
/// set is rejected even when the model invents a plausible one.
pub struct DecisionMaker {
    model: Arc<dyn ChatModel>,
    options: Vec<DecisionOption>,
    instructions: Option<String>,
    synthesizer: OutputSynthesizer,
}

impl DecisionMaker {
    /// Starts building a decision maker.
    #[must_use]
    pub fn builder() -> DecisionMakerBuilder {
        DecisionMakerBuilder {
            model: None,
            options: Vec::new(),
            instructions: None,
        }
    }

    /// Returns the configured options.
    #[must_use]
    pub fn options(&self) -> &[DecisionOption] {
        &self.options
    }

    /// Decides which option applies to the supplied message.
    ///
    /// # Errors
    ///
    /// Propagates model and decode failures, and returns
    /// [`OutputError::UnknownOption`] when the model answers with an id
    /// outside the configured set.
    pub async fn decide(&self, message: impl Into<String>) -> OutputResult<DecisionOption> {
        let options = serde_json::to_value(&self.options)
            .map_err(|err| OutputError::configuration(format!("unserializable options: {err}")))?;
        let context = TemplateContext::new()
            .with_value("options", options)
            .with_text(
                "instructions",
                self.instructions.clone().unwrap_or_default(),
            );
        let system = MacroExpander::new(&context)
            .expand(DECISION_TEMPLATE)
            .ok_or_else(|| OutputError::configuration("decision template expanded to nothing"))?;

        let agent = StructuredAgent::<DecisionOption>::new(
            Arc::clone(&self.model),
            &self.synthesizer,
        )
        .with_instructions(system);
        let answered = agent.chat(message).await?;

        debug!(id = answered.id(), "model picked decision option");
        self.options
            .iter()
            .find(|option| option.id() == answered.id())
            .cloned()
            .ok_or(OutputError::UnknownOption { id: answered.id })
    }
}

impl std::fmt::Debug for DecisionMaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionMaker")
            .field("options", &self.options)
            .finish()
    }
}

/// Builder for [`DecisionMaker`].
#[derive(Default)]
pub struct DecisionMakerBuilder {
    model: Option<Arc<dyn ChatModel>>,
    options: Vec<DecisionOption>,
    instructions: Option<String>,
}

impl DecisionMakerBuilder {
    /// Sets the chat model making the decision.
    #[must_use]
    pub fn model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Adds one selectable option.
    #[must_use]
    pub fn option(mut self, option: DecisionOption) -> Self {
        self.options.push(option);
        self
    }

    /// Adds extra instructions appended to the decision prompt.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Finishes the builder.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Configuration`] when no model is set or the
    /// option set is empty.
    pub fn build(self) -> OutputResult<DecisionMaker> {
        let model = self
            .model
            .ok_or_else(|| OutputError::configuration("decision maker requires a model"))?;
        if self.options.is_empty() {
            return Err(OutputError::configuration(
                "decision maker requires at least one option",
            ));
        }

        Ok(DecisionMaker {
            model,
            options: self.options,
            instructions: self.instructions,
            synthesizer: OutputSynthesizer::new(),
        })
    }
}

impl std::fmt::Debug for DecisionMakerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionMakerBuilder")
            .field("options", &self.options)
            .finish()
    }
}
