//! Discovery-backed guardrail selection and sequential screening.

use std::sync::Arc;

use bridge_discovery::{ServiceRegistry, SpiLoader};
use tracing::debug;

use crate::guard::{Guardrail, GuardrailKind, GuardrailVerdict};

/// Qualified abstraction name under which guardrails advertise themselves.
pub const GUARDRAIL_ABSTRACTION: &str = "flowbridge.guardrails.Guardrail";

/// Finds deployed guardrails and runs them over messages.
#[derive(Debug)]
pub struct GuardrailPipeline<'g> {
    loader: SpiLoader<'g>,
    registry: ServiceRegistry<dyn Guardrail>,
}

impl<'g> GuardrailPipeline<'g> {
    /// Creates a pipeline discovering guardrails through the supplied loader.
    #[must_use]
    pub fn new(loader: SpiLoader<'g>, registry: ServiceRegistry<dyn Guardrail>) -> Self {
        Self { loader, registry }
    }

    /// Returns the deployed input guardrails, optionally narrowed to the
    /// supplied display names. An empty name list keeps every guardrail.
    #[must_use]
    pub fn find_input_guardrails(&self, names: &[String]) -> Vec<Arc<dyn Guardrail>> {
        self.find(GuardrailKind::Input, names)
    }

    /// Returns the deployed output guardrails, optionally narrowed to the
    /// supplied display names. An empty name list keeps every guardrail.
    #[must_use]
    pub fn find_output_guardrails(&self, names: &[String]) -> Vec<Arc<dyn Guardrail>> {
        self.find(GuardrailKind::Output, names)
    }

    fn find(&self, kind: GuardrailKind, names: &[String]) -> Vec<Arc<dyn Guardrail>> {
        let selected: Vec<_> = self
            .loader
            .load(&self.registry)
            .into_iter()
            .filter(|guardrail| guardrail.kind() == kind)
            .filter(|guardrail| {
                names.is_empty() || names.iter().any(|name| name == guardrail.display_name())
            })
            .collect();
        debug!(?kind, count = selected.len(), "selected guardrails");
        selected
    }

    /// Runs the supplied guardrails over one message in sequence,
    /// short-circuiting on the first rejection.
    #[must_use]
    pub fn screen(message: &str, guardrails: &[Arc<dyn Guardrail>]) -> GuardrailVerdict {
        for guardrail in guardrails {
            let verdict = guardrail.evaluate(message);
            if !verdict.is_allowed() {
                debug!(
                    guardrail = guardrail.display_name(),
                    reason = verdict.reason(),
                    "guardrail rejected message"
                );
                return verdict;
            }
        }
        GuardrailVerdict::allowed()
    }
}
