//! Guardrail contract and verdicts.

/// Conversation side a guardrail inspects.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GuardrailKind {
    /// Screens messages travelling towards the model.
    Input,
    /// Screens replies coming back from the model.
    Output,
}

/// Outcome of evaluating one guardrail against one message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GuardrailVerdict {
    allowed: bool,
    reason: Option<String>,
}

impl GuardrailVerdict {
    /// Verdict passing the message through unchanged.
    #[must_use]
    pub const fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// Verdict rejecting the message with a reason for the caller.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    /// Returns whether the message may continue.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Returns the rejection reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// A screening rule applied to conversation messages.
///
/// Evaluation must be side-effect-free: a guardrail observes the message
/// and renders a verdict, nothing else. Rejection is a normal negative
/// result, not an error.
pub trait Guardrail: Send + Sync {
    /// Returns the name used for selection and logging.
    fn display_name(&self) -> &str;

    /// Returns which conversation side this guardrail screens.
    fn kind(&self) -> GuardrailKind;

    /// Evaluates one message.
    fn evaluate(&self, message: &str) -> GuardrailVerdict;
}
