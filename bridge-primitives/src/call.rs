//! Tool-call request and result messages exchanged with the model.

use serde::{Deserialize, Serialize};

use crate::RequestId;

/// A tool invocation requested by the chat model.
///
/// Produced by the model connector, consumed exactly once by the tool
/// executor. The `arguments_json` payload is the raw JSON object emitted
/// by the model and is only parsed at execution time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    id: String,
    name: String,
    arguments_json: String,
}

impl ToolCallRequest {
    /// Creates a request with a freshly generated identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments_json: impl Into<String>) -> Self {
        Self::with_id(RequestId::random().to_string(), name, arguments_json)
    }

    /// Creates a request carrying a provider-assigned identifier.
    #[must_use]
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments_json: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments_json: arguments_json.into(),
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the requested tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw JSON arguments payload.
    #[must_use]
    pub fn arguments_json(&self) -> &str {
        &self.arguments_json
    }
}

/// The answer a tool execution feeds back into the conversation.
///
/// Execution failures are carried in `text` like any other answer so the
/// model can reason about them instead of the loop crashing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallResult {
    request_id: String,
    text: String,
}

impl ToolCallResult {
    /// Creates a result answering the supplied request.
    #[must_use]
    pub fn new(request: &ToolCallRequest, text: impl Into<String>) -> Self {
        Self {
            request_id: request.id().to_owned(),
            text: text.into(),
        }
    }

    /// Returns the identifier of the answered request.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the textual answer, JSON for structured results.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_distinct_ids() {
        let a = ToolCallRequest::new("search", "{}");
        let b = ToolCallRequest::new("search", "{}");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn result_answers_request() {
        let request = ToolCallRequest::with_id("call_1", "search", r#"{"query":"x"}"#);
        let result = ToolCallResult::new(&request, "done");
        assert_eq!(result.request_id(), "call_1");
        assert_eq!(result.text(), "done");
    }
}
