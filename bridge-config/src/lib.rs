//! Resolved configuration values consumed by the runtime.
//!
//! The runtime never parses configuration files itself; the hosting
//! application resolves named variables and hands them over through a
//! lookup. This crate only names the keys and exposes typed accessors.

#![warn(missing_docs, clippy::pedantic)]

use serde::{Deserialize, Serialize};

/// Well-known configuration variable keys.
pub mod keys {
    /// Name of the chat-model provider to use when none is given.
    pub const DEFAULT_PROVIDER: &str = "AI.DefaultProvider";
    /// Model name passed to the selected provider.
    pub const MODEL: &str = "AI.Model";
    /// Base URL of the provider endpoint.
    pub const BASE_URL: &str = "AI.BaseUrl";
    /// Credential passed to the provider.
    pub const API_KEY: &str = "AI.ApiKey";
    /// Whether guardrail screening is enabled.
    pub const USE_GUARDRAILS: &str = "AI.UseGuardrails";
    /// Comma-separated allow-list of tool names exposed to the agent.
    pub const TOOLS: &str = "AI.Tools";
}

/// Snapshot of the resolved AI configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(default)]
    use_guardrails: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_filter: Vec<String>,
}

impl AiSettings {
    /// Builds a snapshot by reading the well-known keys through the
    /// supplied variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            default_provider: non_blank(keys::DEFAULT_PROVIDER),
            model: non_blank(keys::MODEL),
            base_url: non_blank(keys::BASE_URL),
            api_key: non_blank(keys::API_KEY),
            use_guardrails: non_blank(keys::USE_GUARDRAILS)
                .is_some_and(|value| value.eq_ignore_ascii_case("true")),
            tool_filter: non_blank(keys::TOOLS)
                .map(|value| {
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Returns the configured default provider name, if any.
    #[must_use]
    pub fn default_provider(&self) -> Option<&str> {
        self.default_provider.as_deref()
    }

    /// Returns the configured model name, if any.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Returns the configured endpoint base URL, if any.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Returns the configured provider credential, if any.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns whether guardrail screening is enabled.
    #[must_use]
    pub const fn use_guardrails(&self) -> bool {
        self.use_guardrails
    }

    /// Returns the tool allow-list; empty means no restriction.
    #[must_use]
    pub fn tool_filter(&self) -> &[String] {
        &self.tool_filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reads_resolved_values() {
        let vars = HashMap::from([
            (keys::DEFAULT_PROVIDER, "OpenAI"),
            (keys::USE_GUARDRAILS, "TRUE"),
            (keys::TOOLS, "searchEmployee, createTicket,,"),
        ]);
        let settings = AiSettings::from_lookup(|key| vars.get(key).map(|v| (*v).to_owned()));

        assert_eq!(settings.default_provider(), Some("OpenAI"));
        assert!(settings.use_guardrails());
        assert_eq!(settings.tool_filter(), ["searchEmployee", "createTicket"]);
        assert_eq!(settings.model(), None);
    }

    #[test]
    fn blank_values_read_as_absent() {
        let settings = AiSettings::from_lookup(|_| Some("  ".to_owned()));
        assert_eq!(settings.default_provider(), None);
        assert!(!settings.use_guardrails());
        assert!(settings.tool_filter().is_empty());
    }
}
