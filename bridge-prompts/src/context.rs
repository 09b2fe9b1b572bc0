//! Variable context resolved during template expansion.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

/// Named variables available to one expansion pass.
///
/// Values are JSON: plain strings inline as-is, anything else inlines its
/// JSON serialization at the placeholder position.
#[derive(Clone, Debug, Default)]
pub struct TemplateContext {
    variables: HashMap<String, Value>,
}

impl TemplateContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a plain text variable.
    pub fn set_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), Value::String(value.into()));
    }

    /// Sets a JSON value variable.
    pub fn set_value(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Serializes and sets a structured variable.
    ///
    /// Returns whether the value could be serialized; unserializable
    /// values leave the context untouched.
    pub fn set_serialized<T: Serialize>(&mut self, name: impl Into<String>, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(json) => {
                self.variables.insert(name.into(), json);
                true
            }
            Err(_) => false,
        }
    }

    /// Returns the value bound to a name, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Builder-style variant of [`TemplateContext::set_text`].
    #[must_use]
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_text(name, value);
        self
    }

    /// Builder-style variant of [`TemplateContext::set_value`].
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set_value(name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stores_text_and_values() {
        let context = TemplateContext::new()
            .with_text("user", "Ada")
            .with_value("profile", json!({"role": "admin"}));

        assert_eq!(context.get("user"), Some(&Value::String("Ada".into())));
        assert_eq!(context.get("profile"), Some(&json!({"role": "admin"})));
        assert!(context.get("missing").is_none());
    }
}
