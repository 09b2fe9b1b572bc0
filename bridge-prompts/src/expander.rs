//! Placeholder substitution against a template context.

use serde_json::Value;
use tracing::debug;

use crate::context::TemplateContext;

/// Expands `{{name}}` placeholders in prompt and system-message strings.
///
/// Unresolvable placeholders stay in the text literally so a later
/// expansion stage can still pick them up. A blank expansion result is
/// reported as `None` rather than an error.
#[derive(Debug)]
pub struct MacroExpander<'c> {
    context: &'c TemplateContext,
}

impl<'c> MacroExpander<'c> {
    /// Creates an expander over the supplied context.
    #[must_use]
    pub fn new(context: &'c TemplateContext) -> Self {
        Self { context }
    }

    /// Expands all placeholders in the template. Placeholder names may
    /// carry padding inside the braces; `{{ user }}` and `{{user}}`
    /// resolve the same variable.
    ///
    /// Returns `None` when the expanded text is blank or a variable could
    /// not be serialized into the template.
    #[must_use]
    pub fn expand(&self, template: &str) -> Option<String> {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            let Some(end) = rest[start + 2..].find("}}") else {
                break;
            };
            result.push_str(&rest[..start]);

            // Substitution happens over the span as written, so padded
            // markers are replaced just like tight ones.
            let marker = &rest[start..start + end + 4];
            let name = rest[start + 2..start + 2 + end].trim();
            match self.context.get(name).filter(|_| !name.is_empty()) {
                Some(value) => result.push_str(&render(value)?),
                None => {
                    debug!(variable = name, "leaving unresolved placeholder in place");
                    result.push_str(marker);
                }
            }
            rest = &rest[start + end + 4..];
        }
        result.push_str(rest);

        Some(result).filter(|expanded| !expanded.trim().is_empty())
    }
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        other => serde_json::to_string(other).ok(),
    }
}
