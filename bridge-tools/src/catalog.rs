//! Tool descriptor catalog handed to the chat model.

use bridge_primitives::TypeRepository;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::error;

use crate::process::ProcessRegistry;
use crate::schema::{SchemaCache, SchemaSynthesizer};

/// JSON-schema description of one tool, as handed to the model.
///
/// Names are unique within one catalog snapshot; descriptors are built
/// once per discovery pass and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    parameters: Value,
}

impl ToolDescriptor {
    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-authored description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the JSON Schema object describing the parameters.
    #[must_use]
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    /// Serializes the descriptor into the wire shape for the model.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Builds tool descriptors from the processes tagged as tools.
#[derive(Debug)]
pub struct ToolCatalogBuilder<'r> {
    registry: &'r ProcessRegistry,
    repo: &'r TypeRepository,
    cache: SchemaCache,
    filter: Option<Vec<String>>,
}

impl<'r> ToolCatalogBuilder<'r> {
    /// Creates a builder over the supplied process registry and type system.
    #[must_use]
    pub fn new(registry: &'r ProcessRegistry, repo: &'r TypeRepository, cache: SchemaCache) -> Self {
        Self {
            registry,
            repo,
            cache,
            filter: None,
        }
    }

    /// Restricts the catalog to the supplied tool names before it is
    /// handed to the agent. An empty allow-list keeps every tool.
    #[must_use]
    pub fn restrict<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        self.filter = (!names.is_empty()).then_some(names);
        self
    }

    /// Builds one descriptor per tool-tagged process.
    ///
    /// An unresolvable parameter type never aborts the catalog: the
    /// parameter schema degrades to accepting additional untyped
    /// properties and construction continues.
    #[must_use]
    pub fn find(&self) -> Vec<ToolDescriptor> {
        self.registry
            .tool_starts()
            .iter()
            .filter(|process| match &self.filter {
                Some(names) => names.iter().any(|name| name == process.name()),
                None => true,
            })
            .map(|process| {
                let mut synthesizer = SchemaSynthesizer::new(self.repo, self.cache.clone());
                let mut properties = Map::new();
                let mut open_schema = false;

                for input in process.inputs() {
                    match synthesizer.schema_for(input.type_ref(), input.description()) {
                        Ok(schema) => {
                            properties.insert(input.name().to_owned(), schema);
                        }
                        Err(err) => {
                            error!(
                                tool = process.name(),
                                parameter = input.name(),
                                %err,
                                "failed to define json schema for tool parameter"
                            );
                            // More parameters exist than we can describe.
                            open_schema = true;
                        }
                    }
                }

                let mut parameters = json!({
                    "type": "object",
                    "properties": Value::Object(properties),
                });
                if open_schema {
                    parameters["additionalProperties"] = Value::Bool(true);
                }
                let defs = synthesizer.take_defs();
                if !defs.is_empty() {
                    parameters["$defs"] = json!(defs);
                }

                ToolDescriptor {
                    name: process.name().to_owned(),
                    description: process
                        .description()
                        .filter(|text| !text.trim().is_empty())
                        .map(str::to_owned),
                    parameters,
                }
            })
            .collect()
    }
}
