//! Execution of model-issued tool calls against live processes.

use bridge_primitives::{DataClassDef, ToolCallRequest, ToolCallResult, TypeRef, TypeRepository};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::process::{CallArguments, ProcessRegistry};

/// Maps tool-call requests back onto typed process invocations.
///
/// Every failure mode is folded into a normal [`ToolCallResult`] whose
/// text explains the problem: the conversation loop feeds it back to the
/// model as the tool's answer instead of crashing the request.
#[derive(Debug)]
pub struct ToolExecutor<'r> {
    registry: &'r ProcessRegistry,
    repo: &'r TypeRepository,
}

impl<'r> ToolExecutor<'r> {
    /// Creates an executor resolving tools against the supplied registry.
    #[must_use]
    pub fn new(registry: &'r ProcessRegistry, repo: &'r TypeRepository) -> Self {
        Self { registry, repo }
    }

    /// Executes one tool-call request and returns the conversational answer.
    #[must_use]
    pub fn execute(&self, request: &ToolCallRequest) -> ToolCallResult {
        let Some(process) = self.registry.find(request.name()) else {
            return ToolCallResult::new(
                request,
                format!(
                    "failed to execute tool: unknown process function `{}`",
                    request.name()
                ),
            );
        };

        let raw_args: Value = match serde_json::from_str(request.arguments_json()) {
            Ok(value) => value,
            Err(err) => {
                return ToolCallResult::new(
                    request,
                    format!("failed to parse tool arguments: {err}"),
                );
            }
        };
        let Some(args_object) = raw_args.as_object() else {
            return ToolCallResult::new(request, "tool arguments must be a JSON object");
        };

        let mut args = CallArguments::new();
        for input in process.inputs() {
            let value = match args_object.get(input.name()) {
                Some(raw) => match self.coerce(input.type_ref(), raw) {
                    Ok(value) => value,
                    Err(reason) => {
                        warn!(
                            tool = request.name(),
                            parameter = input.name(),
                            reason,
                            "failed to load value of tool parameter"
                        );
                        Value::Null
                    }
                },
                None => Value::Null,
            };
            args.push(input.name(), value);
        }

        debug!(tool = request.name(), arguments = args.len(), "invoking tool process");
        match process.call(&args) {
            Ok(outputs) => {
                let text = serde_json::to_string(&Value::Object(outputs))
                    .unwrap_or_else(|err| format!("failed to serialize tool result: {err}"));
                ToolCallResult::new(request, text)
            }
            Err(err) => ToolCallResult::new(request, format!("tool execution failed: {err}")),
        }
    }

    /// Coerces one raw JSON value into the declared parameter type.
    fn coerce(&self, type_ref: &TypeRef, raw: &Value) -> Result<Value, String> {
        if raw.is_null() {
            return Ok(Value::Null);
        }

        match type_ref {
            TypeRef::String => match raw {
                Value::String(text) => Ok(Value::String(text.clone())),
                Value::Number(number) => Ok(Value::String(number.to_string())),
                Value::Bool(flag) => Ok(Value::String(flag.to_string())),
                other => Err(format!("cannot convert {other} to String")),
            },
            TypeRef::Integer => match raw {
                Value::Number(number) if number.is_i64() || number.is_u64() => Ok(raw.clone()),
                Value::String(text) => text
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|err| format!("cannot convert `{text}` to Integer: {err}")),
                other => Err(format!("cannot convert {other} to Integer")),
            },
            TypeRef::Number => match raw {
                Value::Number(_) => Ok(raw.clone()),
                Value::String(text) => text
                    .trim()
                    .parse::<f64>()
                    .map_err(|err| format!("cannot convert `{text}` to Number: {err}"))
                    .map(|parsed| {
                        serde_json::Number::from_f64(parsed)
                            .map(Value::Number)
                            .unwrap_or(Value::Null)
                    }),
                other => Err(format!("cannot convert {other} to Number")),
            },
            TypeRef::Boolean => match raw {
                Value::Bool(_) => Ok(raw.clone()),
                Value::String(text) => match text.trim() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    other => Err(format!("cannot convert `{other}` to Boolean")),
                },
                other => Err(format!("cannot convert {other} to Boolean")),
            },
            TypeRef::List(inner) => {
                let Value::Array(items) = raw else {
                    return Err(format!("cannot convert {raw} to List"));
                };
                let coerced: Result<Vec<Value>, String> =
                    items.iter().map(|item| self.coerce(inner, item)).collect();
                Ok(Value::Array(coerced?))
            }
            TypeRef::Object(qualified) => {
                let def = self
                    .repo
                    .lookup(qualified)
                    .ok_or_else(|| format!("unknown type `{qualified}`"))?;
                self.coerce_object(def, raw)
            }
        }
    }

    /// Structurally deserializes a JSON object against a data class:
    /// declared fields are coerced, undeclared fields are dropped.
    fn coerce_object(&self, def: &DataClassDef, raw: &Value) -> Result<Value, String> {
        let Value::Object(source) = raw else {
            return Err(format!(
                "cannot convert {raw} to `{}`",
                def.qualified_name()
            ));
        };

        let mut target = Map::new();
        for field in def.fields() {
            let value = match source.get(field.name()) {
                Some(raw_field) => self.coerce(field.type_ref(), raw_field)?,
                None => Value::Null,
            };
            target.insert(field.name().to_owned(), value);
        }
        Ok(Value::Object(target))
    }
}
