//! Callable process definitions and the per-module process registry.

use std::collections::HashMap;
use std::sync::Arc;

use bridge_primitives::VariableDesc;
use serde_json::{Map, Value};
use thiserror::Error;

/// Tag marking a callable process as exposed to the agent.
pub const TOOL_TAG: &str = "tool";

/// Result alias for process operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Named outputs produced by one process invocation.
pub type ProcessOutputs = Map<String, Value>;

/// Errors produced by process registration and invocation.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Process definition failed validation.
    #[error("invalid process definition: {reason}")]
    InvalidDefinition {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Process name collided with an existing registration.
    #[error("process `{name}` is already registered")]
    DuplicateProcess {
        /// Name of the offending process.
        name: String,
    },

    /// Process execution failed.
    #[error("process execution failed: {reason}")]
    Execution {
        /// Human-readable error reported by the implementation.
        reason: String,
    },
}

impl ProcessError {
    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }
}

/// Ordered, named arguments handed to a process invocation.
///
/// Order matches the declared input parameters of the signature.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallArguments {
    values: Vec<(String, Value)>,
}

impl CallArguments {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument, preserving order.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.values.push((name.into(), value));
    }

    /// Returns the argument bound to the supplied name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(arg, _)| arg == name)
            .map(|(_, value)| value)
    }

    /// Returns the arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the argument list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Trait implemented by process bodies.
pub trait ProcessHandler: Send + Sync {
    /// Invokes the process with the supplied arguments, returning its
    /// named outputs.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Execution`] when the process body fails.
    fn call(&self, args: &CallArguments) -> ProcessResult<ProcessOutputs>;
}

impl<F> ProcessHandler for F
where
    F: Send + Sync + Fn(&CallArguments) -> ProcessResult<ProcessOutputs>,
{
    fn call(&self, args: &CallArguments) -> ProcessResult<ProcessOutputs> {
        (self)(args)
    }
}

/// One externally defined callable process with a typed signature.
#[derive(Clone)]
pub struct CallableProcess {
    name: String,
    description: Option<String>,
    tags: Vec<String>,
    inputs: Vec<VariableDesc>,
    outputs: Vec<VariableDesc>,
    handler: Arc<dyn ProcessHandler>,
}

impl CallableProcess {
    /// Starts building a callable process.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> CallableProcessBuilder {
        CallableProcessBuilder {
            name: name.into(),
            description: None,
            tags: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Returns the signature name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-authored description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the process carries the supplied tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    /// Returns the declared input parameters in order.
    #[must_use]
    pub fn inputs(&self) -> &[VariableDesc] {
        &self.inputs
    }

    /// Returns the declared outputs in order.
    #[must_use]
    pub fn outputs(&self) -> &[VariableDesc] {
        &self.outputs
    }

    /// Invokes the process body.
    ///
    /// # Errors
    ///
    /// Propagates [`ProcessError::Execution`] from the handler.
    pub fn call(&self, args: &CallArguments) -> ProcessResult<ProcessOutputs> {
        self.handler.call(args)
    }
}

impl std::fmt::Debug for CallableProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallableProcess")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .finish()
    }
}

/// Builder for [`CallableProcess`].
#[derive(Debug)]
pub struct CallableProcessBuilder {
    name: String,
    description: Option<String>,
    tags: Vec<String>,
    inputs: Vec<VariableDesc>,
    outputs: Vec<VariableDesc>,
}

impl CallableProcessBuilder {
    /// Sets the human-authored description shown to the model.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a tag label.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Appends a declared input parameter.
    #[must_use]
    pub fn input(mut self, input: VariableDesc) -> Self {
        self.inputs.push(input);
        self
    }

    /// Appends a declared output.
    #[must_use]
    pub fn output(mut self, output: VariableDesc) -> Self {
        self.outputs.push(output);
        self
    }

    /// Attaches the process body and finishes the definition.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::InvalidDefinition`] when the name is empty.
    pub fn handler<H>(self, handler: H) -> ProcessResult<CallableProcess>
    where
        H: ProcessHandler + 'static,
    {
        if self.name.trim().is_empty() {
            return Err(ProcessError::InvalidDefinition {
                reason: "process name cannot be empty".into(),
            });
        }

        Ok(CallableProcess {
            name: self.name,
            description: self.description,
            tags: self.tags,
            inputs: self.inputs,
            outputs: self.outputs,
            handler: Arc::new(handler),
        })
    }
}

/// Registry of the callable processes deployed with one module.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    processes: HashMap<String, Arc<CallableProcess>>,
}

impl ProcessRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a process definition.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::DuplicateProcess`] when the name is already
    /// present.
    pub fn register(&mut self, process: CallableProcess) -> ProcessResult<()> {
        let name = process.name().to_owned();
        if self.processes.contains_key(&name) {
            return Err(ProcessError::DuplicateProcess { name });
        }
        self.processes.insert(name, Arc::new(process));
        Ok(())
    }

    /// Returns the process with the supplied signature name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Arc<CallableProcess>> {
        self.processes.get(name).cloned()
    }

    /// Returns all processes tagged as tools.
    #[must_use]
    pub fn tool_starts(&self) -> Vec<Arc<CallableProcess>> {
        let mut tools: Vec<_> = self
            .processes
            .values()
            .filter(|process| process.has_tag(TOOL_TAG))
            .cloned()
            .collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_process(name: &str) -> CallableProcess {
        CallableProcess::builder(name)
            .tag(TOOL_TAG)
            .input(VariableDesc::new("message", "String").unwrap())
            .output(VariableDesc::new("echo", "String").unwrap())
            .handler(|args: &CallArguments| {
                let mut outputs = ProcessOutputs::new();
                outputs.insert(
                    "echo".into(),
                    args.get("message").cloned().unwrap_or(Value::Null),
                );
                Ok(outputs)
            })
            .unwrap()
    }

    #[test]
    fn registers_and_invokes() {
        let mut registry = ProcessRegistry::new();
        registry.register(echo_process("echo")).unwrap();

        let process = registry.find("echo").expect("registered");
        let mut args = CallArguments::new();
        args.push("message", json!("hello"));

        let outputs = process.call(&args).unwrap();
        assert_eq!(outputs.get("echo"), Some(&json!("hello")));
    }

    #[test]
    fn duplicate_name_errors() {
        let mut registry = ProcessRegistry::new();
        registry.register(echo_process("echo")).unwrap();

        let err = registry
            .register(echo_process("echo"))
            .expect_err("duplicate should fail");
        assert!(matches!(err, ProcessError::DuplicateProcess { name } if name == "echo"));
    }

    #[test]
    fn tool_starts_filters_by_tag() {
        let mut registry = ProcessRegistry::new();
        registry.register(echo_process("echo")).unwrap();
        registry
            .register(
                CallableProcess::builder("internal")
                    .handler(|_: &CallArguments| Ok(ProcessOutputs::new()))
                    .unwrap(),
            )
            .unwrap();

        let tools = registry.tool_starts();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name(), "echo");
    }

    #[test]
    fn empty_name_errors() {
        let err = CallableProcess::builder(" ")
            .handler(|_: &CallArguments| Ok(ProcessOutputs::new()))
            .expect_err("empty name should error");
        assert!(matches!(err, ProcessError::InvalidDefinition { .. }));
    }
}
