//! Core shared types for the flowbridge runtime.

#![warn(missing_docs, clippy::pedantic)]

mod call;
mod error;
mod ids;
mod types;
mod variable;

/// Tool-call request and result messages.
pub use call::{ToolCallRequest, ToolCallResult};
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Unique identifier for tool-call requests.
pub use ids::RequestId;
/// Named composite types resolvable by qualified name.
pub use types::{DataClassDef, DataClassDefBuilder, FieldDef, TypeRepository};
/// Declared parameter and output descriptors.
pub use variable::{TypeRef, VariableDesc};
