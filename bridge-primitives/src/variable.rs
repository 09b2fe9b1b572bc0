//! Declared parameter and output descriptors for callable processes.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Reference to a declared type, as written in a process signature.
///
/// Parsing is total: anything that is not a known scalar or a `List<..>`
/// shape is treated as a qualified composite type name and resolved later
/// against the hosting module's [`crate::TypeRepository`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
    /// Text value.
    String,
    /// Whole number value.
    Integer,
    /// Floating point value.
    Number,
    /// True/false value.
    Boolean,
    /// Homogeneous list of the inner type.
    List(Box<TypeRef>),
    /// Composite type identified by its qualified name.
    Object(String),
}

impl TypeRef {
    /// Parses a declared type name such as `String` or `List<crm.Person>`.
    #[must_use]
    pub fn parse(declared: &str) -> Self {
        let declared = declared.trim();
        if let Some(inner) = declared
            .strip_prefix("List<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return Self::List(Box::new(Self::parse(inner)));
        }

        match declared {
            "String" => Self::String,
            "Integer" | "Long" => Self::Integer,
            "Number" | "Double" => Self::Number,
            "Boolean" => Self::Boolean,
            other => Self::Object(other.to_owned()),
        }
    }

    /// Returns the qualified name when this reference points at a composite type.
    #[must_use]
    pub fn qualified_name(&self) -> Option<&str> {
        match self {
            Self::Object(name) => Some(name),
            _ => None,
        }
    }
}

/// One declared input parameter or output of a callable process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDesc {
    name: String,
    type_ref: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl VariableDesc {
    /// Creates a descriptor from a name and a declared type string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDescriptor`] when the variable name is empty.
    pub fn new(name: impl Into<String>, declared_type: &str) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_descriptor("variable name cannot be empty"));
        }

        Ok(Self {
            name,
            type_ref: TypeRef::parse(declared_type),
            description: None,
        })
    }

    /// Sets the human-authored description used for schema generation.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parsed type reference.
    #[must_use]
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars() {
        assert_eq!(TypeRef::parse("String"), TypeRef::String);
        assert_eq!(TypeRef::parse("Number"), TypeRef::Number);
        assert_eq!(TypeRef::parse("Boolean"), TypeRef::Boolean);
        assert_eq!(TypeRef::parse("Long"), TypeRef::Integer);
    }

    #[test]
    fn parses_nested_lists() {
        let parsed = TypeRef::parse("List<List<String>>");
        assert_eq!(
            parsed,
            TypeRef::List(Box::new(TypeRef::List(Box::new(TypeRef::String))))
        );
    }

    #[test]
    fn unknown_names_become_objects() {
        let parsed = TypeRef::parse("crm.Person");
        assert_eq!(parsed.qualified_name(), Some("crm.Person"));
    }

    #[test]
    fn empty_variable_name_errors() {
        let err = VariableDesc::new(" ", "String").expect_err("empty name should error");
        assert!(matches!(err, Error::InvalidDescriptor { .. }));
    }

    #[test]
    fn carries_description() {
        let desc = VariableDesc::new("query", "String")
            .unwrap()
            .with_description("Search text");
        assert_eq!(desc.description(), Some("Search text"));
    }
}
