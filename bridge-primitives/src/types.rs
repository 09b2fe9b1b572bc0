//! Named composite types describing the hosting module's data classes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, TypeRef};

/// One field of a composite data class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    name: String,
    type_ref: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl FieldDef {
    /// Creates a field from a name and a declared type string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDescriptor`] when the field name is empty.
    pub fn new(name: impl Into<String>, declared_type: &str) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_descriptor("field name cannot be empty"));
        }

        Ok(Self {
            name,
            type_ref: TypeRef::parse(declared_type),
            description: None,
        })
    }

    /// Sets the human-authored field description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the field name.
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

/// A composite data class, resolvable by its qualified name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataClassDef {
    qualified_name: String,
    fields: Vec<FieldDef>,
}

impl DataClassDef {
    /// Starts building a data class definition.
    #[must_use]
    pub fn builder(qualified_name: impl Into<String>) -> DataClassDefBuilder {
        DataClassDefBuilder {
            qualified_name: qualified_name.into(),
            fields: Vec::new(),
        }
    }

    /// Returns the qualified class name, e.g. `crm.Person`.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Returns the simple (unqualified) class name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// Returns the declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }
}

/// Builder for [`DataClassDef`].
#[derive(Debug)]
pub struct DataClassDefBuilder {
    qualified_name: String,
    fields: Vec<FieldDef>,
}

impl DataClassDefBuilder {
    /// Adds a field with the supplied name and declared type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDescriptor`] when the field name is empty.
    pub fn field(mut self, name: impl Into<String>, declared_type: &str) -> Result<Self> {
        self.fields.push(FieldDef::new(name, declared_type)?);
        Ok(self)
    }

    /// Adds an already constructed field definition.
    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Consumes the builder and returns the definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDescriptor`] when the qualified name is empty.
    pub fn build(self) -> Result<DataClassDef> {
        if self.qualified_name.trim().is_empty() {
            return Err(Error::invalid_descriptor(
                "data class qualified name cannot be empty",
            ));
        }

        Ok(DataClassDef {
            qualified_name: self.qualified_name,
            fields: self.fields,
        })
    }
}

/// Repository of data classes declared by the hosting module.
///
/// Mirrors the module's script-class repository: composite types referenced
/// from process signatures are resolved here by qualified name.
#[derive(Debug, Default)]
pub struct TypeRepository {
    classes: HashMap<String, DataClassDef>,
}

impl TypeRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a data class definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateDataClass`] when the qualified name is
    /// already registered.
    pub fn register(&mut self, def: DataClassDef) -> Result<()> {
        let name = def.qualified_name().to_owned();
        if self.classes.contains_key(&name) {
            return Err(Error::DuplicateDataClass { name });
        }
        self.classes.insert(name, def);
        Ok(())
    }

    /// Resolves a data class by its qualified name.
    #[must_use]
    pub fn lookup(&self, qualified_name: &str) -> Option<&DataClassDef> {
        self.classes.get(qualified_name)
    }
}
