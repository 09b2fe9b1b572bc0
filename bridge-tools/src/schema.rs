//! JSON schema synthesis for declared parameter types.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use bridge_primitives::{TypeRef, TypeRepository};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::debug;

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors produced while resolving declared types into schemas.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A declared type could not be resolved against the type repository.
    #[error("unknown type `{name}`")]
    UnknownType {
        /// Qualified name of the unresolvable type.
        name: String,
    },
}

#[derive(Clone, Debug)]
struct CachedSchema {
    schema: Value,
    recursive: bool,
    depends: HashSet<String>,
}

type CacheEntries = HashMap<String, CachedSchema>;

/// Process-lifetime cache of synthesized composite-type schemas.
///
/// Keyed by qualified type name. A synthesizer holds the cache lock for
/// its whole traversal, so one winning traversal populates every type it
/// touches consistently while concurrent traversals wait and then reuse
/// the finished entries. Entries are never invalidated: type definitions
/// are assumed static for a deployed module version. Redefining a type
/// across module versions without a restart is a known, unguarded
/// collision.
#[derive(Clone, Debug, Default)]
pub struct SchemaCache {
    inner: Arc<Mutex<CacheEntries>>,
}

impl SchemaCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn share(&self) -> Arc<Mutex<CacheEntries>> {
        Arc::clone(&self.inner)
    }

    /// Returns the number of cached type schemas.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("schema cache poisoned").len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Converts declared types into JSON Schema fragments.
///
/// One synthesizer builds the parameter schema of one tool descriptor;
/// composite-type results are shared across synthesizers through the
/// [`SchemaCache`]. Self- and mutually-referential types terminate by
/// emitting `$ref` pointers into the root schema's `$defs`.
#[derive(Debug)]
pub struct SchemaSynthesizer<'r> {
    repo: &'r TypeRepository,
    cache: SchemaCache,
    in_progress: Vec<String>,
    cycle_marks: HashSet<String>,
    needed: HashSet<String>,
}

impl<'r> SchemaSynthesizer<'r> {
    /// Creates a synthesizer resolving types against the supplied repository.
    #[must_use]
    pub fn new(repo: &'r TypeRepository, cache: SchemaCache) -> Self {
        Self {
            repo,
            cache,
            in_progress: Vec::new(),
            cycle_marks: HashSet::new(),
            needed: HashSet::new(),
        }
    }

    /// Synthesizes the schema for one declared type.
    ///
    /// Takes the cache lock for the duration of the traversal.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownType`] when a composite type cannot
    /// be resolved; the caller decides how to degrade.
    ///
    /// # Panics
    ///
    /// Panics if the cache lock is poisoned.
    pub fn schema_for(
        &mut self,
        type_ref: &TypeRef,
        description: Option<&str>,
    ) -> SchemaResult<Value> {
        let cache = self.cache.share();
        let mut entries = cache.lock().expect("schema cache poisoned");
        self.annotated(&mut entries, type_ref, description)
    }

    /// Returns the `$defs` entries required by all schemas synthesized so
    /// far. Call once after the last [`SchemaSynthesizer::schema_for`].
    ///
    /// # Panics
    ///
    /// Panics if the cache lock is poisoned.
    #[must_use]
    pub fn take_defs(&mut self) -> BTreeMap<String, Value> {
        let cache = self.cache.share();
        let entries = cache.lock().expect("schema cache poisoned");

        let mut defs = BTreeMap::new();
        for qualified in self.needed.drain() {
            if let Some(cached) = entries.get(&qualified) {
                defs.insert(qualified, cached.schema.clone());
            } else {
                debug!(name = qualified, "referenced type never completed; dropping $defs entry");
            }
        }
        defs
    }

    fn annotated(
        &mut self,
        entries: &mut CacheEntries,
        type_ref: &TypeRef,
        description: Option<&str>,
    ) -> SchemaResult<Value> {
        let mut schema = self.visit(entries, type_ref)?;
        if let Some(text) = description.filter(|text| !text.trim().is_empty())
            && let Value::Object(object) = &mut schema
        {
            object.insert("description".into(), Value::String(text.to_owned()));
        }
        Ok(schema)
    }

    fn visit(&mut self, entries: &mut CacheEntries, type_ref: &TypeRef) -> SchemaResult<Value> {
        match type_ref {
            TypeRef::String => Ok(json!({"type": "string"})),
            TypeRef::Integer => Ok(json!({"type": "integer"})),
            TypeRef::Number => Ok(json!({"type": "number"})),
            TypeRef::Boolean => Ok(json!({"type": "boolean"})),
            TypeRef::List(inner) => {
                Ok(json!({"type": "array", "items": self.visit(entries, inner)?}))
            }
            TypeRef::Object(name) => self.visit_object(entries, name),
        }
    }

    fn visit_object(&mut self, entries: &mut CacheEntries, qualified: &str) -> SchemaResult<Value> {
        // A type currently being built refers back to itself or to one of
        // its ancestors; break the cycle with a reference.
        if self.in_progress.iter().any(|name| name == qualified) {
            self.cycle_marks.insert(qualified.to_owned());
            self.needed.insert(qualified.to_owned());
            return Ok(reference(qualified));
        }

        if let Some(cached) = entries.get(qualified) {
            self.needed.extend(cached.depends.iter().cloned());
            if cached.recursive {
                self.needed.insert(qualified.to_owned());
                return Ok(reference(qualified));
            }
            return Ok(cached.schema.clone());
        }

        let def = self
            .repo
            .lookup(qualified)
            .ok_or_else(|| SchemaError::UnknownType {
                name: qualified.to_owned(),
            })?;

        let needed_before = self.needed.clone();
        self.in_progress.push(qualified.to_owned());

        let mut properties = Map::new();
        let mut failure = None;
        for field in def.fields() {
            match self.annotated(entries, field.type_ref(), field.description()) {
                Ok(schema) => {
                    properties.insert(field.name().to_owned(), schema);
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        self.in_progress.pop();
        if let Some(err) = failure {
            return Err(err);
        }

        let schema = json!({"type": "object", "properties": Value::Object(properties)});
        let recursive = self.cycle_marks.contains(qualified);
        let depends: HashSet<String> = self
            .needed
            .difference(&needed_before)
            .cloned()
            .collect();

        entries.insert(
            qualified.to_owned(),
            CachedSchema {
                schema: schema.clone(),
                recursive,
                depends,
            },
        );

        if recursive {
            self.needed.insert(qualified.to_owned());
            return Ok(reference(qualified));
        }
        Ok(schema)
    }
}

fn reference(qualified: &str) -> Value {
    json!({"$ref": format!("#/$defs/{qualified}")})
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_primitives::DataClassDef;
    use std::sync::Barrier;
    use std::thread;

    fn repo_with_person() -> TypeRepository {
        let mut repo = TypeRepository::new();
        repo.register(
            DataClassDef::builder("crm.Person")
                .field("name", "String")
                .unwrap()
                .field("age", "Integer")
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();
        repo
    }

    #[test]
    fn scalar_schemas() {
        let repo = TypeRepository::new();
        let mut synth = SchemaSynthesizer::new(&repo, SchemaCache::new());

        let schema = synth
            .schema_for(&TypeRef::String, Some("Search text"))
            .unwrap();
        assert_eq!(schema["type"], "string");
        assert_eq!(schema["description"], "Search text");

        let schema = synth.schema_for(&TypeRef::Boolean, None).unwrap();
        assert_eq!(schema, json!({"type": "boolean"}));
    }

    #[test]
    fn list_of_objects() {
        let repo = repo_with_person();
        let mut synth = SchemaSynthesizer::new(&repo, SchemaCache::new());

        let schema = synth
            .schema_for(&TypeRef::parse("List<crm.Person>"), None)
            .unwrap();
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["type"], "object");
        assert_eq!(schema["items"]["properties"]["age"]["type"], "integer");
    }

    #[test]
    fn unknown_type_errors() {
        let repo = TypeRepository::new();
        let mut synth = SchemaSynthesizer::new(&repo, SchemaCache::new());

        let err = synth
            .schema_for(&TypeRef::parse("crm.Ghost"), None)
            .expect_err("unresolvable type");
        assert!(matches!(err, SchemaError::UnknownType { name } if name == "crm.Ghost"));
    }

    #[test]
    fn self_referential_type_terminates() {
        let mut repo = TypeRepository::new();
        repo.register(
            DataClassDef::builder("org.Employee")
                .field("name", "String")
                .unwrap()
                .field("manager", "org.Employee")
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();

        let mut synth = SchemaSynthesizer::new(&repo, SchemaCache::new());
        let schema = synth
            .schema_for(&TypeRef::parse("org.Employee"), None)
            .unwrap();

        assert_eq!(schema["$ref"], "#/$defs/org.Employee");
        let defs = synth.take_defs();
        let definition = defs.get("org.Employee").expect("definition present");
        assert_eq!(
            definition["properties"]["manager"]["$ref"],
            "#/$defs/org.Employee"
        );
    }

    #[test]
    fn mutually_referential_types_terminate() {
        let mut repo = TypeRepository::new();
        repo.register(
            DataClassDef::builder("org.Department")
                .field("head", "org.Worker")
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();
        repo.register(
            DataClassDef::builder("org.Worker")
                .field("department", "org.Department")
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();

        let mut synth = SchemaSynthesizer::new(&repo, SchemaCache::new());
        let schema = synth
            .schema_for(&TypeRef::parse("org.Department"), None)
            .unwrap();
        let defs = synth.take_defs();

        assert_eq!(schema["$ref"], "#/$defs/org.Department");
        assert!(defs.contains_key("org.Department"));
    }

    #[test]
    fn cache_is_shared_across_synthesizers() {
        let repo = repo_with_person();
        let cache = SchemaCache::new();

        let mut first = SchemaSynthesizer::new(&repo, cache.clone());
        first.schema_for(&TypeRef::parse("crm.Person"), None).unwrap();
        assert_eq!(cache.len(), 1);

        let mut second = SchemaSynthesizer::new(&repo, cache.clone());
        let schema = second.schema_for(&TypeRef::parse("crm.Person"), None).unwrap();
        assert_eq!(schema["properties"]["name"]["type"], "string");
        assert_eq!(cache.len(), 1);
    }

    /// Collects every `$ref` target reachable from the value.
    fn ref_targets(value: &Value, targets: &mut HashSet<String>) {
        match value {
            Value::Object(object) => {
                if let Some(Value::String(target)) = object.get("$ref")
                    && let Some(name) = target.strip_prefix("#/$defs/")
                {
                    targets.insert(name.to_owned());
                }
                for nested in object.values() {
                    ref_targets(nested, targets);
                }
            }
            Value::Array(items) => {
                for item in items {
                    ref_targets(item, targets);
                }
            }
            _ => {}
        }
    }

    #[test]
    fn concurrent_traversals_from_opposite_roots_keep_defs_complete() {
        let mut repo = TypeRepository::new();
        repo.register(
            DataClassDef::builder("org.A")
                .field("partner", "org.B")
                .unwrap()
                .field("name", "String")
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();
        repo.register(
            DataClassDef::builder("org.B")
                .field("partner", "org.A")
                .unwrap()
                .build()
                .unwrap(),
        )
        .unwrap();

        for _ in 0..256 {
            let cache = SchemaCache::new();
            let barrier = Barrier::new(2);

            thread::scope(|scope| {
                let synthesize = |root: &'static str| {
                    let cache = cache.clone();
                    let barrier = &barrier;
                    let repo = &repo;
                    scope.spawn(move || {
                        let mut synth = SchemaSynthesizer::new(repo, cache);
                        barrier.wait();
                        let schema = synth.schema_for(&TypeRef::parse(root), None).unwrap();
                        (schema, synth.take_defs())
                    })
                };

                let handles = [synthesize("org.A"), synthesize("org.B")];
                for handle in handles {
                    let (schema, defs) = handle.join().expect("traversal panicked");

                    let mut targets = HashSet::new();
                    ref_targets(&schema, &mut targets);
                    for definition in defs.values() {
                        ref_targets(definition, &mut targets);
                    }
                    for target in &targets {
                        assert!(
                            defs.contains_key(target),
                            "$ref to `{target}` has no $defs entry"
                        );
                    }
                }
            });
        }
    }
}
