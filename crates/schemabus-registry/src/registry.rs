use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::engine::{EngineError, JsonSchemaEngine, SchemaEngine};
use crate::error::{RegistryError, Result};
use crate::report::ConformanceReport;

/// Outcome of validating a document that could be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conformance {
    Conforms,
    Violations(ConformanceReport),
}

impl Conformance {
    pub fn is_conforming(&self) -> bool {
        matches!(self, Conformance::Conforms)
    }
}

/// String-keyed registry of compiled schemas.
///
/// Every key present maps to a schema that passed the engine's syntax check
/// and compiled successfully. Entries are only ever replaced through an
/// explicit overwrite.
pub struct SchemaRegistry<E: SchemaEngine = JsonSchemaEngine> {
    engine: Arc<E>,
    entries: HashMap<String, E::Compiled>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry backed by `jsonschema`.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_engine(JsonSchemaEngine, config)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SchemaEngine> SchemaRegistry<E> {
    /// Create an empty registry backed by a custom engine.
    pub fn with_engine(engine: E, config: RegistryConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            entries: HashMap::new(),
            config,
        }
    }

    /// Compile `schema` and store it under `key`.
    ///
    /// Checks run in a fixed order and the first failure wins: blank key,
    /// existing key without `overwrite`, missing or empty schema object,
    /// meta-schema violation, compilation failure. Nothing is stored unless
    /// every check passes.
    pub fn add_schema(&mut self, key: &str, schema: Option<&Value>, overwrite: bool) -> Result<()> {
        self.check_admission(key, overwrite)?;
        let prepared = prepare_schema(self.engine.as_ref(), key, schema, overwrite)?;
        self.insert_prepared(prepared)
    }

    /// The key checks of [`SchemaRegistry::add_schema`]: blank key, then
    /// existing key without `overwrite`.
    pub fn check_admission(&self, key: &str, overwrite: bool) -> Result<()> {
        if is_blank(key) {
            return Err(RegistryError::InvalidKey);
        }
        if !overwrite && self.entries.contains_key(key) {
            return Err(RegistryError::KeyAlreadyExists(key.to_string()));
        }
        Ok(())
    }

    /// Store a schema compiled by [`prepare_schema`].
    ///
    /// The existing-key rule is checked again here, since the registry may
    /// have changed after [`SchemaRegistry::check_admission`] ran.
    pub fn insert_prepared(&mut self, prepared: PreparedSchema<E::Compiled>) -> Result<()> {
        let PreparedSchema {
            key,
            compiled,
            overwrite,
        } = prepared;

        let replacing = self.entries.contains_key(&key);
        if replacing && !overwrite {
            return Err(RegistryError::KeyAlreadyExists(key));
        }

        debug!(key = %key, replaced = replacing, "schema registered");
        self.entries.insert(key, compiled);
        Ok(())
    }

    /// Shared handle to the engine, usable without borrowing the registry.
    pub fn engine(&self) -> Arc<E> {
        Arc::clone(&self.engine)
    }

    /// Validate `document` against the schema stored under `key`.
    ///
    /// A document that fails the schema is a normal outcome and comes back as
    /// [`Conformance::Violations`]; `Err` is reserved for requests that
    /// could not be evaluated at all.
    pub fn validate(&self, key: &str, document: Option<&Value>) -> Result<Conformance> {
        if is_blank(key) {
            return Err(RegistryError::InvalidKey);
        }

        let compiled = self
            .entries
            .get(key)
            .ok_or_else(|| RegistryError::UnknownKey(key.to_string()))?;

        let document = match document {
            None | Some(Value::Null) => return Err(RegistryError::MissingJson),
            Some(document) => document,
        };

        let mut report = self
            .engine
            .validate(compiled, document)
            .map_err(|err| RegistryError::Validation(err.to_string()))?;

        if report.is_conforming() {
            return Ok(Conformance::Conforms);
        }

        debug!(key, violations = report.total(), "document rejected");
        if let Some(limit) = self.config.max_reported_violations {
            report.truncate(limit);
        }
        Ok(Conformance::Violations(report))
    }

    /// Registered keys in lexicographic order.
    pub fn schema_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

/// A schema that passed every content check and compiled, ready for
/// [`SchemaRegistry::insert_prepared`].
pub struct PreparedSchema<C> {
    key: String,
    compiled: C,
    overwrite: bool,
}

impl<C> PreparedSchema<C> {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// The content checks of [`SchemaRegistry::add_schema`]: missing or empty
/// schema object, meta-schema violation, compilation failure.
///
/// Touches only the engine, so callers sharing a registry behind a lock can
/// run it with the lock released.
pub fn prepare_schema<E: SchemaEngine>(
    engine: &E,
    key: &str,
    schema: Option<&Value>,
    overwrite: bool,
) -> Result<PreparedSchema<E::Compiled>> {
    if is_blank(key) {
        return Err(RegistryError::InvalidKey);
    }

    let schema = match schema {
        Some(schema) if schema.as_object().is_some_and(|fields| !fields.is_empty()) => schema,
        _ => return Err(RegistryError::InvalidSchema),
    };

    engine.check_syntax(schema).map_err(|err| match err {
        EngineError::Syntax(detail) => RegistryError::InvalidSchemaSyntax(detail),
        other => RegistryError::Schema(other.to_string()),
    })?;

    let compiled = engine
        .compile(schema)
        .map_err(|err| RegistryError::Schema(err.to_string()))?;

    Ok(PreparedSchema {
        key: key.to_string(),
        compiled,
        overwrite,
    })
}

fn is_blank(key: &str) -> bool {
    key.trim().is_empty()
}
