use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use schemabus_registry::{
    prepare_schema, Conformance, JsonSchemaEngine, SchemaEngine, SchemaRegistry,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ServiceError;
use crate::reply::Reply;
use crate::request::Request;

/// Serves registry requests from any number of threads.
///
/// `addSchema` compiles with no lock held and takes the write lock only to
/// insert, re-checking the existing-key rule there. `validate` and
/// `getSchemaKeys` share the read lock.
pub struct SchemaService<E: SchemaEngine = JsonSchemaEngine> {
    registry: RwLock<SchemaRegistry<E>>,
}

impl SchemaService {
    /// Service over an empty `jsonschema`-backed registry.
    pub fn new() -> Self {
        Self::with_registry(SchemaRegistry::new())
    }
}

impl Default for SchemaService {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SchemaEngine> SchemaService<E> {
    pub fn with_registry(registry: SchemaRegistry<E>) -> Self {
        Self {
            registry: RwLock::new(registry),
        }
    }

    /// Decode and serve one raw request body.
    pub fn handle_value(&self, body: Value) -> Reply {
        match Request::from_value(body) {
            Ok(request) => self.handle(request),
            Err(err) => {
                debug!(code = err.code(), "request rejected before dispatch");
                Reply::from_error(&err)
            }
        }
    }

    /// Serve one decoded request. Always produces exactly one reply.
    pub fn handle(&self, request: Request) -> Reply {
        let action = request.action();
        let result = match request {
            Request::AddSchema {
                key,
                json_schema,
                overwrite,
            } => self
                .add_schema(key.as_deref().unwrap_or_default(), json_schema.as_ref(), overwrite)
                .map(|()| Reply::ok()),
            Request::Validate { key, json } => self
                .validate(key.as_deref().unwrap_or_default(), json.as_ref())
                .map(|conformance| match conformance {
                    Conformance::Conforms => Reply::ok(),
                    Conformance::Violations(report) => Reply::non_conforming(&report),
                }),
            Request::GetSchemaKeys => Ok(Reply::schemas(self.schema_keys())),
        };

        match result {
            Ok(reply) => {
                debug!(action, ok = reply.is_ok(), "request served");
                reply
            }
            Err(err) => {
                match err.cause() {
                    Some(cause) if matches!(err.code(), "schema.error" | "validation.error") => {
                        warn!(action, code = err.code(), cause, "request failed in engine");
                    }
                    _ => debug!(action, code = err.code(), "request refused"),
                }
                Reply::from_error(&err)
            }
        }
    }

    pub fn add_schema(
        &self,
        key: &str,
        schema: Option<&Value>,
        overwrite: bool,
    ) -> Result<(), ServiceError> {
        let engine = {
            let registry = self.read();
            registry.check_admission(key, overwrite)?;
            registry.engine()
        };
        let prepared = prepare_schema(engine.as_ref(), key, schema, overwrite)?;
        self.write().insert_prepared(prepared)?;
        Ok(())
    }

    pub fn validate(&self, key: &str, document: Option<&Value>) -> Result<Conformance, ServiceError> {
        Ok(self.read().validate(key, document)?)
    }

    pub fn schema_keys(&self) -> Vec<String> {
        self.read().schema_keys()
    }

    // The registry only changes after a successful compile, so a panic on
    // another thread cannot leave it half-written.
    fn read(&self) -> RwLockReadGuard<'_, SchemaRegistry<E>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SchemaRegistry<E>> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}
