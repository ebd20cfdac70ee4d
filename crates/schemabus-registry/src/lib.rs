//! Keyed registry of JSON Schema validators.
//!
//! Schemas are registered under caller-chosen keys, compiled once, and
//! used to validate any JSON document on demand. Compilation and
//! evaluation go through the [`SchemaEngine`] trait; [`JsonSchemaEngine`]
//! backs it with the `jsonschema` crate.

pub mod config;
pub mod engine;
pub mod error;
mod loader;
pub mod registry;
pub mod report;

pub use config::RegistryConfig;
pub use engine::{EngineError, JsonSchemaEngine, SchemaEngine, KNOWN_META_SCHEMAS};
pub use error::{RegistryError, Result};
pub use registry::{prepare_schema, Conformance, PreparedSchema, SchemaRegistry};
pub use report::{ConformanceReport, Violation};
