//! JSON Schema registry and validation service.
//!
//! Schemas are registered under string keys and JSON documents are
//! validated against them on request. The service answers three actions
//! (`addSchema`, `validate`, `getSchemaKeys`) over a local request channel.
//!
//! # Crate Structure
//!
//! - [`wire`]: channel addresses, socket listener, request/reply framing
//! - [`registry`]: keyed schema registry and the validation engine seam
//! - [`service`]: action protocol, dispatch, socket server and client

/// Re-export channel and framing types.
pub mod wire {
    pub use schemabus_wire::*;
}

/// Re-export registry types.
pub mod registry {
    pub use schemabus_registry::*;
}

/// Re-export service types.
pub mod service {
    pub use schemabus_service::*;
}
