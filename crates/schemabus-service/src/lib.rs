//! Action protocol for the schemabus schema registry.
//!
//! Each request is a JSON object with an `action` discriminator and gets
//! exactly one JSON reply. [`SchemaService`] dispatches requests against a
//! shared registry; [`SchemaServer`] and [`SchemaClient`] carry them over a
//! Unix domain socket.

#[cfg(unix)]
pub mod client;
pub mod error;
pub mod reply;
pub mod request;
#[cfg(unix)]
pub mod server;
pub mod service;

#[cfg(unix)]
pub use client::{ClientConfig, SchemaClient};
pub use error::{ClientError, ServiceError};
pub use reply::{Reply, Status};
pub use request::{Request, ACTION_ADD_SCHEMA, ACTION_GET_SCHEMA_KEYS, ACTION_VALIDATE};
#[cfg(unix)]
pub use server::{SchemaServer, ServerConfig};
pub use service::SchemaService;
