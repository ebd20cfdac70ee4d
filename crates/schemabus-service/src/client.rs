use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use schemabus_wire::{
    connect, resolve_address, FrameConfig, FrameReader, FrameWriter, WireError,
    DEFAULT_MAX_PAYLOAD,
};
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;
use crate::reply::Reply;
use crate::request::Request;

/// Client tuning.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Read and write timeout per call. `None` blocks indefinitely.
    pub timeout: Option<Duration>,
    pub max_payload_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(5)),
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// Blocking client for a schemabus request channel.
pub struct SchemaClient {
    reader: FrameReader<UnixStream>,
    writer: FrameWriter<UnixStream>,
    next_id: u32,
}

impl SchemaClient {
    /// Connect to a channel address such as `json.schema.validator`.
    pub fn connect_address(address: &str, config: ClientConfig) -> Result<Self, ClientError> {
        let path = resolve_address(address)?;
        Self::connect_with_config(path, config)
    }

    pub fn connect(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        Self::connect_with_config(path, ClientConfig::default())
    }

    pub fn connect_with_config(
        path: impl AsRef<Path>,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let stream = connect(path)?;
        let frame_config = FrameConfig {
            max_payload_size: config.max_payload_size,
            read_timeout: config.timeout,
            write_timeout: config.timeout,
        };
        Ok(Self {
            reader: FrameReader::for_socket(
                stream.try_clone().map_err(WireError::from)?,
                frame_config.clone(),
            )?,
            writer: FrameWriter::for_socket(stream, frame_config)?,
            next_id: 1,
        })
    }

    /// Send a typed request and wait for its reply.
    pub fn call(&mut self, request: &Request) -> Result<Reply, ClientError> {
        let body = serde_json::to_vec(request)?;
        self.exchange(&body)
    }

    /// Send an arbitrary JSON body and wait for its reply.
    pub fn call_value(&mut self, body: &Value) -> Result<Reply, ClientError> {
        let body = serde_json::to_vec(body)?;
        self.exchange(&body)
    }

    pub fn add_schema(
        &mut self,
        key: &str,
        schema: Value,
        overwrite: bool,
    ) -> Result<Reply, ClientError> {
        self.call(&Request::add_schema(key, schema, overwrite))
    }

    pub fn validate(&mut self, key: &str, json: Value) -> Result<Reply, ClientError> {
        self.call(&Request::validate(key, json))
    }

    pub fn schema_keys(&mut self) -> Result<Vec<String>, ClientError> {
        let reply = self.call(&Request::GetSchemaKeys)?;
        if !reply.is_ok() {
            return Err(ClientError::UnexpectedReply(
                reply.message.unwrap_or_else(|| "error reply".to_string()),
            ));
        }
        reply
            .schemas
            .ok_or_else(|| ClientError::UnexpectedReply("reply has no schemas field".to_string()))
    }

    fn exchange(&mut self, body: &[u8]) -> Result<Reply, ClientError> {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        self.writer.send(id, body)?;
        loop {
            let frame = self.reader.read_frame()?;
            if frame.id == id {
                return Ok(serde_json::from_slice(&frame.payload)?);
            }
            // Leftover reply from a call that timed out earlier.
            debug!(expected = id, got = frame.id, "discarding stale reply");
        }
    }
}
