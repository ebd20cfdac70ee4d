use std::io;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use schemabus_registry::{JsonSchemaEngine, SchemaEngine};
use schemabus_wire::{FrameConfig, FrameReader, FrameWriter, SocketListener, WireError};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::reply::Reply;
use crate::service::SchemaService;

/// Server tuning.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Applied to every accepted connection.
    pub frame: FrameConfig,
    /// How long the accept loop sleeps when no client is waiting.
    pub poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Accepts connections on a request channel and answers each request
/// frame with one reply frame carrying the same id.
pub struct SchemaServer<E: SchemaEngine = JsonSchemaEngine> {
    listener: SocketListener,
    service: Arc<SchemaService<E>>,
    config: ServerConfig,
    next_conn_id: AtomicU64,
}

impl<E: SchemaEngine + 'static> SchemaServer<E> {
    pub fn bind(path: impl AsRef<Path>, service: Arc<SchemaService<E>>) -> Result<Self, WireError> {
        Ok(Self {
            listener: SocketListener::bind(path)?,
            service,
            config: ServerConfig::default(),
            next_conn_id: AtomicU64::new(1),
        })
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn path(&self) -> &Path {
        self.listener.path()
    }

    pub fn service(&self) -> &Arc<SchemaService<E>> {
        &self.service
    }

    /// Accept and serve connections until `running` goes false.
    ///
    /// Each connection gets its own thread. Connections still open at
    /// shutdown are left to finish on their own.
    pub fn serve(&self, running: &AtomicBool) -> Result<(), WireError> {
        self.listener.set_nonblocking(true)?;
        info!(path = ?self.path(), "schema service ready");

        while running.load(Ordering::SeqCst) {
            let stream = match classify_accept(self.listener.try_accept()) {
                AcceptOutcome::Connection(stream) => stream,
                AcceptOutcome::Idle => {
                    std::thread::sleep(self.config.poll_interval);
                    continue;
                }
                AcceptOutcome::Retry(err) => {
                    warn!(error = %err, "accept failed; retrying");
                    std::thread::sleep(self.config.poll_interval);
                    continue;
                }
                AcceptOutcome::Fatal(err) => return Err(err),
            };

            let conn = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
            let service = Arc::clone(&self.service);
            let frame_config = self.config.frame.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("schemabus-conn-{conn}"))
                .spawn(move || {
                    debug!(conn, "connection opened");
                    match serve_connection(stream, &service, frame_config) {
                        Ok(()) => debug!(conn, "connection closed"),
                        Err(err) => warn!(conn, error = %err, "connection dropped"),
                    }
                });
            if let Err(err) = spawned {
                warn!(conn, error = %err, "failed to spawn connection handler");
            }
        }

        info!("schema service stopped");
        Ok(())
    }
}

enum AcceptOutcome {
    Connection(UnixStream),
    Idle,
    Retry(io::Error),
    Fatal(WireError),
}

/// Accept failures are per-connection (descriptor exhaustion, aborted
/// handshakes) except `EINVAL`, which means the listener itself is unusable.
fn classify_accept(result: Result<Option<UnixStream>, WireError>) -> AcceptOutcome {
    match result {
        Ok(Some(stream)) => AcceptOutcome::Connection(stream),
        Ok(None) => AcceptOutcome::Idle,
        Err(WireError::Accept(err)) if err.kind() != io::ErrorKind::InvalidInput => {
            AcceptOutcome::Retry(err)
        }
        Err(err) => AcceptOutcome::Fatal(err),
    }
}

fn serve_connection<E: SchemaEngine>(
    stream: UnixStream,
    service: &SchemaService<E>,
    config: FrameConfig,
) -> Result<(), WireError> {
    let mut reader = FrameReader::for_socket(stream.try_clone()?, config.clone())?;
    let mut writer = FrameWriter::for_socket(stream, config)?;

    loop {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(WireError::ConnectionClosed) if !reader.has_partial_frame() => return Ok(()),
            Err(WireError::PayloadTooLarge { id, size, max }) => {
                // The payload is left unread, so the stream cannot be resynced.
                let reply = Reply::from_error(&ServiceError::RequestTooLarge { size, max });
                send_reply(&mut writer, id, &reply)?;
                return Err(WireError::PayloadTooLarge { id, size, max });
            }
            Err(err) => return Err(err),
        };

        let reply = match serde_json::from_slice::<Value>(&frame.payload) {
            Ok(body) => service.handle_value(body),
            Err(err) => {
                debug!(id = frame.id, error = %err, "request body is not JSON");
                Reply::from_error(&ServiceError::InvalidAction)
            }
        };

        send_reply(&mut writer, frame.id, &reply)?;
    }
}

fn send_reply(writer: &mut FrameWriter<UnixStream>, id: u32, reply: &Reply) -> Result<(), WireError> {
    let payload = serde_json::to_vec(reply).map_err(io::Error::from)?;
    writer.send(id, &payload)
}
