//! Request channel plumbing for schemabus.
//!
//! A channel is named by an *address*. The address resolves to a Unix
//! domain socket path, and every message on the socket is framed with:
//! - A 2-byte magic number ("SB") for stream synchronization
//! - A 4-byte little-endian payload length
//! - A 4-byte little-endian request id, echoed back on the reply
//!
//! Callers read and write whole frames; partial reads stay in here.

pub mod address;
pub mod codec;
pub mod error;
pub mod reader;
#[cfg(unix)]
pub mod socket;
pub mod writer;

pub use address::{resolve_address, resolve_address_in, runtime_dir, DEFAULT_ADDRESS};
pub use codec::{decode_frame, encode_frame, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE};
pub use error::{Result, WireError};
pub use reader::FrameReader;
#[cfg(unix)]
pub use socket::{connect, SocketListener};
pub use writer::FrameWriter;
