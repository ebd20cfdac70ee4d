use std::path::PathBuf;

/// Errors raised while resolving, opening or framing a request channel.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The address was empty after trimming.
    #[error("channel address must not be empty")]
    EmptyAddress,

    /// Failed to bind the listening socket.
    #[error("failed to bind to {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to connect to a listening socket.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// The socket path does not fit in `sockaddr_un`.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// The frame header does not start with the expected magic.
    #[error("invalid frame magic (expected 0x5342 \"SB\")")]
    InvalidMagic,

    /// The payload of request `id` exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { id: u32, size: usize, max: usize },

    /// The peer closed the stream before a complete frame arrived.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// Any other I/O failure on the stream.
    #[error("wire I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WireError {
    /// True when the error came from a read or write timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            WireError::Io(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
                )
        )
    }
}

pub type Result<T> = std::result::Result<T, WireError>;
