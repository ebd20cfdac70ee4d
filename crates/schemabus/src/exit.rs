use std::fmt;
use std::io;

use schemabus_registry::RegistryError;
use schemabus_service::{ClientError, Reply};
use schemabus_wire::WireError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Exit status for a reply the service sent back.
///
/// A document that failed its schema is bad input, every other error
/// reply is a plain failure.
pub fn reply_code(reply: &Reply) -> i32 {
    if reply.is_ok() {
        SUCCESS
    } else if reply.is_non_conforming() {
        DATA_INVALID
    } else {
        FAILURE
    }
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn wire_error(context: &str, err: WireError) -> CliError {
    let code = match &err {
        WireError::EmptyAddress | WireError::PathTooLong { .. } => USAGE,
        WireError::Bind { source, .. } | WireError::Connect { source, .. }
            if source.kind() == io::ErrorKind::PermissionDenied =>
        {
            PERMISSION_DENIED
        }
        WireError::Bind { .. } | WireError::Connect { .. } | WireError::Accept(_) => {
            TRANSPORT_ERROR
        }
        WireError::PayloadTooLarge { .. } => DATA_INVALID,
        WireError::ConnectionClosed | WireError::InvalidMagic => FAILURE,
        _ if err.is_timeout() => TIMEOUT,
        WireError::Io(_) => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Wire(err) => wire_error(context, err),
        ClientError::Json(err) => CliError::new(INTERNAL, format!("{context}: {err}")),
        other @ ClientError::UnexpectedReply(_) => {
            CliError::new(FAILURE, format!("{context}: {other}"))
        }
    }
}

/// Preload wraps every per-file failure in `LoadFailed`; anything else is a bug.
pub fn registry_error(context: &str, err: RegistryError) -> CliError {
    let code = match err {
        RegistryError::LoadFailed(_) => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}
