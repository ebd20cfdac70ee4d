use schemabus_registry::RegistryError;
use schemabus_wire::WireError;

/// Why a request could not be served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The `action` field was missing, empty or not recognized.
    #[error("unrecognized action")]
    InvalidAction,

    /// The request frame exceeded the server's payload limit. The
    /// connection is closed after the reply.
    #[error("request of {size} bytes exceeds limit of {max}")]
    RequestTooLarge { size: usize, max: usize },

    /// The registry refused the operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ServiceError {
    /// Code carried in the `message` field of an error reply.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::InvalidAction => "invalid.action",
            ServiceError::RequestTooLarge { .. } => "request.too.large",
            ServiceError::Registry(err) => err.code(),
        }
    }

    pub fn cause(&self) -> Option<&str> {
        match self {
            ServiceError::InvalidAction | ServiceError::RequestTooLarge { .. } => None,
            ServiceError::Registry(err) => err.cause(),
        }
    }
}

/// Failures seen by a [`crate::SchemaClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("malformed reply: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered, but not with the shape the call expects.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),
}

impl ClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Wire(err) if err.is_timeout())
    }
}
