/// Errors returned by registry operations.
///
/// Each variant maps to a stable wire code via [`RegistryError::code`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The key was absent or blank.
    #[error("schema key must not be empty")]
    InvalidKey,

    /// A schema is already registered under this key and overwrite was not requested.
    #[error("a schema is already registered under key {0:?}")]
    KeyAlreadyExists(String),

    /// The schema document was absent, not an object, or an empty object.
    #[error("schema document must be a non-empty JSON object")]
    InvalidSchema,

    /// The schema document does not conform to its meta-schema.
    #[error("schema document is not a valid JSON Schema: {0}")]
    InvalidSchemaSyntax(String),

    /// The engine failed while compiling an otherwise well-formed schema.
    #[error("failed to compile schema: {0}")]
    Schema(String),

    /// No schema is registered under this key.
    #[error("no schema registered under key {0:?}")]
    UnknownKey(String),

    /// The document to validate was absent or null.
    #[error("no JSON document supplied for validation")]
    MissingJson,

    /// The engine failed while evaluating a document.
    #[error("validation could not be performed: {0}")]
    Validation(String),

    /// A schema directory could not be preloaded.
    #[error("failed to load schemas: {0}")]
    LoadFailed(String),
}

impl RegistryError {
    /// Stable error code reported to remote callers.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::InvalidKey => "invalid.key",
            RegistryError::KeyAlreadyExists(_) => "key.already.exists",
            RegistryError::InvalidSchema => "invalid.schema",
            RegistryError::InvalidSchemaSyntax(_) => "invalid.schema.syntax",
            RegistryError::Schema(_) => "schema.error",
            RegistryError::UnknownKey(_) => "invalid.schema.key",
            RegistryError::MissingJson => "missing.json",
            RegistryError::Validation(_) => "validation.error",
            RegistryError::LoadFailed(_) => "schema.load.error",
        }
    }

    /// Underlying engine message, for the variants that wrap one.
    pub fn cause(&self) -> Option<&str> {
        match self {
            RegistryError::InvalidSchemaSyntax(cause)
            | RegistryError::Schema(cause)
            | RegistryError::Validation(cause)
            | RegistryError::LoadFailed(cause) => Some(cause.as_str()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
