/// Limits applied by a [`crate::SchemaRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Maximum number of schema files accepted by a directory preload.
    pub max_schemas_from_directory: usize,
    /// Maximum bytes allowed per schema file during a directory preload.
    pub max_schema_file_size: usize,
    /// Cap on violations kept in a conformance report. `None` keeps all.
    pub max_reported_violations: Option<usize>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_schemas_from_directory: 256,
            max_schema_file_size: 256 * 1024,
            max_reported_violations: None,
        }
    }
}
