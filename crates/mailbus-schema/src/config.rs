/// Controls schema loading and validation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// When true, object schemas reject properties they do not declare.
    /// This is the closed-schema policy and is on by default.
    pub closed_schemas: bool,
    /// Maximum number of schemas loaded from a directory.
    pub max_schemas: usize,
    /// Maximum bytes allowed per schema file loaded from a directory.
    pub max_schema_file_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            closed_schemas: true,
            max_schemas: 256,
            max_schema_file_size: 256 * 1024,
        }
    }
}
