use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("Unsupported metadata version: {0}")]
    UnsupportedVersion(u32),

    #[error("No storage entry for {module}.{method}")]
    UnknownEntry { module: String, method: String },
}

impl MetadataError {
    pub fn unknown_entry(module: impl Into<String>, method: impl Into<String>) -> Self {
        Self::UnknownEntry { module: module.into(), method: method.into() }
    }
}
