use crate::{MetadataError, StorageHasher};
use std::collections::HashMap;

/// Self-describing metadata versions this crate knows how to interpret.
const SUPPORTED_VERSIONS: &[u32] = &[14, 15];

/// Layout descriptor for one storage item, as declared by network metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntryMeta {
    /// One hasher per key parameter. Empty for plain (non-map) values.
    pub hashers: Vec<StorageHasher>,
    /// Whether absence of a value on chain is valid or substituted.
    pub modifier: StorageModifier,
    /// Encoded value substituted when a [`StorageModifier::Default`] item is
    /// absent on chain. Unused for [`StorageModifier::Optional`] items.
    pub fallback: Vec<u8>,
}

impl StorageEntryMeta {
    /// A plain optional value with no key parameters.
    pub fn plain_optional() -> Self {
        Self { hashers: vec![], modifier: StorageModifier::Optional, fallback: vec![] }
    }

    /// A plain value substituted by `fallback` when absent.
    pub fn plain_default(fallback: Vec<u8>) -> Self {
        Self { hashers: vec![], modifier: StorageModifier::Default, fallback }
    }

    /// A map keyed by one hashed parameter per entry of `hashers`.
    pub fn map(hashers: Vec<StorageHasher>, modifier: StorageModifier, fallback: Vec<u8>) -> Self {
        Self { hashers, modifier, fallback }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageModifier {
    /// Absence of a value is a valid state.
    Optional,
    /// Absence of a value means the fallback value.
    Default,
}

/// Lookup from (module, method) to the layout descriptor of a storage item.
///
/// One registry describes one network at one metadata version. Registries are
/// read-only: they may be shared freely across concurrent readers and must
/// report entries they do not know through [`MetadataError`] rather than
/// panicking.
pub trait MetadataRegistry: Send + Sync {
    fn storage_entry(&self, module: &str, method: &str) -> Result<StorageEntryMeta, MetadataError>;
}

/// In-memory [`MetadataRegistry`] built from explicit entries.
#[derive(Debug, Clone)]
pub struct StaticRegistry {
    entries: HashMap<(String, String), StorageEntryMeta>,
}

impl StaticRegistry {
    /// Creates an empty registry for the given metadata version. Versions this
    /// crate cannot interpret are rejected up front so that callers degrade
    /// instead of deriving addresses from a layout they misread.
    pub fn new(version: u32) -> Result<Self, MetadataError> {
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(MetadataError::UnsupportedVersion(version));
        }
        Ok(Self { entries: HashMap::new() })
    }

    pub fn with_entry(
        mut self,
        module: impl Into<String>,
        method: impl Into<String>,
        meta: StorageEntryMeta,
    ) -> Self {
        self.entries.insert((module.into(), method.into()), meta);
        self
    }
}

impl MetadataRegistry for StaticRegistry {
    fn storage_entry(&self, module: &str, method: &str) -> Result<StorageEntryMeta, MetadataError> {
        self.entries
            .get(&(module.to_string(), method.to_string()))
            .cloned()
            .ok_or_else(|| MetadataError::unknown_entry(module, method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn rejects_unsupported_versions() {
        assert_matches!(StaticRegistry::new(12), Err(MetadataError::UnsupportedVersion(12)));
        assert_matches!(StaticRegistry::new(99), Err(MetadataError::UnsupportedVersion(99)));
        assert!(StaticRegistry::new(14).is_ok());
        assert!(StaticRegistry::new(15).is_ok());
    }

    #[test]
    fn looks_up_declared_entries() {
        let registry = StaticRegistry::new(14)
            .unwrap()
            .with_entry("Balances", "TotalIssuance", StorageEntryMeta::plain_default(vec![0u8; 16]));

        let entry = registry.storage_entry("Balances", "TotalIssuance").unwrap();
        assert_eq!(entry.modifier, StorageModifier::Default);
        assert_eq!(entry.fallback.len(), 16);

        assert_matches!(
            registry.storage_entry("Balances", "Nope"),
            Err(MetadataError::UnknownEntry { module, method }) if module == "Balances" && method == "Nope"
        );
    }
}
