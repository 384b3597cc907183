use crate::StorageError;
use cs_metadata::{StorageEntryMeta, StorageHasher};
use std::fmt;

/// Canonical binary key of one storage cell on one network.
///
/// Derived deterministically from (module, method, parameters) through the
/// layout the network's metadata declares: the two 128-bit module and method
/// prefixes followed by each key parameter run through its declared hasher.
/// Equality is byte-exact; the wire form is `0x`-prefixed hex.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StorageAddress(Vec<u8>);

impl StorageAddress {
    /// Derives the address for `parameters` against the declared entry layout.
    ///
    /// Fails when the parameter count does not match the entry's hasher list;
    /// the key material itself is opaque and never validated here.
    pub fn derive(
        entry: &StorageEntryMeta,
        module: &str,
        method: &str,
        parameters: &[Vec<u8>],
    ) -> Result<Self, StorageError> {
        if parameters.len() != entry.hashers.len() {
            return Err(StorageError::AddressDerivation {
                module: module.to_string(),
                method: method.to_string(),
                reason: format!(
                    "entry expects {} key parameter(s), got {}",
                    entry.hashers.len(),
                    parameters.len()
                ),
            });
        }

        let mut bytes = StorageHasher::Twox128.hash(module.as_bytes());
        bytes.extend(StorageHasher::Twox128.hash(method.as_bytes()));
        for (hasher, parameter) in entry.hashers.iter().zip(parameters) {
            bytes.extend(hasher.hash(parameter));
        }
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Parses the `0x`-prefixed (or bare) hex wire form.
    pub fn from_hex(hex_str: &str) -> Result<Self, StorageError> {
        let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        Ok(Self(hex::decode(stripped)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Display for StorageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for StorageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageAddress({})", self.to_hex())
    }
}
