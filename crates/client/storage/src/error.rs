use cs_metadata::MetadataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Metadata unavailable: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Failed to derive storage address for {module}.{method}: {reason}")]
    AddressDerivation { module: String, method: String, reason: String },

    #[error("Unable to decode storage {module}.{method}: {source}")]
    Decode {
        module: String,
        method: String,
        #[source]
        source: codec::Error,
    },

    #[error("Invalid hex storage key: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
