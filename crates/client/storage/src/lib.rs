//! Storage address derivation and metadata-driven decoding.
//!
//! A [`StorageCodec`] is built per logical request from a network's
//! [`MetadataRegistry`] and a (module, method, parameters) triple. It derives
//! the canonical [`StorageAddress`] up front and keeps just enough of the
//! entry's declared layout to later decode the raw response bytes for that
//! address into a typed value.
//!
//! Metadata problems are deliberately non-fatal: a codec whose registry lookup
//! or address derivation failed still constructs, reports an absent address,
//! and short-circuits `decode` to an absent result. Only a genuine decode
//! failure on present bytes surfaces as an error, naming the module and
//! method it belongs to.

use codec::{Decode, DecodeAll};
use cs_metadata::{MetadataRegistry, StorageModifier};
use std::marker::PhantomData;

mod address;
mod error;

pub use address::StorageAddress;
pub use error::StorageError;

/// Value layout resolved once at construction, so `decode` never has to go
/// back to the registry.
#[derive(Debug, Clone)]
enum ValueShape {
    /// Absence on chain is a valid state.
    Optional,
    /// Absence on chain means this encoded fallback value.
    Default(Vec<u8>),
    /// Metadata lookup failed; treat the value as optional and decode input
    /// bytes leniently rather than refusing to work at all.
    RawFallback,
}

/// Per-request codec binding a (module, method, parameters) triple to its
/// derived storage address and declared value layout.
pub struct StorageCodec<T> {
    module: String,
    method: String,
    parameters: Vec<Vec<u8>>,
    address: Option<StorageAddress>,
    shape: ValueShape,
    tags: Option<serde_json::Value>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Decode> StorageCodec<T> {
    /// Looks up the entry's declared layout and derives the storage address,
    /// both immediately. Neither failure is fatal: the codec records an absent
    /// address, emits a diagnostic and stays usable.
    pub fn new(
        registry: &dyn MetadataRegistry,
        module: impl Into<String>,
        method: impl Into<String>,
        parameters: Vec<Vec<u8>>,
    ) -> Self {
        let module = module.into();
        let method = method.into();

        let (shape, address) = match registry.storage_entry(&module, &method) {
            Ok(entry) => {
                let shape = match entry.modifier {
                    StorageModifier::Optional => ValueShape::Optional,
                    StorageModifier::Default => ValueShape::Default(entry.fallback.clone()),
                };
                match StorageAddress::derive(&entry, &module, &method, &parameters) {
                    Ok(address) => (shape, Some(address)),
                    Err(err) => {
                        tracing::debug!(%module, %method, %err, "Failed to derive storage address");
                        (shape, None)
                    }
                }
            }
            Err(err) => {
                tracing::debug!(%module, %method, %err, "Storage metadata unavailable");
                (ValueShape::RawFallback, None)
            }
        };

        Self { module, method, parameters, address, shape, tags: None, _marker: PhantomData }
    }

    /// The derived binary address, absent when derivation failed.
    pub fn address(&self) -> Option<&StorageAddress> {
        self.address.as_ref()
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn parameters(&self) -> &[Vec<u8>] {
        &self.parameters
    }

    /// Attaches caller-supplied classification data. Pure data carrier: the
    /// codec never interprets it.
    pub fn tag(mut self, tags: serde_json::Value) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn tags(&self) -> Option<&serde_json::Value> {
        self.tags.as_ref()
    }

    /// Decodes a raw response for this codec's address.
    ///
    /// `None` input stands for "no value present on chain": valid for optional
    /// items, substituted by the declared fallback for default items. A codec
    /// without a derived address always yields `Ok(None)`.
    pub fn decode(&self, input: Option<&[u8]>) -> Result<Option<T>, StorageError> {
        if self.address.is_none() {
            return Ok(None);
        }

        match (&self.shape, input) {
            (ValueShape::Default(fallback), None) => self.decode_value(fallback, true).map(Some),
            (_, None) => Ok(None),
            (ValueShape::RawFallback, Some(bytes)) => self.decode_value(bytes, false).map(Some),
            (_, Some(bytes)) => self.decode_value(bytes, true).map(Some),
        }
    }

    /// Strict decoding requires the input to be fully consumed; the lenient
    /// path is only taken when metadata could not tell us the real layout.
    fn decode_value(&self, mut bytes: &[u8], strict: bool) -> Result<T, StorageError> {
        let decoded = if strict { T::decode_all(&mut bytes) } else { T::decode(&mut bytes) };
        decoded.map_err(|source| StorageError::Decode {
            module: self.module.clone(),
            method: self.method.clone(),
            source,
        })
    }
}
