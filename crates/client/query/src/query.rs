use crate::NetworkId;
use codec::Decode;
use cs_storage::{StorageAddress, StorageCodec, StorageError};
use std::fmt;
use std::sync::Arc;

/// Decode function bound to one query. Closes over whatever layout knowledge
/// it needs; `None` input stands for "no value present on chain".
pub type DecodeFn<T> = Arc<dyn Fn(Option<&[u8]>) -> Result<T, StorageError> + Send + Sync>;

/// One "read a piece of remote chain state" request: the network it targets,
/// the binary address identifying the cell, and the decode function the raw
/// response for that address is routed into. Immutable once constructed.
pub struct Query<T> {
    network: NetworkId,
    address: StorageAddress,
    decode: DecodeFn<T>,
}

impl<T> Query<T> {
    pub fn new(
        network: NetworkId,
        address: StorageAddress,
        decode: impl Fn(Option<&[u8]>) -> Result<T, StorageError> + Send + Sync + 'static,
    ) -> Self {
        Self { network, address, decode: Arc::new(decode) }
    }

    pub fn network(&self) -> &NetworkId {
        &self.network
    }

    pub fn address(&self) -> &StorageAddress {
        &self.address
    }

    pub fn decode(&self, input: Option<&[u8]>) -> Result<T, StorageError> {
        (self.decode)(input)
    }
}

impl<T: Decode + 'static> Query<Option<T>> {
    /// Binds a storage codec into a query against `network`, or `None` when
    /// the codec could not derive an address.
    pub fn from_codec(network: NetworkId, codec: StorageCodec<T>) -> Option<Self> {
        let address = codec.address()?.clone();
        Some(Self::new(network, address, move |input| codec.decode(input)))
    }
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self { network: self.network.clone(), address: self.address.clone(), decode: self.decode.clone() }
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").field("network", &self.network).field("address", &self.address).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::Encode;
    use cs_metadata::{StaticRegistry, StorageEntryMeta, StorageHasher, StorageModifier};

    #[test]
    fn from_codec_binds_address_and_decoder() {
        let registry = StaticRegistry::new(14).unwrap().with_entry(
            "System",
            "Account",
            StorageEntryMeta::map(vec![StorageHasher::Twox64Concat], StorageModifier::Optional, vec![]),
        );
        let codec = StorageCodec::<u32>::new(&registry, "System", "Account", vec![vec![1, 2, 3]]);
        let expected = codec.address().unwrap().clone();

        let query = Query::from_codec(NetworkId::from("polkadot"), codec).unwrap();
        assert_eq!(query.address(), &expected);
        assert_eq!(query.decode(Some(7u32.encode().as_slice())).unwrap(), Some(7));
        assert_eq!(query.decode(None).unwrap(), None);
    }

    #[test]
    fn from_codec_without_address_yields_none() {
        // Empty registry: the codec cannot derive an address.
        let registry = StaticRegistry::new(14).unwrap();
        let codec = StorageCodec::<u32>::new(&registry, "System", "Account", vec![]);
        assert!(Query::from_codec(NetworkId::from("polkadot"), codec).is_none());
    }
}
