//! Cross-network state query batching and dispatch.
//!
//! # Overview
//!
//! Calling code typically holds many independent "read this storage cell"
//! requests spread over several networks. Issuing them one by one would cost
//! one round trip each; this crate collapses them into exactly one remote
//! operation per network and routes the combined responses back out.
//!
//! The unit of work is a [`Query`]: a network identifier, the binary storage
//! address to read, and the decode function the raw response bytes for that
//! address are handed to. Queries are usually produced by binding a
//! `cs_storage::StorageCodec` through [`Query::from_codec`], but anything that
//! can name an address and decode its bytes qualifies.
//!
//! A [`QueryBatcher`] takes a flat query list and a [`Transport`]:
//!
//! - [`QueryBatcher::fetch`] groups the queries by network, issues one
//!   `state_queryStorageAt`-style call per network (all networks
//!   concurrently), and demultiplexes each response by exact address match.
//!   Within a network, results follow query order; a failure on any network
//!   fails the whole fetch.
//! - [`QueryBatcher::subscribe`] registers one storage-change subscription per
//!   network instead, delivering each network's notifications to a callback as
//!   they arrive, independently of the other networks. The returned
//!   [`SubscriptionHandle`] tears every per-network subscription down through
//!   a single cancellation point.
//!
//! Malformed response entries and entries nobody asked for are skipped with a
//! diagnostic rather than failing the batch; only a decode failure for a query
//! that *was* matched is treated as a real error.

mod batcher;
mod error;
mod query;
mod transport;

pub use batcher::{QueryBatcher, SubscriptionHandle};
pub use error::QueryError;
pub use query::{DecodeFn, Query};
pub use transport::{
    NetworkId, SubscriptionMethods, SubscriptionStream, Transport, TransportError, QUERY_STORAGE_AT,
};
