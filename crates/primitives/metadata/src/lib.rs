//! Network storage metadata primitives.
//!
//! Every network describes its own storage layout through versioned metadata:
//! for each (module, method) pair, the hashers applied to its key parameters,
//! whether an absent value is valid, and the fallback value to use when it is
//! not. This crate provides the [`MetadataRegistry`] collaborator trait through
//! which that description is consumed, the storage hashers used to build
//! addresses from it, and [`StaticRegistry`], an in-memory implementation.
//!
//! A registry is immutable once loaded and may be shared across arbitrarily
//! many concurrent readers. Lookup failures (unknown entries, metadata versions
//! this crate does not understand) are always signaled through
//! [`MetadataError`], never a panic.

mod error;
mod hasher;
mod registry;

pub use error::MetadataError;
pub use hasher::StorageHasher;
pub use registry::{MetadataRegistry, StaticRegistry, StorageEntryMeta, StorageModifier};
