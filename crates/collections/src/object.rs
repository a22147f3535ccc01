//! RemoteObject: shared plumbing for remote collections
//!
//! Binds a collection instance to (store handle, key, codec). Every
//! collection facade is a thin wrapper over one of these; the object
//! owns no collection state. Two objects with the same key on the same
//! store observe the same remote structure.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use corral_core::{Codec, Result};

/// Identity and codec binding for one remote structure
///
/// Stateless: holds only the store handle, the key naming the remote
/// structure, and the codec. Cloning produces a peer handle over the
/// same remote state, never a copy of the data.
#[derive(Debug)]
pub struct RemoteObject<S, C> {
    store: Arc<S>,
    key: String,
    codec: C,
}

impl<S, C: Codec> RemoteObject<S, C> {
    /// Bind a new object to (store, key, codec)
    pub fn new(store: Arc<S>, key: impl Into<String>, codec: C) -> Self {
        Self {
            store,
            key: key.into(),
            codec,
        }
    }

    /// The key naming the remote structure
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying store handle
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Encode one element to its store payload
    pub(crate) fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        self.codec.encode(value)
    }

    /// Decode one element from its store payload
    pub(crate) fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        self.codec.decode(bytes)
    }
}

impl<S, C: Clone> Clone for RemoteObject<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            codec: self.codec.clone(),
        }
    }
}
