//! Codec boundary between typed elements and store payloads
//!
//! The store compares serialized byte payloads for equality and
//! uniqueness, never the element type's own `Eq`. Set semantics
//! therefore require the codec to be deterministic: two logically-equal
//! elements MUST encode to identical bytes. The default `BincodeCodec`
//! satisfies this (bincode has a single canonical encoding per value).

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Stable, deterministic, type-aware round trip for element payloads
///
/// Contract: `decode(encode(x)) == x` for every supported `T`, and
/// `encode` is a pure function of the value.
pub trait Codec: Send + Sync {
    /// Serialize an element to an opaque byte payload
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if the value cannot be encoded.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    /// Deserialize an element from a payload produced by `encode`
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` on corrupt bytes or a type
    /// mismatch.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// Default codec backed by bincode
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(bincode::serialize(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(bincode::deserialize(bytes)?)
    }
}
