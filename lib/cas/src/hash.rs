//! A content hashing strategy which can determine if two files are identical
//! without comparing their bytes.
//!
//! # Implementation Notes
//!
//! The current implementation uses SHA-1 because that is what the hosting
//! provider's content store is addressed by; the wrapper type keeps the
//! algorithm opaque to the rest of the codebase.

use std::fmt;
use std::str::FromStr;

use serde::de::Visitor;
use serde::{de, Deserialize, Serialize};
use sha1::{Digest, Sha1};
use thiserror::Error;

pub struct Hasher(Sha1);

impl Hasher {
    pub fn new() -> Self {
        Self(Sha1::new())
    }

    pub fn update(&mut self, input: &[u8]) -> &mut Self {
        self.0.update(input);
        self
    }

    pub fn finalize(&mut self) -> Hash {
        Hash(self.0.finalize_reset().into())
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Hasher::new()
    }
}

/// A content hash value, computed over an input of bytes.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Hash([u8; 20]);

impl Hash {
    /// Creates and returns a new [Hash] value, computed from an input of bytes.
    #[must_use]
    pub fn new(input: &[u8]) -> Self {
        Self(Sha1::digest(input).into())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self)
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

struct HashVisitor;

impl<'de> Visitor<'de> for HashVisitor {
    type Value = Hash;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sha1 hash hex string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Hash::from_str(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(HashVisitor)
    }
}

/// An error when parsing a String representation of a [`Hash`].
#[remain::sorted]
#[derive(Debug, Error)]
pub enum HashParseError {
    #[error("failed to parse hash hex string")]
    Hex(#[from] hex::FromHexError),

    #[error("hash must be 20 bytes")]
    InvalidLength,
}

impl FromStr for Hash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| HashParseError::InvalidLength)?;
        Ok(Self(bytes))
    }
}
