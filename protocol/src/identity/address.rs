// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Account Addresses
//!
//! An Algorand address *is* an Ed25519 public key. Its human-facing form
//! appends a 4-byte checksum and base32-encodes the result:
//!
//! ```text
//! public_key (32 bytes)
//!     -> SHA-512/256(public_key)[28..32]         checksum (4 bytes)
//!     -> BASE32_NOPAD(public_key || checksum)    58 characters
//! ```
//!
//! The checksum catches typos when users paste addresses into a send form.
//! Parsing is strict: wrong length, lowercase or padded input, and bad
//! checksums are all rejected.

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{ADDRESS_CHECKSUM_LENGTH, ADDRESS_STRING_LENGTH, VERIFYING_KEY_LENGTH};
use crate::crypto::hash::sha512_256;

/// Errors raised while parsing an address string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid address length: expected {ADDRESS_STRING_LENGTH} characters, got {got}")]
    InvalidLength { got: usize },

    #[error("address is not valid base32: {0}")]
    InvalidEncoding(String),

    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

/// A 32-byte account address.
///
/// # Examples
///
/// ```
/// use algowallet_protocol::identity::Address;
///
/// let addr = Address::from_public_key([0u8; 32]);
/// assert_eq!(
///     addr.to_string(),
///     "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ"
/// );
/// assert_eq!(addr.to_string().parse::<Address>().unwrap(), addr);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; VERIFYING_KEY_LENGTH]);

impl Address {
    /// The all-zero address. Treated as "unset" by the canonical encoder.
    pub const ZERO: Address = Address([0u8; VERIFYING_KEY_LENGTH]);

    /// Wrap a raw public key.
    pub fn from_public_key(bytes: [u8; VERIFYING_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; VERIFYING_KEY_LENGTH] {
        &self.0
    }

    /// Returns `true` for the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; VERIFYING_KEY_LENGTH]
    }

    fn checksum(&self) -> [u8; ADDRESS_CHECKSUM_LENGTH] {
        let digest = sha512_256(&self.0);
        let mut checksum = [0u8; ADDRESS_CHECKSUM_LENGTH];
        checksum.copy_from_slice(&digest[digest.len() - ADDRESS_CHECKSUM_LENGTH..]);
        checksum
    }

    /// Encode as the canonical 58-character string.
    pub fn encode(&self) -> String {
        let mut raw = [0u8; VERIFYING_KEY_LENGTH + ADDRESS_CHECKSUM_LENGTH];
        raw[..VERIFYING_KEY_LENGTH].copy_from_slice(&self.0);
        raw[VERIFYING_KEY_LENGTH..].copy_from_slice(&self.checksum());
        BASE32_NOPAD.encode(&raw)
    }

    /// Parse and checksum-validate a 58-character address string.
    pub fn decode(s: &str) -> Result<Self, AddressError> {
        if s.len() != ADDRESS_STRING_LENGTH {
            return Err(AddressError::InvalidLength { got: s.len() });
        }

        let raw = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;
        if raw.len() != VERIFYING_KEY_LENGTH + ADDRESS_CHECKSUM_LENGTH {
            return Err(AddressError::InvalidEncoding(format!(
                "decoded to {} bytes",
                raw.len()
            )));
        }

        let mut key = [0u8; VERIFYING_KEY_LENGTH];
        key.copy_from_slice(&raw[..VERIFYING_KEY_LENGTH]);
        let address = Self(key);

        if address.checksum() != raw[VERIFYING_KEY_LENGTH..] {
            return Err(AddressError::ChecksumMismatch);
        }
        Ok(address)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}
