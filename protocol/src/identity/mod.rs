// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Identity
//!
//! Account addresses: the checksummed base32 form every sender, receiver,
//! close-to and rekey-to field is entered and displayed in.

pub mod address;

pub use address::{Address, AddressError};
