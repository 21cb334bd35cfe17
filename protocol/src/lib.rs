// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # AlgoWallet Protocol — Core Library
//!
//! The part of the wallet that has to be exactly right: turning what the
//! user asked for into bytes the Algorand network will accept, and signing
//! them. Everything else in the app is presentation.
//!
//! Ed25519 for signatures, SHA-512/256 for every digest the protocol
//! defines, canonical MessagePack for the wire, AES-256-GCM for secrets at
//! rest. Nothing exotic, nothing hand-rolled.
//!
//! ## Architecture
//!
//! - **crypto** — Hashing, keys, domain-separated signatures, AEAD.
//! - **identity** — Account addresses and their checksummed string form.
//! - **transaction** — Builders, canonical codec, atomic groups, signing.
//! - **config** — Protocol constants and builder policy.
//! - **logging** — `tracing` subscriber setup for host applications.
//!
//! ## Design Philosophy
//!
//! 1. Bytes are the source of truth. Ids and signatures are defined over the
//!    canonical encoding, so that is what flows between stages.
//! 2. Every failure is a typed error. Nothing panics on user input.
//! 3. Key material is wiped from memory when dropped.
//! 4. If it touches money, it has tests. Plural.
//!
//! ## Quick start
//!
//! ```
//! use algowallet_protocol::crypto::SecretKey;
//! use algowallet_protocol::transaction::builder::{PaymentIntent, TransactionBuilder};
//! use algowallet_protocol::transaction::{
//!     assign_group_id, find_and_verify_groups, sign_transaction, TransactionParams,
//! };
//!
//! let params = TransactionParams {
//!     fee: 0,
//!     min_fee: 1_000,
//!     last_round: 100,
//!     genesis_id: "testnet-v1.0".into(),
//!     genesis_hash: [1u8; 32],
//!     consensus_version: None,
//! };
//! let alice = SecretKey::generate();
//! let bob = SecretKey::generate().address().to_string();
//!
//! let builder = TransactionBuilder::new(&params);
//! let first = builder.payment(&PaymentIntent {
//!     from: alice.address().to_string(),
//!     to: bob.clone(),
//!     amount: 1_000_000,
//!     ..PaymentIntent::default()
//! })?;
//! let second = builder.payment(&PaymentIntent {
//!     from: alice.address().to_string(),
//!     to: bob,
//!     amount: 2_000_000,
//!     ..PaymentIntent::default()
//! })?;
//!
//! let group = assign_group_id(&[first, second])?;
//! assert_eq!(find_and_verify_groups(&group)?.len(), 1);
//!
//! for tx in &group {
//!     let signed = sign_transaction(tx, &alice)?;
//!     assert!(!signed.to_bytes()?.is_empty());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod crypto;
pub mod identity;
pub mod logging;
pub mod transaction;
