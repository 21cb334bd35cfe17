// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Signed transaction verification.
//!
//! The wallet verifies its own output before handing bytes to the network,
//! and verifies anything a dApp hands it pre-signed. Checks run cheapest
//! first: structure, then the signature.

use thiserror::Error;

use super::codec::{decode, decode_signed, EncodingError};
use super::types::SignedTransaction;
use crate::config::TX_DOMAIN_PREFIX;
use crate::crypto::signatures::{verify_with_prefix, SignatureError};
use crate::identity::Address;

/// Errors that can occur while verifying a signed transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("malformed transaction: {0}")]
    Encoding(#[from] EncodingError),

    #[error("signature does not verify against {signer}")]
    InvalidSignature { signer: Address },

    #[error("signer {signer} is not a valid public key")]
    InvalidSigner { signer: Address },
}

/// Verify a signed transaction.
///
/// 1. **Structure** — the inner bytes must decode as a canonical
///    transaction.
/// 2. **Signer** — `auth_address` when present, the sender otherwise.
/// 3. **Signature** — Ed25519 over `"TX" || bytes`, strict.
pub fn verify_signed_transaction(signed: &SignedTransaction) -> Result<(), VerificationError> {
    let tx = decode(signed.transaction.as_bytes())?;
    let signer = signed.auth_address.unwrap_or(tx.header.sender);

    verify_with_prefix(
        signer.as_bytes(),
        TX_DOMAIN_PREFIX,
        signed.transaction.as_bytes(),
        &signed.signature,
    )
    .map_err(|e| match e {
        SignatureError::InvalidPublicKey => VerificationError::InvalidSigner { signer },
        SignatureError::VerificationFailed => VerificationError::InvalidSignature { signer },
    })
}

/// Decode a signed envelope and verify it in one step.
pub fn verify_signed_bytes(bytes: &[u8]) -> Result<SignedTransaction, VerificationError> {
    let signed = decode_signed(bytes)?;
    verify_signed_transaction(&signed)?;
    Ok(signed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecretKey;
    use crate::transaction::codec::encode;
    use crate::transaction::signing::sign_transaction;
    use crate::transaction::types::{
        EncodedTransaction, PaymentFields, TransactionBody, TransactionHeader,
        UnsignedTransaction,
    };

    fn signed_payment(sender: &SecretKey, signer: &SecretKey) -> SignedTransaction {
        let encoded = encode(&UnsignedTransaction::new(
            TransactionHeader {
                sender: sender.address(),
                fee: 1_000,
                first_valid: 1,
                last_valid: 1_001,
                genesis_id: Some("testnet-v1.0".into()),
                genesis_hash: Some([6u8; 32]),
                note: b"rent".to_vec(),
                ..TransactionHeader::default()
            },
            TransactionBody::Payment(PaymentFields {
                receiver: Address::from_public_key([2u8; 32]),
                amount: 1_500_000,
                close_remainder_to: None,
            }),
        ))
        .unwrap();
        sign_transaction(&encoded, signer).unwrap()
    }

    #[test]
    fn valid_signature_passes() {
        let key = SecretKey::generate();
        assert!(verify_signed_transaction(&signed_payment(&key, &key)).is_ok());
    }

    #[test]
    fn rekeyed_signature_passes() {
        let sender = SecretKey::generate();
        let auth = SecretKey::generate();
        assert!(verify_signed_transaction(&signed_payment(&sender, &auth)).is_ok());
    }

    #[test]
    fn dropping_auth_address_fails() {
        let sender = SecretKey::generate();
        let auth = SecretKey::generate();
        let mut signed = signed_payment(&sender, &auth);
        signed.auth_address = None;
        assert_eq!(
            verify_signed_transaction(&signed),
            Err(VerificationError::InvalidSignature {
                signer: sender.address()
            })
        );
    }

    #[test]
    fn every_single_byte_mutation_is_detected() {
        let key = SecretKey::generate();
        let signed = signed_payment(&key, &key);
        let bytes = signed.transaction.as_bytes();

        for i in 0..bytes.len() {
            for flip in [0x01u8, 0x80] {
                let mut mutated = bytes.to_vec();
                mutated[i] ^= flip;
                let tampered = SignedTransaction {
                    transaction: EncodedTransaction::from_bytes(mutated),
                    ..signed.clone()
                };
                assert!(
                    verify_signed_transaction(&tampered).is_err(),
                    "mutation {:#04x} at byte {} went undetected",
                    flip,
                    i
                );
            }
        }
    }

    #[test]
    fn tampered_signature_fails() {
        let key = SecretKey::generate();
        let mut signed = signed_payment(&key, &key);
        let mut sig = *signed.signature.as_bytes();
        sig[10] ^= 0xFF;
        signed.signature = crate::crypto::Signature::from_bytes(sig);
        assert!(matches!(
            verify_signed_transaction(&signed),
            Err(VerificationError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn envelope_roundtrip_verifies() {
        let key = SecretKey::generate();
        let signed = signed_payment(&key, &key);
        let bytes = signed.to_bytes().unwrap();
        assert_eq!(verify_signed_bytes(&bytes).unwrap(), signed);

        let mut corrupted = bytes.clone();
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0x01;
        assert!(verify_signed_bytes(&corrupted).is_err());
    }
}
