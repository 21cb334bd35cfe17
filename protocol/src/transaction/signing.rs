// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Transaction signing with Ed25519 keys.
//!
//! Signing is a separate step from building because the key may not be
//! available at construction time (Ledger device, remote signer, another
//! account after a rekey). The signed message is always
//! `"TX" || encoded_transaction`; the encoded bytes are embedded unchanged
//! in the resulting envelope, so the transaction id is the same before and
//! after signing.
//!
//! When the signing key is not the sender's own key (the sender was
//! rekeyed), the signer's address is recorded as `auth_address` so the
//! network knows which key to check.

use thiserror::Error;
use tracing::debug;

use super::codec::{decode, EncodingError};
use super::types::{EncodedTransaction, SignedTransaction};
use crate::config::TX_DOMAIN_PREFIX;
use crate::crypto::keys::{KeyError, SecretKey};
use crate::crypto::signatures::sign_with_prefix;

/// Errors raised while signing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("refusing to sign malformed transaction: {0}")]
    Encoding(#[from] EncodingError),
}

/// Sign an encoded transaction.
///
/// The bytes are decoded first, both to find the sender and to refuse
/// anything that is not a canonical transaction. Deterministic: the same
/// bytes and key always give the same signature.
///
/// # Example
///
/// ```
/// use algowallet_protocol::crypto::SecretKey;
/// use algowallet_protocol::transaction::builder::{build_payment, PaymentIntent};
/// use algowallet_protocol::transaction::{sign_transaction, verify_signed_transaction, TransactionParams};
///
/// let params = TransactionParams {
///     fee: 0,
///     min_fee: 1_000,
///     last_round: 100,
///     genesis_id: "testnet-v1.0".into(),
///     genesis_hash: [9u8; 32],
///     consensus_version: None,
/// };
/// let key = SecretKey::generate();
/// let unsigned = build_payment(
///     &PaymentIntent {
///         from: key.address().to_string(),
///         to: SecretKey::generate().address().to_string(),
///         amount: 1,
///         ..PaymentIntent::default()
///     },
///     &params,
/// )
/// .unwrap();
///
/// let signed = sign_transaction(&unsigned, &key).unwrap();
/// assert_eq!(signed.tx_id(), unsigned.tx_id());
/// assert!(signed.auth_address.is_none());
/// assert!(verify_signed_transaction(&signed).is_ok());
/// ```
pub fn sign_transaction(
    encoded: &EncodedTransaction,
    key: &SecretKey,
) -> Result<SignedTransaction, SigningError> {
    let tx = decode(encoded.as_bytes())?;
    let signer = key.address();
    let auth_address = (signer != tx.header.sender).then_some(signer);

    let signature = sign_with_prefix(key, TX_DOMAIN_PREFIX, encoded.as_bytes());

    debug!(
        tx_id = %encoded.tx_id(),
        kind = %tx.kind(),
        rekeyed = auth_address.is_some(),
        "signed transaction"
    );
    Ok(SignedTransaction {
        transaction: encoded.clone(),
        signature,
        auth_address,
    })
}

/// Sign with raw private key bytes: a 32-byte seed or Algorand's 64-byte
/// `seed || public_key`. The parsed key is wiped when this returns.
pub fn sign_transaction_with_key_bytes(
    encoded: &EncodedTransaction,
    secret_key: &[u8],
) -> Result<SignedTransaction, SigningError> {
    let key = SecretKey::from_bytes(secret_key)?;
    sign_transaction(encoded, &key)
}

/// Sign every transaction in a batch with one key, typically the members
/// of an atomic group that all belong to the same account.
pub fn sign_transactions(
    encoded: &[EncodedTransaction],
    key: &SecretKey,
) -> Result<Vec<SignedTransaction>, SigningError> {
    encoded.iter().map(|tx| sign_transaction(tx, key)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signatures::verify_with_prefix;
    use crate::identity::Address;
    use crate::transaction::codec::encode;
    use crate::transaction::types::{
        PaymentFields, TransactionBody, TransactionHeader, UnsignedTransaction,
    };

    fn payment_from(sender: Address) -> EncodedTransaction {
        encode(&UnsignedTransaction::new(
            TransactionHeader {
                sender,
                fee: 1_000,
                first_valid: 10,
                last_valid: 1_010,
                genesis_hash: Some([5u8; 32]),
                ..TransactionHeader::default()
            },
            TransactionBody::Payment(PaymentFields {
                receiver: Address::from_public_key([2u8; 32]),
                amount: 42,
                close_remainder_to: None,
            }),
        ))
        .unwrap()
    }

    #[test]
    fn signature_covers_tx_prefix() {
        let key = SecretKey::from_seed(&[7u8; 32]);
        let encoded = payment_from(key.address());
        let signed = sign_transaction(&encoded, &key).unwrap();

        assert!(verify_with_prefix(
            &key.public_key_bytes(),
            TX_DOMAIN_PREFIX,
            encoded.as_bytes(),
            &signed.signature
        )
        .is_ok());
        assert_eq!(signed.transaction, encoded);
        assert_eq!(signed.auth_address, None);
    }

    #[test]
    fn signing_is_deterministic() {
        let key = SecretKey::from_seed(&[7u8; 32]);
        let encoded = payment_from(key.address());
        let a = sign_transaction(&encoded, &key).unwrap();
        let b = sign_transaction(&encoded, &key).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }

    #[test]
    fn rekeyed_sender_gets_auth_address() {
        let sender = SecretKey::generate();
        let auth = SecretKey::generate();
        let encoded = payment_from(sender.address());
        let signed = sign_transaction(&encoded, &auth).unwrap();
        assert_eq!(signed.auth_address, Some(auth.address()));
    }

    #[test]
    fn raw_key_bytes() {
        let key = SecretKey::from_seed(&[8u8; 32]);
        let encoded = payment_from(key.address());
        let expected = sign_transaction(&encoded, &key).unwrap();

        let from_seed = sign_transaction_with_key_bytes(&encoded, &[8u8; 32]).unwrap();
        let from_expanded =
            sign_transaction_with_key_bytes(&encoded, &key.to_expanded_bytes()[..]).unwrap();
        assert_eq!(from_seed, expected);
        assert_eq!(from_expanded, expected);

        assert!(matches!(
            sign_transaction_with_key_bytes(&encoded, &[0u8; 31]),
            Err(SigningError::Key(KeyError::InvalidLength { got: 31 }))
        ));
    }

    #[test]
    fn malformed_bytes_not_signed() {
        let key = SecretKey::generate();
        let garbage = EncodedTransaction::from_bytes(vec![0x80]);
        assert!(matches!(
            sign_transaction(&garbage, &key),
            Err(SigningError::Encoding(_))
        ));
    }

    #[test]
    fn batch_signing() {
        let key = SecretKey::generate();
        let txs = [payment_from(key.address()), payment_from(key.address())];
        let signed = sign_transactions(&txs, &key).unwrap();
        assert_eq!(signed.len(), 2);
        assert!(signed.iter().all(|s| s.auth_address.is_none()));
    }
}
