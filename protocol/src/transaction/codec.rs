// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Canonical Transaction Encoding
//!
//! Transaction ids, group ids and signatures are all computed over bytes, so
//! "the same transaction" must always produce exactly the same bytes. The
//! protocol pins this down as *canonical MessagePack*:
//!
//! 1. Every struct is a map whose keys are sorted bytewise.
//! 2. Integers use the smallest representation that fits.
//! 3. Byte fields are `bin`, text fields are `str`.
//! 4. Zero values, empty byte strings, `false`, and empty nested maps are
//!    omitted entirely.
//!
//! Encoding goes through a `BTreeMap<&'static str, rmpv::Value>` so rule 1 is
//! structural, and `rmpv`'s writer already picks the minimal integer width.
//!
//! Decoding is strict. Beyond type and length checks, the decoded value is
//! re-encoded and compared byte-for-byte with the input, so explicitly
//! written zero fields, unsorted keys and over-wide integers are all
//! rejected as [`EncodingError::NonCanonical`].
//!
//! ## Signed envelope
//!
//! ```text
//! { "sgnr"?: bin(32), "sig": bin(64), "txn": <encoded transaction> }
//! ```
//!
//! The `txn` value is spliced in verbatim rather than re-encoded, so the
//! envelope always carries exactly the bytes that were signed.

use rmpv::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::trace;

use super::types::{
    AssetConfigFields, AssetParams, AssetTransferFields, Digest, EncodedTransaction,
    KeyRegistrationFields, PaymentFields, SignedTransaction, TransactionBody, TransactionHeader,
    UnsignedTransaction,
};
use crate::config::{HASH_OUTPUT_LENGTH, SIGNATURE_LENGTH, VERIFYING_KEY_LENGTH};
use crate::crypto::keys::Signature;
use crate::identity::Address;

/// Errors from encoding or decoding transactions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid validity window: first valid {first_valid} > last valid {last_valid}")]
    InvalidValidityWindow { first_valid: u64, last_valid: u64 },

    #[error("invalid participation window: vote first {vote_first} > vote last {vote_last}")]
    InvalidVoteWindow { vote_first: u64, vote_last: u64 },

    #[error("field `{0}` conflicts with the rest of the transaction")]
    ConflictingField(&'static str),

    #[error("numeric field `{0}` overflows its width")]
    NumericOverflow(&'static str),

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("duplicate field `{0}`")]
    DuplicateField(String),

    #[error("unknown transaction type `{0}`")]
    UnknownType(String),

    #[error("field `{field}` has the wrong type: expected {expected}")]
    InvalidFieldType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `{field}` has the wrong length: expected {expected} bytes, got {got}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("expected a msgpack map with string keys")]
    NotAMap,

    #[error("{0} trailing bytes after the encoded value")]
    TrailingBytes(usize),

    #[error("encoding is not canonical")]
    NonCanonical,

    #[error("msgpack error: {0}")]
    Msgpack(String),
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Sparse, sorted field map. Every setter drops the field when the value is
/// the zero value for its type.
#[derive(Default)]
struct FieldMap(BTreeMap<&'static str, Value>);

impl FieldMap {
    fn uint(&mut self, key: &'static str, value: u64) {
        if value != 0 {
            self.0.insert(key, Value::from(value));
        }
    }

    fn bytes(&mut self, key: &'static str, value: &[u8]) {
        if !value.is_empty() {
            self.0.insert(key, Value::Binary(value.to_vec()));
        }
    }

    fn fixed(&mut self, key: &'static str, value: Option<&[u8]>) {
        if let Some(bytes) = value {
            if bytes.iter().any(|b| *b != 0) {
                self.0.insert(key, Value::Binary(bytes.to_vec()));
            }
        }
    }

    fn address(&mut self, key: &'static str, value: Option<&Address>) {
        self.fixed(key, value.map(|a| &a.as_bytes()[..]));
    }

    fn string(&mut self, key: &'static str, value: Option<&str>) {
        if let Some(s) = value.filter(|s| !s.is_empty()) {
            self.0.insert(key, Value::from(s));
        }
    }

    fn flag(&mut self, key: &'static str, value: bool) {
        if value {
            self.0.insert(key, Value::Boolean(true));
        }
    }

    fn nested(&mut self, key: &'static str, inner: FieldMap) {
        if !inner.0.is_empty() {
            self.0.insert(key, inner.into_value());
        }
    }

    fn into_value(self) -> Value {
        Value::Map(
            self.0
                .into_iter()
                .map(|(k, v)| (Value::from(k), v))
                .collect(),
        )
    }
}

fn write(value: &Value) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::new();
    rmpv::encode::write_value(&mut out, value).map_err(|e| EncodingError::Msgpack(e.to_string()))?;
    Ok(out)
}

fn validate(tx: &UnsignedTransaction) -> Result<(), EncodingError> {
    let header = &tx.header;
    if header.sender.is_zero() {
        return Err(EncodingError::MissingField("snd"));
    }
    if header.genesis_hash.map_or(true, |gh| gh == [0u8; HASH_OUTPUT_LENGTH]) {
        return Err(EncodingError::MissingField("gh"));
    }
    if header.last_valid < header.first_valid {
        return Err(EncodingError::InvalidValidityWindow {
            first_valid: header.first_valid,
            last_valid: header.last_valid,
        });
    }

    match &tx.body {
        TransactionBody::Payment(pay) => {
            if pay.receiver.is_zero() && pay.close_remainder_to.is_none() {
                return Err(EncodingError::MissingField("rcv"));
            }
        }
        TransactionBody::AssetTransfer(axfer) => {
            if axfer.asset_id == 0 {
                return Err(EncodingError::MissingField("xaid"));
            }
            if axfer.receiver.is_zero() {
                return Err(EncodingError::MissingField("arcv"));
            }
        }
        TransactionBody::AssetConfig(acfg) => {
            // All-zero params encode to nothing: on create that leaves no
            // `apar` at all, on reconfigure it reads back as a destroy.
            let params_empty = acfg
                .params
                .as_ref()
                .map_or(true, |params| asset_params_fields(params).0.is_empty());
            if params_empty && (acfg.asset_id == 0 || acfg.params.is_some()) {
                return Err(EncodingError::MissingField("apar"));
            }
        }
        TransactionBody::KeyRegistration(keyreg) => validate_keyreg(keyreg)?,
    }
    Ok(())
}

fn validate_keyreg(keyreg: &KeyRegistrationFields) -> Result<(), EncodingError> {
    if !keyreg.is_online() {
        if keyreg.vote_first != 0 || keyreg.vote_last != 0 || keyreg.vote_key_dilution != 0 {
            return Err(EncodingError::ConflictingField("votefst"));
        }
        return Ok(());
    }

    if keyreg.non_participation {
        return Err(EncodingError::ConflictingField("nonpart"));
    }
    if keyreg.vote_key.is_none() {
        return Err(EncodingError::MissingField("votekey"));
    }
    if keyreg.selection_key.is_none() {
        return Err(EncodingError::MissingField("selkey"));
    }
    if keyreg.vote_last == 0 {
        return Err(EncodingError::MissingField("votelst"));
    }
    if keyreg.vote_key_dilution == 0 {
        return Err(EncodingError::MissingField("votekd"));
    }
    if keyreg.vote_last < keyreg.vote_first {
        return Err(EncodingError::InvalidVoteWindow {
            vote_first: keyreg.vote_first,
            vote_last: keyreg.vote_last,
        });
    }
    Ok(())
}

fn header_fields(map: &mut FieldMap, header: &TransactionHeader) {
    map.uint("fee", header.fee);
    map.uint("fv", header.first_valid);
    map.string("gen", header.genesis_id.as_deref());
    map.fixed("gh", header.genesis_hash.as_ref().map(|d| &d[..]));
    map.fixed("grp", header.group.as_ref().map(|d| &d[..]));
    map.fixed("lx", header.lease.as_ref().map(|d| &d[..]));
    map.uint("lv", header.last_valid);
    map.bytes("note", &header.note);
    map.address("rekey", header.rekey_to.as_ref());
    map.address("snd", Some(&header.sender));
}

fn asset_params_fields(params: &AssetParams) -> FieldMap {
    let mut map = FieldMap::default();
    map.fixed("am", params.metadata_hash.as_ref().map(|d| &d[..]));
    map.string("an", params.asset_name.as_deref());
    map.string("au", params.url.as_deref());
    map.address("c", params.clawback.as_ref());
    map.uint("dc", u64::from(params.decimals));
    map.flag("df", params.default_frozen);
    map.address("f", params.freeze.as_ref());
    map.address("m", params.manager.as_ref());
    map.address("r", params.reserve.as_ref());
    map.uint("t", params.total);
    map.string("un", params.unit_name.as_deref());
    map
}

fn body_fields(map: &mut FieldMap, body: &TransactionBody) {
    match body {
        TransactionBody::Payment(pay) => {
            map.uint("amt", pay.amount);
            map.address("close", pay.close_remainder_to.as_ref());
            map.address("rcv", Some(&pay.receiver));
        }
        TransactionBody::AssetTransfer(axfer) => {
            map.uint("aamt", axfer.amount);
            map.address("aclose", axfer.close_remainder_to.as_ref());
            map.address("arcv", Some(&axfer.receiver));
            map.address("asnd", axfer.asset_sender.as_ref());
            map.uint("xaid", axfer.asset_id);
        }
        TransactionBody::AssetConfig(acfg) => {
            map.uint("caid", acfg.asset_id);
            if let Some(params) = &acfg.params {
                map.nested("apar", asset_params_fields(params));
            }
        }
        TransactionBody::KeyRegistration(keyreg) => {
            map.flag("nonpart", keyreg.non_participation);
            map.fixed("selkey", keyreg.selection_key.as_ref().map(|d| &d[..]));
            map.fixed("sprfkey", keyreg.state_proof_key.as_ref().map(|d| &d[..]));
            map.uint("votefst", keyreg.vote_first);
            map.uint("votekd", keyreg.vote_key_dilution);
            map.fixed("votekey", keyreg.vote_key.as_ref().map(|d| &d[..]));
            map.uint("votelst", keyreg.vote_last);
        }
    }
    map.string("type", Some(body.type_tag()));
}

/// Encode a transaction into its canonical bytes.
///
/// # Errors
///
/// [`EncodingError::MissingField`] when a field required by the
/// transaction's type is unset, [`EncodingError::InvalidValidityWindow`]
/// when `last_valid < first_valid`.
pub fn encode(tx: &UnsignedTransaction) -> Result<EncodedTransaction, EncodingError> {
    validate(tx)?;

    let mut map = FieldMap::default();
    header_fields(&mut map, &tx.header);
    body_fields(&mut map, &tx.body);
    let bytes = write(&map.into_value())?;

    trace!(
        kind = %tx.kind(),
        len = bytes.len(),
        "encoded transaction"
    );
    Ok(EncodedTransaction::from_bytes(bytes))
}

/// Encode the group-id preimage `{ "txlist": [raw ids...] }`.
pub(crate) fn encode_txid_list(ids: &[Digest]) -> Result<Vec<u8>, EncodingError> {
    let list = ids.iter().map(|id| Value::Binary(id.to_vec())).collect();
    let mut map = FieldMap::default();
    map.0.insert("txlist", Value::Array(list));
    write(&map.into_value())
}

/// Encode a signed envelope. The inner transaction bytes are copied
/// verbatim; a zero auth address is treated as absent.
pub fn encode_signed(signed: &SignedTransaction) -> Result<Vec<u8>, EncodingError> {
    let msgpack = |e: rmp::encode::ValueWriteError| EncodingError::Msgpack(e.to_string());
    let auth = signed.auth_address.filter(|a| !a.is_zero());
    let txn = signed.transaction.as_bytes();

    let mut out = Vec::with_capacity(txn.len() + 128);
    rmp::encode::write_map_len(&mut out, if auth.is_some() { 3 } else { 2 }).map_err(msgpack)?;
    if let Some(auth) = auth {
        rmp::encode::write_str(&mut out, "sgnr").map_err(msgpack)?;
        rmp::encode::write_bin(&mut out, auth.as_bytes()).map_err(msgpack)?;
    }
    rmp::encode::write_str(&mut out, "sig").map_err(msgpack)?;
    rmp::encode::write_bin(&mut out, signed.signature.as_bytes()).map_err(msgpack)?;
    rmp::encode::write_str(&mut out, "txn").map_err(msgpack)?;
    out.extend_from_slice(txn);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

fn read(bytes: &[u8]) -> Result<Value, EncodingError> {
    let mut cursor = bytes;
    let value =
        rmpv::decode::read_value(&mut cursor).map_err(|e| EncodingError::Msgpack(e.to_string()))?;
    if !cursor.is_empty() {
        return Err(EncodingError::TrailingBytes(cursor.len()));
    }
    Ok(value)
}

/// Consumes fields out of a decoded map. Absent fields read as their zero
/// value; whatever is left at [`FieldReader::finish`] is unknown.
struct FieldReader {
    fields: BTreeMap<String, Value>,
}

impl FieldReader {
    fn new(value: Value) -> Result<Self, EncodingError> {
        let Value::Map(entries) = value else {
            return Err(EncodingError::NotAMap);
        };

        let mut fields = BTreeMap::new();
        for (key, value) in entries {
            let key = key.as_str().ok_or(EncodingError::NotAMap)?.to_string();
            if fields.contains_key(&key) {
                return Err(EncodingError::DuplicateField(key));
            }
            fields.insert(key, value);
        }
        Ok(Self { fields })
    }

    fn raw(&mut self, key: &'static str) -> Option<Value> {
        self.fields.remove(key)
    }

    fn uint(&mut self, key: &'static str) -> Result<u64, EncodingError> {
        match self.raw(key) {
            None => Ok(0),
            Some(value) => value.as_u64().ok_or(EncodingError::InvalidFieldType {
                field: key,
                expected: "unsigned integer",
            }),
        }
    }

    fn bytes(&mut self, key: &'static str) -> Result<Vec<u8>, EncodingError> {
        match self.raw(key) {
            None => Ok(Vec::new()),
            Some(Value::Binary(bytes)) => Ok(bytes),
            Some(_) => Err(EncodingError::InvalidFieldType {
                field: key,
                expected: "bin",
            }),
        }
    }

    fn fixed<const N: usize>(&mut self, key: &'static str) -> Result<Option<[u8; N]>, EncodingError> {
        if !self.fields.contains_key(key) {
            return Ok(None);
        }
        let bytes = self.bytes(key)?;
        let got = bytes.len();
        bytes
            .try_into()
            .map(Some)
            .map_err(|_| EncodingError::InvalidLength {
                field: key,
                expected: N,
                got,
            })
    }

    fn address(&mut self, key: &'static str) -> Result<Option<Address>, EncodingError> {
        Ok(self
            .fixed::<VERIFYING_KEY_LENGTH>(key)?
            .map(Address::from_public_key))
    }

    fn string(&mut self, key: &'static str) -> Result<Option<String>, EncodingError> {
        match self.raw(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or(EncodingError::InvalidFieldType {
                    field: key,
                    expected: "utf-8 str",
                }),
        }
    }

    fn flag(&mut self, key: &'static str) -> Result<bool, EncodingError> {
        match self.raw(key) {
            None => Ok(false),
            Some(Value::Boolean(b)) => Ok(b),
            Some(_) => Err(EncodingError::InvalidFieldType {
                field: key,
                expected: "bool",
            }),
        }
    }

    fn nested(&mut self, key: &'static str) -> Result<Option<FieldReader>, EncodingError> {
        match self.raw(key) {
            None => Ok(None),
            Some(value @ Value::Map(_)) => FieldReader::new(value).map(Some),
            Some(_) => Err(EncodingError::InvalidFieldType {
                field: key,
                expected: "map",
            }),
        }
    }

    fn finish(self) -> Result<(), EncodingError> {
        match self.fields.into_keys().next() {
            Some(key) => Err(EncodingError::UnknownField(key)),
            None => Ok(()),
        }
    }
}

fn read_header(reader: &mut FieldReader) -> Result<TransactionHeader, EncodingError> {
    Ok(TransactionHeader {
        sender: reader.address("snd")?.unwrap_or(Address::ZERO),
        fee: reader.uint("fee")?,
        first_valid: reader.uint("fv")?,
        last_valid: reader.uint("lv")?,
        genesis_id: reader.string("gen")?,
        genesis_hash: reader.fixed("gh")?,
        note: reader.bytes("note")?,
        lease: reader.fixed("lx")?,
        group: reader.fixed("grp")?,
        rekey_to: reader.address("rekey")?,
    })
}

fn read_asset_params(mut reader: FieldReader) -> Result<AssetParams, EncodingError> {
    let params = AssetParams {
        total: reader.uint("t")?,
        decimals: reader
            .uint("dc")?
            .try_into()
            .map_err(|_| EncodingError::NumericOverflow("dc"))?,
        default_frozen: reader.flag("df")?,
        unit_name: reader.string("un")?,
        asset_name: reader.string("an")?,
        url: reader.string("au")?,
        metadata_hash: reader.fixed("am")?,
        manager: reader.address("m")?,
        reserve: reader.address("r")?,
        freeze: reader.address("f")?,
        clawback: reader.address("c")?,
    };
    reader.finish()?;
    Ok(params)
}

fn read_body(reader: &mut FieldReader, tag: &str) -> Result<TransactionBody, EncodingError> {
    let body = match tag {
        "pay" => TransactionBody::Payment(PaymentFields {
            receiver: reader.address("rcv")?.unwrap_or(Address::ZERO),
            amount: reader.uint("amt")?,
            close_remainder_to: reader.address("close")?,
        }),
        "axfer" => TransactionBody::AssetTransfer(AssetTransferFields {
            asset_id: reader.uint("xaid")?,
            amount: reader.uint("aamt")?,
            receiver: reader.address("arcv")?.unwrap_or(Address::ZERO),
            close_remainder_to: reader.address("aclose")?,
            asset_sender: reader.address("asnd")?,
        }),
        "acfg" => TransactionBody::AssetConfig(AssetConfigFields {
            asset_id: reader.uint("caid")?,
            params: reader.nested("apar")?.map(read_asset_params).transpose()?,
        }),
        "keyreg" => TransactionBody::KeyRegistration(KeyRegistrationFields {
            vote_key: reader.fixed("votekey")?,
            selection_key: reader.fixed("selkey")?,
            state_proof_key: reader.fixed("sprfkey")?,
            vote_first: reader.uint("votefst")?,
            vote_last: reader.uint("votelst")?,
            vote_key_dilution: reader.uint("votekd")?,
            non_participation: reader.flag("nonpart")?,
        }),
        other => return Err(EncodingError::UnknownType(other.to_string())),
    };
    Ok(body)
}

/// Decode canonical bytes back into a transaction.
///
/// The inverse of [`encode`]: anything [`encode`] accepts decodes again,
/// with zero-valued optional fields coming back as `None`, and any input
/// that [`encode`] would not have produced is rejected.
pub fn decode(bytes: &[u8]) -> Result<UnsignedTransaction, EncodingError> {
    let mut reader = FieldReader::new(read(bytes)?)?;

    let header = read_header(&mut reader)?;
    let tag = reader
        .string("type")?
        .ok_or(EncodingError::MissingField("type"))?;
    let body = read_body(&mut reader, &tag)?;
    reader.finish()?;

    let tx = UnsignedTransaction::new(header, body);
    if encode(&tx)?.as_bytes() != bytes {
        return Err(EncodingError::NonCanonical);
    }
    Ok(tx)
}

/// Decode a signed envelope.
///
/// The inner transaction is fully validated with [`decode`]; the envelope
/// itself must also be canonical.
pub fn decode_signed(bytes: &[u8]) -> Result<SignedTransaction, EncodingError> {
    let mut reader = FieldReader::new(read(bytes)?)?;

    let auth_address = reader.address("sgnr")?;
    let signature = reader
        .fixed::<SIGNATURE_LENGTH>("sig")?
        .map(Signature::from_bytes)
        .ok_or(EncodingError::MissingField("sig"))?;
    let txn = reader.raw("txn").ok_or(EncodingError::MissingField("txn"))?;
    reader.finish()?;

    let txn_bytes = write(&txn)?;
    decode(&txn_bytes)?;

    let signed = SignedTransaction {
        transaction: EncodedTransaction::from_bytes(txn_bytes),
        signature,
        auth_address,
    };
    if encode_signed(&signed)? != bytes {
        return Err(EncodingError::NonCanonical);
    }
    Ok(signed)
}
