//! Canonical CBOR encoding for deterministic hashing and signing.
//!
//! Rules (RFC 8949 core deterministic encoding):
//! - Map keys: text, sorted by their encoded bytes
//! - Integers: smallest valid encoding
//! - Lengths: definite only
//! - Optional fields are omitted, never encoded as null
//!
//! **The anchor layout is frozen.** Changing it breaks every stored chain.

use ciborium::value::Value;

use crate::error::{CoreError, Result};
use crate::record::SubmissionRecord;
use crate::types::Digest;

/// Domain separation prefix for anchor hashes.
pub const ANCHOR_DOMAIN: &[u8] = b"hashvault/anchor/v1";

/// CBOR map key names for anchors.
mod keys {
    pub const SEQ: &str = "seq";
    pub const ID: &str = "id";
    pub const OWNER: &str = "owner";
    pub const FILENAME: &str = "filename";
    pub const CONTENT_TYPE: &str = "content_type";
    pub const SIZE: &str = "size";
    pub const DIGEST: &str = "digest";
    pub const CREATED_AT: &str = "created_at";
    pub const SUBMITTED_BY: &str = "submitted_by";
    pub const ANCHORED_AT: &str = "anchored_at";
    pub const PREV: &str = "prev";
}

/// Canonical bytes an anchor hash is computed over.
pub fn anchor_bytes(
    record: &SubmissionRecord,
    seq: u64,
    anchored_at: i64,
    prev: Option<&Digest>,
) -> Vec<u8> {
    let mut entries = vec![
        text_entry(keys::SEQ, Value::Integer(seq.into())),
        text_entry(keys::ID, Value::Text(record.id.as_str().to_string())),
        text_entry(keys::OWNER, Value::Text(record.owner.clone())),
        text_entry(keys::FILENAME, Value::Text(record.filename.clone())),
        text_entry(keys::CONTENT_TYPE, Value::Text(record.content_type.clone())),
        text_entry(keys::SIZE, Value::Integer(record.size.into())),
        text_entry(keys::DIGEST, Value::Bytes(record.digest.0.to_vec())),
        text_entry(keys::CREATED_AT, Value::Integer(record.created_at.into())),
        text_entry(keys::ANCHORED_AT, Value::Integer(anchored_at.into())),
    ];
    if let Some(user) = &record.submitted_by {
        entries.push(text_entry(keys::SUBMITTED_BY, Value::Text(user.clone())));
    }
    if let Some(prev) = prev {
        entries.push(text_entry(keys::PREV, Value::Bytes(prev.0.to_vec())));
    }

    let mut buf = Vec::new();
    // Every value above is a supported variant.
    encode_map(&mut buf, &entries);
    buf
}

fn text_entry(key: &str, value: Value) -> (Value, Value) {
    (Value::Text(key.to_string()), value)
}

/// Encode a CBOR value to canonical bytes.
///
/// Floats, tags and other variants with no canonical form here are rejected.
pub fn encode_canonical(value: &Value) -> Result<Vec<u8>> {
    check_supported(value)?;
    let mut buf = Vec::new();
    encode_value(&mut buf, value);
    Ok(buf)
}

fn check_supported(value: &Value) -> Result<()> {
    match value {
        Value::Integer(_) | Value::Bytes(_) | Value::Text(_) | Value::Bool(_) | Value::Null => {
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(check_supported),
        Value::Map(entries) => entries.iter().try_for_each(|(k, v)| {
            check_supported(k)?;
            check_supported(v)
        }),
        other => Err(CoreError::EncodingError(format!(
            "unsupported CBOR value: {other:?}"
        ))),
    }
}

/// Recursively encode a CBOR value. Callers guarantee supported variants.
fn encode_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        Value::Map(entries) => encode_map(buf, entries),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        _ => buf.push(0xf6),
    }
}

fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value(buf, item);
    }
}

fn encode_map(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut sorted: Vec<_> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_bytes = Vec::new();
            encode_value(&mut key_bytes, k);
            (key_bytes, v)
        })
        .collect();

    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, sorted.len() as u64);
    for (key_bytes, v) in sorted {
        buf.extend_from_slice(&key_bytes);
        encode_value(buf, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubmissionId;

    fn sample_record() -> SubmissionRecord {
        SubmissionRecord {
            id: SubmissionId::normalize("HV-0011223344556677"),
            owner: "ALPHA_TEAM_01".into(),
            filename: "report.pdf".into(),
            content_type: "application/pdf".into(),
            size: 1024,
            digest: Digest::from_bytes([0x11; 32]),
            created_at: 1_700_000_000_000,
            submitted_by: None,
        }
    }

    #[test]
    fn test_anchor_bytes_deterministic() {
        let record = sample_record();
        let b1 = anchor_bytes(&record, 1, 1_700_000_000_001, None);
        let b2 = anchor_bytes(&record, 1, 1_700_000_000_001, None);
        assert_eq!(b1, b2);
    }

    #[test]
    fn test_anchor_bytes_bind_every_field() {
        let record = sample_record();
        let base = anchor_bytes(&record, 1, 5, None);

        let mut renamed = record.clone();
        renamed.filename = "report2.pdf".into();
        assert_ne!(base, anchor_bytes(&renamed, 1, 5, None));

        assert_ne!(base, anchor_bytes(&record, 2, 5, None));
        assert_ne!(base, anchor_bytes(&record, 1, 6, None));
        assert_ne!(
            base,
            anchor_bytes(&record, 1, 5, Some(&Digest::from_bytes([0; 32])))
        );

        let mut attributed = record;
        attributed.submitted_by = Some("alice".into());
        assert_ne!(base, anchor_bytes(&attributed, 1, 5, None));
    }

    #[test]
    fn test_anchor_bytes_decode_as_cbor_map() {
        let bytes = anchor_bytes(&sample_record(), 3, 9, None);
        let value: Value = ciborium::from_reader(&bytes[..]).unwrap();
        match value {
            Value::Map(entries) => assert_eq!(entries.len(), 9),
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn test_map_keys_sorted() {
        let value = Value::Map(vec![
            (Value::Text("zz".into()), Value::Integer(1.into())),
            (Value::Text("a".into()), Value::Integer(2.into())),
        ]);
        let bytes = encode_canonical(&value).unwrap();
        // a2 61 'a' 02 62 'z' 'z' 01
        assert_eq!(bytes, vec![0xa2, 0x61, b'a', 0x02, 0x62, b'z', b'z', 0x01]);
    }

    #[test]
    fn test_small_integer_encodings() {
        let cases: [(u64, Vec<u8>); 4] = [
            (0, vec![0x00]),
            (23, vec![0x17]),
            (24, vec![0x18, 24]),
            (500, vec![0x19, 0x01, 0xf4]),
        ];
        for (n, expected) in cases {
            assert_eq!(encode_canonical(&Value::Integer(n.into())).unwrap(), expected);
        }
    }

    #[test]
    fn test_float_rejected() {
        assert!(encode_canonical(&Value::Float(1.5)).is_err());
    }
}
