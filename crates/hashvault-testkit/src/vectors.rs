//! Known SHA-256 vectors.
//!
//! Published digests for fixed inputs. Any change in how uploads are hashed
//! shows up here first.

use hashvault_core::hash_bytes;

/// A known input and its digest.
#[derive(Debug, Clone)]
pub struct DigestVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub input: &'static [u8],
    /// Expected digest, lowercase hex.
    pub expected: &'static str,
}

/// Digest of the empty input.
pub const EMPTY_DIGEST: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Get all digest vectors.
pub fn all_vectors() -> Vec<DigestVector> {
    vec![
        DigestVector {
            name: "empty file",
            input: b"",
            expected: EMPTY_DIGEST,
        },
        DigestVector {
            name: "abc",
            input: b"abc",
            expected: "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        },
        DigestVector {
            name: "448-bit message",
            input: b"abcdbcdecdefdefgefghfghighijhijkijkljklmjklmnklmnlmnomnopnopq",
            expected: "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1",
        },
        DigestVector {
            name: "quick brown fox",
            input: b"The quick brown fox jumps over the lazy dog",
            expected: "d7a8fbb307d7809469ca9abcb0082e4f8d5651e46d3cdb762d02d0bf37c9e592",
        },
    ]
}

/// One million `a` bytes, with its digest. Larger than any single chunk.
pub fn million_a() -> (Vec<u8>, &'static str) {
    (
        vec![b'a'; 1_000_000],
        "cdc76e5c9914fb9281a1c7e284d73e67f1809a48a497200e046d39ccc7112cd0",
    )
}

/// Check every vector against `hash_bytes`.
///
/// Returns `(name, matches, actual hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let hex = hash_bytes(v.input).digest.to_hex();
            (v.name.to_string(), hex == v.expected, hex)
        })
        .collect()
}
