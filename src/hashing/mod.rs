//! BLAKE3-derived keys for snippets, memo entries and feature hashing.

use blake3::Hasher;

/// Full 32-byte hash of `text`; keys the in-memory embedding memo.
#[inline]
pub fn hash_text(text: &str) -> [u8; 32] {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// With 64 bits the birthday bound sits around four billion items, far beyond any
/// realistic knowledge cache. A collision between two different snippets makes the
/// later write replace the earlier file; nothing downstream relies on ids being
/// cryptographically unique.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Content-addressed snippet id: identical text always maps to the same file.
#[inline]
pub fn snippet_id(text: &str) -> u64 {
    hash_to_u64(text.as_bytes())
}

/// Hashes a token under a salt (used by the stub embedder's feature hashing).
#[inline]
pub fn hash_token(token: &str, salt: u8) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(&[salt]);
    hasher.update(b"|");
    hasher.update(token.as_bytes());

    let hash = hasher.finalize();
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}
