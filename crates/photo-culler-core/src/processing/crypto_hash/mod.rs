//! Exact content digest of an asset's encoded bytes.
//!
//! The digest is computed over the bytes exactly as the gallery stores them,
//! not over decoded pixels, so two files share a digest if and only if they
//! are byte-identical. Any re-encode produces a different digest; catching
//! those is the job of the perceptual fingerprint.
use serde::{Serialize, Serializer};
use std::fmt;

/// Length in bytes of a content digest
pub const DIGEST_LEN: usize = blake3::OUT_LEN;

/// BLAKE3 digest of an asset's encoded bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; DIGEST_LEN]);

impl ContentDigest {
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Compute the content digest of an encoded image using the Blake3 algorithm
pub fn compute_digest(bytes: &[u8]) -> ContentDigest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(bytes);
    ContentDigest(*hasher.finalize().as_bytes())
}
