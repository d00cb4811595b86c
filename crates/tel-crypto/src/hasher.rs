use sha2::{Digest as _, Sha256};
use tel_types::Digest;

/// SHA-256 content hasher with optional domain separation.
///
/// [`ContentHasher::RECORD`] is plain SHA-256, so a record hash can be
/// reproduced by any external tool from the record's canonical JSON.
/// [`ContentHasher::ENTRY`] prepends a domain tag so an entry self-hash can
/// never collide with a record content hash over the same bytes.
pub struct ContentHasher {
    domain: Option<&'static str>,
}

impl ContentHasher {
    /// Hasher for record content (no domain tag).
    pub const RECORD: Self = Self { domain: None };
    /// Hasher for ledger entry self-hashes.
    pub const ENTRY: Self = Self {
        domain: Some("tel-entry-v1"),
    };

    /// Hash raw bytes.
    pub fn hash(&self, data: &[u8]) -> Digest {
        self.hash_parts([data])
    }

    /// Hash an ordered sequence of byte slices as one stream.
    ///
    /// Parts are concatenated without separators; callers are responsible for
    /// making the encoding unambiguous (fixed widths or length prefixes).
    pub fn hash_parts<I, B>(&self, parts: I) -> Digest
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        if let Some(domain) = self.domain {
            hasher.update(domain.as_bytes());
            hasher.update(b":");
        }
        for part in parts {
            hasher.update(part.as_ref());
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Digest::from_hash(out)
    }

    /// Hash a serializable value as canonical JSON.
    pub fn hash_json<T: serde::Serialize>(&self, value: &T) -> Result<Digest, HasherError> {
        Ok(self.hash(&Self::canonical_json(value)?))
    }

    /// Canonical JSON encoding: compact, object keys sorted.
    ///
    /// Going through `serde_json::Value` sorts map keys, so two records with
    /// the same fields hash identically regardless of declaration order.
    pub fn canonical_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, HasherError> {
        let value =
            serde_json::to_value(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        serde_json::to_vec(&value).map_err(|e| HasherError::Serialization(e.to_string()))
    }
}

/// Errors from hashing operations.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
