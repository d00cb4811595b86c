use std::fmt;

use serde::{Deserialize, Serialize};
use tel_crypto::ContentHasher;
use tel_types::{Digest, Timestamp};

/// Payload of the genesis entry.
pub const GENESIS_PAYLOAD: &str = "genesis";

/// One write-once record in the ledger.
///
/// `self_hash` is computed once in the constructor over index, payload,
/// previous hash, nonce, and creation time. No setters exist, so the stored
/// hash cannot drift from the content through this API; an entry that fails
/// [`LedgerEntry::recompute_hash`] was altered outside of it (for example
/// in a serialized export).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    index: u64,
    #[serde(with = "payload_hex")]
    payload: Vec<u8>,
    previous_hash: Digest,
    nonce: u64,
    created_at: Timestamp,
    self_hash: Digest,
}

impl LedgerEntry {
    /// Build an entry stamped with the current time.
    ///
    /// `index` and `previous_hash` are taken as given; keeping them consistent
    /// with the chain is the ledger's job.
    pub fn new(index: u64, payload: impl Into<Vec<u8>>, previous_hash: Digest, nonce: u64) -> Self {
        Self::with_timestamp(index, payload, previous_hash, nonce, Timestamp::now())
    }

    /// Build an entry with an explicit creation time.
    pub fn with_timestamp(
        index: u64,
        payload: impl Into<Vec<u8>>,
        previous_hash: Digest,
        nonce: u64,
        created_at: Timestamp,
    ) -> Self {
        let payload = payload.into();
        let self_hash = entry_hash(index, &payload, &previous_hash, nonce, created_at);
        Self {
            index,
            payload,
            previous_hash,
            nonce,
            created_at,
            self_hash,
        }
    }

    /// The fixed genesis entry. Identical in every ledger.
    pub fn genesis() -> Self {
        Self::with_timestamp(0, GENESIS_PAYLOAD, Digest::zero(), 0, Timestamp::UNIX_EPOCH)
    }

    /// Recompute the hash from the current field values.
    ///
    /// Never writes back to `self_hash`.
    pub fn recompute_hash(&self) -> Digest {
        entry_hash(
            self.index,
            &self.payload,
            &self.previous_hash,
            self.nonce,
            self.created_at,
        )
    }

    /// Returns `true` if the stored hash matches the current fields.
    pub fn is_intact(&self) -> bool {
        self.recompute_hash() == self.self_hash
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    pub fn previous_hash(&self) -> &Digest {
        &self.previous_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn self_hash(&self) -> &Digest {
        &self.self_hash
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Entry #{}", self.index)?;
        writeln!(f, "Timestamp: {}", self.created_at)?;
        match self.payload_str() {
            Some(text) => writeln!(f, "Payload: {text}")?,
            None => writeln!(f, "Payload: <{} bytes>", self.payload.len())?,
        }
        writeln!(f, "Previous Hash: {}", self.previous_hash)?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        write!(f, "Hash: {}", self.self_hash)
    }
}

/// Fields are fixed-width big-endian except the payload, which carries a
/// length prefix, so no two distinct field tuples share an encoding.
fn entry_hash(
    index: u64,
    payload: &[u8],
    previous_hash: &Digest,
    nonce: u64,
    created_at: Timestamp,
) -> Digest {
    let index = index.to_be_bytes();
    let payload_len = (payload.len() as u64).to_be_bytes();
    let nonce = nonce.to_be_bytes();
    let micros = created_at.unix_micros().to_be_bytes();
    ContentHasher::ENTRY.hash_parts([
        &index[..],
        &payload_len[..],
        payload,
        &previous_hash.as_bytes()[..],
        &nonce[..],
        &micros[..],
    ])
}

mod payload_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

// Direct field access for tamper tests elsewhere in the crate.
#[cfg(test)]
impl LedgerEntry {
    pub(crate) fn payload_mut(&mut self) -> &mut Vec<u8> {
        &mut self.payload
    }

    pub(crate) fn previous_hash_mut(&mut self) -> &mut Digest {
        &mut self.previous_hash
    }

    pub(crate) fn nonce_mut(&mut self) -> &mut u64 {
        &mut self.nonce
    }

    pub(crate) fn index_mut(&mut self) -> &mut u64 {
        &mut self.index
    }

    pub(crate) fn created_at_mut(&mut self) -> &mut Timestamp {
        &mut self.created_at
    }
}
