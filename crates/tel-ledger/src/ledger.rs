use tracing::{debug, warn};

use crate::entry::LedgerEntry;
use crate::error::LedgerError;
use crate::validation::{ChainValidator, ValidationReport};

/// Genesis-rooted, append-only sequence of [`LedgerEntry`].
///
/// The ledger owns its entries exclusively and is never empty. It has no
/// internal locking: callers sharing one across threads must hold a lock from
/// the read of the head through the end of [`Ledger::append`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// A ledger holding only the genesis entry.
    pub fn new() -> Self {
        Self {
            entries: vec![LedgerEntry::genesis()],
        }
    }

    /// Re-hydrate a previously exported sequence.
    ///
    /// Nothing is checked beyond non-emptiness; run [`Ledger::validate`]
    /// before trusting the result. That includes the genesis entry.
    pub fn from_entries(entries: Vec<LedgerEntry>) -> Result<Self, LedgerError> {
        if entries.is_empty() {
            return Err(LedgerError::EmptyLedger);
        }
        Ok(Self { entries })
    }

    /// The most recently appended entry (genesis on a fresh ledger).
    pub fn head(&self) -> &LedgerEntry {
        // Invariant: `entries` is non-empty, enforced by every constructor.
        &self.entries[self.entries.len() - 1]
    }

    /// Append a payload with nonce 0.
    pub fn append(&mut self, payload: impl Into<Vec<u8>>) -> &LedgerEntry {
        self.append_with_nonce(payload, 0)
    }

    /// Append a payload, linking it to the current head.
    pub fn append_with_nonce(&mut self, payload: impl Into<Vec<u8>>, nonce: u64) -> &LedgerEntry {
        let head = self.head();
        let index = head.index() + 1;
        let entry = LedgerEntry::new(index, payload, *head.self_hash(), nonce);
        debug!(
            index,
            hash = %entry.self_hash().short_hex(),
            prev = %entry.previous_hash().short_hex(),
            "appended ledger entry"
        );
        self.entries.push(entry);
        self.head()
    }

    /// Full-chain structural check. See [`ChainValidator::validate`].
    pub fn validate(&self) -> ValidationReport {
        let report = ChainValidator::validate(&self.entries);
        match &report.violation {
            None => debug!(entries = report.entry_count, "ledger chain valid"),
            Some(v) => warn!(index = v.index, kind = ?v.kind, "{}", v.description),
        }
        report
    }

    /// Convenience for `validate().is_valid()`.
    pub fn is_valid(&self) -> bool {
        self.validate().is_valid()
    }

    pub fn genesis(&self) -> &LedgerEntry {
        &self.entries[0]
    }

    pub fn get(&self, index: usize) -> Option<&LedgerEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LedgerEntry> {
        self.entries.iter()
    }

    /// Number of entries, genesis included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; a ledger holds at least its genesis entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize every entry, stored hashes included, as a JSON array.
    pub fn to_json(&self) -> Result<String, LedgerError> {
        serde_json::to_string_pretty(&self.entries)
            .map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Parse a JSON array produced by [`Ledger::to_json`]. Does not validate.
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        let entries: Vec<LedgerEntry> =
            serde_json::from_str(json).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Self::from_entries(entries)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a LedgerEntry;
    type IntoIter = std::slice::Iter<'a, LedgerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
