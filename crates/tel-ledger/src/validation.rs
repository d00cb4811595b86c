use std::fmt;

use crate::entry::LedgerEntry;

/// Outcome of a full-chain validation pass.
///
/// An invalid chain is an expected result, not an error: the report carries
/// the first failure so the caller can decide whether to reject, quarantine,
/// or alert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub entry_count: u64,
    pub violation: Option<Violation>,
}

impl ValidationReport {
    /// Returns `true` if no check failed.
    pub fn is_valid(&self) -> bool {
        self.violation.is_none()
    }

    /// Index of the first failing entry, if any.
    pub fn first_failure(&self) -> Option<u64> {
        self.violation.as_ref().map(|v| v.index)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.violation {
            None => write!(f, "valid ({} entries)", self.entry_count),
            Some(v) => write!(f, "invalid: {v}"),
        }
    }
}

/// The first integrity failure found in a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Position in the ledger of the failing entry.
    pub index: u64,
    pub kind: ViolationKind,
    pub description: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at index {}: {}", self.kind, self.index, self.description)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// Position 0 is not the fixed genesis entry.
    GenesisMismatch,
    /// Recomputed hash differs from the stored self-hash.
    StructuralMismatch,
    /// `previous_hash` differs from the predecessor's self-hash.
    LinkMismatch,
    /// Index is not the predecessor's index plus one.
    IndexGap,
}

/// Chain integrity validator.
pub struct ChainValidator;

impl ChainValidator {
    /// Check position 0 against the fixed genesis entry, then walk positions
    /// `1..len` in order and stop at the first failure.
    ///
    /// Per position: stored hash vs recomputed hash, then the link to the
    /// predecessor, then index continuity. Hashes are always recomputed from
    /// the live fields.
    pub fn validate(entries: &[LedgerEntry]) -> ValidationReport {
        let violation = entries.first().and_then(check_genesis).or_else(|| {
            entries
                .windows(2)
                .enumerate()
                .find_map(|(offset, pair)| check_pair((offset + 1) as u64, &pair[0], &pair[1]))
        });

        ValidationReport {
            entry_count: entries.len() as u64,
            violation,
        }
    }
}

fn check_genesis(first: &LedgerEntry) -> Option<Violation> {
    let expected = LedgerEntry::genesis();
    if *first == expected {
        return None;
    }
    let description = if first.is_intact() {
        format!(
            "genesis hash {} differs from the fixed genesis {}",
            first.self_hash().short_hex(),
            expected.self_hash().short_hex()
        )
    } else {
        format!(
            "stored genesis hash {} does not match computed {}",
            first.self_hash().short_hex(),
            first.recompute_hash().short_hex()
        )
    };
    Some(Violation {
        index: 0,
        kind: ViolationKind::GenesisMismatch,
        description,
    })
}

fn check_pair(position: u64, previous: &LedgerEntry, current: &LedgerEntry) -> Option<Violation> {
    let computed = current.recompute_hash();
    if computed != *current.self_hash() {
        return Some(Violation {
            index: position,
            kind: ViolationKind::StructuralMismatch,
            description: format!(
                "stored hash {} does not match computed {}",
                current.self_hash().short_hex(),
                computed.short_hex()
            ),
        });
    }

    if current.previous_hash() != previous.self_hash() {
        return Some(Violation {
            index: position,
            kind: ViolationKind::LinkMismatch,
            description: format!(
                "previous hash {} does not match predecessor {}",
                current.previous_hash().short_hex(),
                previous.self_hash().short_hex()
            ),
        });
    }

    if previous.index().checked_add(1) != Some(current.index()) {
        return Some(Violation {
            index: position,
            kind: ViolationKind::IndexGap,
            description: format!(
                "expected index {}, found {}",
                previous.index().saturating_add(1),
                current.index()
            ),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use tel_types::{Digest, Timestamp};

    use super::*;

    fn chain(len: u64) -> Vec<LedgerEntry> {
        let mut entries = vec![LedgerEntry::genesis()];
        for i in 1..len {
            let prev = *entries[entries.len() - 1].self_hash();
            entries.push(LedgerEntry::new(i, format!("entry-{i}"), prev, 0));
        }
        entries
    }

    #[test]
    fn empty_slice_is_valid() {
        let report = ChainValidator::validate(&[]);
        assert!(report.is_valid());
        assert_eq!(report.entry_count, 0);
    }

    #[test]
    fn genesis_only_is_valid() {
        let report = ChainValidator::validate(&chain(1));
        assert!(report.is_valid());
        assert_eq!(report.entry_count, 1);
    }

    #[test]
    fn well_formed_chain_is_valid() {
        let report = ChainValidator::validate(&chain(8));
        assert!(report.is_valid());
        assert_eq!(report.first_failure(), None);
        assert_eq!(report.to_string(), "valid (8 entries)");
    }

    #[test]
    fn structural_check_runs_before_link_check() {
        let mut entries = chain(4);
        entries[2].payload_mut().extend_from_slice(b"x");
        *entries[2].previous_hash_mut() = Digest::zero();
        let v = ChainValidator::validate(&entries).violation.unwrap();
        assert_eq!(v.index, 2);
        assert_eq!(v.kind, ViolationKind::StructuralMismatch);
    }

    #[test]
    fn consistent_entry_with_gap_reports_index_gap() {
        let mut entries = chain(3);
        let prev = *entries[2].self_hash();
        // Self-consistent and correctly linked, but skips index 3.
        entries.push(LedgerEntry::with_timestamp(
            5,
            "skipped",
            prev,
            0,
            Timestamp::now(),
        ));
        let v = ChainValidator::validate(&entries).violation.unwrap();
        assert_eq!(v.index, 3);
        assert_eq!(v.kind, ViolationKind::IndexGap);
        assert!(v.description.contains("expected index 3, found 5"));
    }

    #[test]
    fn edited_genesis_payload_fails_at_zero() {
        let mut entries = chain(3);
        *entries[0].payload_mut() = b"FORGED GENESIS".to_vec();
        let v = ChainValidator::validate(&entries).violation.unwrap();
        assert_eq!((v.index, v.kind), (0, ViolationKind::GenesisMismatch));
        assert!(v.description.starts_with("stored genesis hash"));
    }

    #[test]
    fn self_consistent_foreign_root_fails_at_zero() {
        let mut entries = chain(1);
        entries[0] = LedgerEntry::with_timestamp(
            0,
            "other root",
            Digest::zero(),
            0,
            Timestamp::UNIX_EPOCH,
        );
        let v = ChainValidator::validate(&entries).violation.unwrap();
        assert_eq!((v.index, v.kind), (0, ViolationKind::GenesisMismatch));
        assert!(v.description.contains("differs from the fixed genesis"));
    }

    #[test]
    fn report_display_names_failure() {
        let mut entries = chain(3);
        *entries[1].nonce_mut() = 42;
        let report = ChainValidator::validate(&entries);
        assert!(report
            .to_string()
            .starts_with("invalid: StructuralMismatch at index 1"));
    }
}
