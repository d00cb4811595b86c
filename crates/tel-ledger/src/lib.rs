//! Append-only hash-chained ledger.
//!
//! This crate provides:
//! - `LedgerEntry`, a write-once record whose self-hash covers every field
//! - `Ledger`, the genesis-rooted sequence with append and chain validation
//! - `ValidationReport`, which names the first failing index and check
//! - `RecordAttestation`, the signed {hash, signature, public key} payload
//!   callers store in entries to authenticate externally held records

pub mod attestation;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod validation;

pub use attestation::{BatchReport, RecordAttestation};
pub use entry::{LedgerEntry, GENESIS_PAYLOAD};
pub use error::LedgerError;
pub use ledger::Ledger;
pub use validation::{ChainValidator, ValidationReport, Violation, ViolationKind};
