/// Errors produced by ledger operations.
///
/// Chain tampering is not an error; it is reported through
/// [`crate::ValidationReport`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger has no entries")]
    EmptyLedger,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("hashing error: {0}")]
    Hashing(#[from] tel_crypto::HasherError),
}
