//! Foundation types for the tamper-evident ledger (TEL).
//!
//! Every other TEL crate depends on `tel-types`.
//!
//! # Key Types
//!
//! - [`Digest`]: 256-bit hash value with a 64-char lowercase hex form
//! - [`Timestamp`]: creation time captured when an entry is built

pub mod digest;
pub mod error;
pub mod timestamp;

pub use digest::Digest;
pub use error::TypeError;
pub use timestamp::Timestamp;
