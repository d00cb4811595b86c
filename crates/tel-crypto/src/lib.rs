//! Cryptographic primitives for the tamper-evident ledger.
//!
//! Provides SHA-256 content hashing (raw bytes, ordered parts, canonical
//! JSON), Ed25519 and secp256k1 ECDSA signing/verification, and the
//! [`SignatureProvider`] contract callers use to attest records before they
//! enter the ledger.
//!
//! All crypto operations wrap established libraries.

pub mod hasher;
pub mod provider;
pub mod secp256k1;
pub mod signer;

pub use hasher::{ContentHasher, HasherError};
pub use provider::{Ed25519Provider, PublicKeyEncoding, SignatureProvider};
pub use secp256k1::Secp256k1Provider;
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
