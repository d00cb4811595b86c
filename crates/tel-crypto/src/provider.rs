use tel_types::Digest;

use crate::signer::{Signature, SignatureError, SigningKey, VerifyingKey};

/// Key generation, signing, and verification over a fixed curve.
///
/// The ledger never calls a provider itself. Callers sign a record's content
/// hash before appending an attestation, and later re-verify against a freshly
/// recomputed hash of the record as it currently exists.
///
/// `verify` returns a plain `bool`: a bad signature, wrong key, mismatched
/// hash, or undecodable signature bytes are all ordinary `false` outcomes.
pub trait SignatureProvider {
    type SigningKey;
    type VerifyingKey: PublicKeyEncoding;

    fn generate_key_pair(&self) -> (Self::SigningKey, Self::VerifyingKey);

    fn sign(&self, message_hash: &Digest, key: &Self::SigningKey) -> Vec<u8>;

    fn verify(&self, message_hash: &Digest, signature: &[u8], key: &Self::VerifyingKey) -> bool;
}

/// Fixed-width text encoding of a public key, for storage in entry payloads.
pub trait PublicKeyEncoding: Sized {
    fn to_hex(&self) -> String;

    fn from_hex(s: &str) -> Result<Self, SignatureError>;
}

impl PublicKeyEncoding for VerifyingKey {
    fn to_hex(&self) -> String {
        VerifyingKey::to_hex(self)
    }

    fn from_hex(s: &str) -> Result<Self, SignatureError> {
        VerifyingKey::from_hex(s)
    }
}

/// Ed25519 signature provider. Signs the raw 32 digest bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Provider;

impl SignatureProvider for Ed25519Provider {
    type SigningKey = SigningKey;
    type VerifyingKey = VerifyingKey;

    fn generate_key_pair(&self) -> (SigningKey, VerifyingKey) {
        let sk = SigningKey::generate();
        let vk = sk.verifying_key();
        (sk, vk)
    }

    fn sign(&self, message_hash: &Digest, key: &SigningKey) -> Vec<u8> {
        key.sign(message_hash.as_bytes()).to_bytes().to_vec()
    }

    fn verify(&self, message_hash: &Digest, signature: &[u8], key: &VerifyingKey) -> bool {
        let result = Signature::from_slice(signature)
            .and_then(|sig| key.verify(message_hash.as_bytes(), &sig));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(hash = %message_hash.short_hex(), error = %e, "signature rejected");
                false
            }
        }
    }
}
