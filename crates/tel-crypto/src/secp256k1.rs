use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use tel_types::Digest;

use crate::provider::{PublicKeyEncoding, SignatureProvider};
use crate::signer::SignatureError;

/// Length of a compressed SEC1 public key in bytes.
pub const COMPRESSED_PUBLIC_KEY_LEN: usize = 33;

/// ECDSA over secp256k1.
///
/// The 32 digest bytes are signed as a prehash (RFC 6979 nonces, low-S
/// normalized). Signatures are the 64-byte compact `r || s` form and public
/// keys the 33-byte compressed SEC1 point.
#[derive(Clone, Copy, Debug, Default)]
pub struct Secp256k1Provider;

impl SignatureProvider for Secp256k1Provider {
    type SigningKey = SigningKey;
    type VerifyingKey = VerifyingKey;

    fn generate_key_pair(&self) -> (SigningKey, VerifyingKey) {
        let sk = SigningKey::random(&mut rand::thread_rng());
        let vk = *sk.verifying_key();
        (sk, vk)
    }

    fn sign(&self, message_hash: &Digest, key: &SigningKey) -> Vec<u8> {
        let signed: Result<Signature, _> = key.sign_prehash(message_hash.as_bytes());
        match signed {
            Ok(signature) => signature.to_bytes().to_vec(),
            Err(e) => {
                // Only short prehashes are refused. An empty signature never verifies.
                tracing::warn!(error = %e, "secp256k1 signing failed");
                Vec::new()
            }
        }
    }

    fn verify(&self, message_hash: &Digest, signature: &[u8], key: &VerifyingKey) -> bool {
        let result = Signature::from_slice(signature)
            .and_then(|sig| key.verify_prehash(message_hash.as_bytes(), &sig));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(hash = %message_hash.short_hex(), error = %e, "signature rejected");
                false
            }
        }
    }
}

impl PublicKeyEncoding for VerifyingKey {
    fn to_hex(&self) -> String {
        hex::encode(self.to_encoded_point(true).as_bytes())
    }

    fn from_hex(s: &str) -> Result<Self, SignatureError> {
        let bytes = hex::decode(s).map_err(|_| SignatureError::MalformedEncoding)?;
        if bytes.len() != COMPRESSED_PUBLIC_KEY_LEN {
            return Err(SignatureError::MalformedEncoding);
        }
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| SignatureError::InvalidKey)
    }
}
