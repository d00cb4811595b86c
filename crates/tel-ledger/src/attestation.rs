use std::fmt;

use serde::{Deserialize, Serialize};
use tel_crypto::{ContentHasher, PublicKeyEncoding, SignatureProvider};
use tel_types::Digest;
use tracing::debug;

use crate::error::LedgerError;

/// Signed reference to a record held outside the ledger.
///
/// This is what callers append as an entry payload in place of the record
/// itself. Chain validation protects these three fields; verifying the
/// record against them is what exposes edits to the external copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAttestation {
    /// Content hash of the record at signing time.
    pub record_hash: Digest,
    /// Hex-encoded signature over `record_hash`.
    pub signature: String,
    /// Hex-encoded public key of the signer.
    pub signer_public_key: String,
}

impl RecordAttestation {
    /// Hash a record's canonical JSON and sign the hash.
    pub fn attest<P, T>(
        provider: &P,
        signing_key: &P::SigningKey,
        verifying_key: &P::VerifyingKey,
        record: &T,
    ) -> Result<Self, LedgerError>
    where
        P: SignatureProvider,
        T: Serialize,
    {
        let record_hash = ContentHasher::RECORD.hash_json(record)?;
        let signature = provider.sign(&record_hash, signing_key);
        Ok(Self {
            record_hash,
            signature: hex::encode(signature),
            signer_public_key: verifying_key.to_hex(),
        })
    }

    /// Check the signature against a freshly computed hash of `record`.
    ///
    /// The stored `record_hash` is not consulted. Undecodable key or
    /// signature text, or a record that cannot be serialized, yields `false`.
    pub fn verify_record<P, T>(&self, provider: &P, record: &T) -> bool
    where
        P: SignatureProvider,
        T: Serialize,
    {
        let Ok(current_hash) = ContentHasher::RECORD.hash_json(record) else {
            debug!("record could not be hashed; treating as unverified");
            return false;
        };
        self.verify_hash(provider, &current_hash)
    }

    /// Check the signature against a caller-supplied hash.
    pub fn verify_hash<P: SignatureProvider>(&self, provider: &P, message_hash: &Digest) -> bool {
        let Ok(public_key) = <P::VerifyingKey as PublicKeyEncoding>::from_hex(&self.signer_public_key)
        else {
            debug!("malformed signer public key");
            return false;
        };
        let Ok(signature) = hex::decode(&self.signature) else {
            debug!("malformed signature hex");
            return false;
        };
        provider.verify(message_hash, &signature, &public_key)
    }

    /// JSON encoding stored as an entry payload.
    pub fn to_payload(&self) -> Result<String, LedgerError> {
        serde_json::to_string(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Parse an entry payload written by [`RecordAttestation::to_payload`].
    pub fn from_payload(payload: &[u8]) -> Result<Self, LedgerError> {
        serde_json::from_slice(payload).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Verify many records, each against its own attestation.
    ///
    /// Every pair is checked; one failure never stops the batch.
    pub fn verify_batch<'a, P, T, I>(provider: &P, pairs: I) -> BatchReport
    where
        P: SignatureProvider,
        T: Serialize + 'a,
        I: IntoIterator<Item = (&'a RecordAttestation, &'a T)>,
    {
        let mut report = BatchReport::default();
        for (position, (attestation, record)) in pairs.into_iter().enumerate() {
            report.total += 1;
            if attestation.verify_record(provider, record) {
                report.verified += 1;
            } else {
                report.failed.push(position);
            }
        }
        report
    }
}

/// Tally of a batch verification.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub verified: usize,
    /// Positions (in input order) whose signature did not verify.
    pub failed: Vec<usize>,
}

impl BatchReport {
    pub fn all_verified(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} records verified", self.verified, self.total)
    }
}
