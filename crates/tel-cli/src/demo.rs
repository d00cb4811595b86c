use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tel_crypto::{
    ContentHasher, Ed25519Provider, PublicKeyEncoding, Secp256k1Provider, SignatureProvider,
};
use tel_ledger::{BatchReport, Ledger, RecordAttestation, ValidationReport};
use tel_types::Digest;
use tracing::{debug, info};

use crate::config::{DemoConfig, SignatureScheme};

/// A record as it was signed and appended.
pub struct SignedRecord {
    pub record: Value,
    pub attestation: RecordAttestation,
    pub entry_index: u64,
    pub signature_valid: bool,
}

/// A record as re-checked after the tamper step.
pub struct RecheckedRecord {
    pub position: usize,
    pub record: Value,
    pub current_hash: Digest,
    pub tampered: bool,
    pub signature_valid: bool,
}

pub struct DemoOutcome {
    pub scheme: SignatureScheme,
    pub signer_public_key: String,
    pub signed: Vec<SignedRecord>,
    pub rechecked: Vec<RecheckedRecord>,
    pub batch: BatchReport,
    pub ledger: Ledger,
    pub corrupted_entry: Option<usize>,
    pub validation: ValidationReport,
}

/// Sign every record and append its attestation to a fresh ledger.
pub fn build_ledger<P: SignatureProvider>(
    provider: &P,
    signing_key: &P::SigningKey,
    verifying_key: &P::VerifyingKey,
    records: &[Value],
) -> anyhow::Result<(Ledger, Vec<SignedRecord>)> {
    let mut ledger = Ledger::new();
    let mut signed = Vec::with_capacity(records.len());

    for (position, record) in records.iter().enumerate() {
        let attestation = RecordAttestation::attest(provider, signing_key, verifying_key, record)
            .with_context(|| format!("attesting record {position}"))?;
        let signature_valid = attestation.verify_record(provider, record);
        let payload = attestation.to_payload()?;
        let entry_index = ledger.append(payload).index();
        debug!(position, entry_index, hash = %attestation.record_hash.short_hex(), "record attested");
        signed.push(SignedRecord {
            record: record.clone(),
            attestation,
            entry_index,
            signature_valid,
        });
    }

    Ok((ledger, signed))
}

/// Positions to tamper: the configured list, else a random non-empty subset.
pub fn select_tamper(config: &DemoConfig) -> Vec<usize> {
    if let Some(fixed) = &config.tamper {
        let mut positions = fixed.clone();
        positions.sort_unstable();
        positions.dedup();
        return positions;
    }

    let count = config.records.len();
    if count == 0 {
        return Vec::new();
    }
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let amount = rng.gen_range(1..=count);
    let mut positions = rand::seq::index::sample(&mut rng, count, amount).into_vec();
    positions.sort_unstable();
    positions
}

/// Copy of `record` with `field` overwritten.
pub fn tamper_record(record: &Value, field: &str, position: usize) -> Value {
    let mut tampered = record.clone();
    if let Some(map) = tampered.as_object_mut() {
        map.insert(
            field.to_string(),
            Value::from(format!("Tampered {field} #{}", position + 1)),
        );
    }
    tampered
}

/// Round-trip the ledger through its JSON export, overwriting the stored
/// payload of entry `index` on the way. Stored hashes are left as they were.
pub fn corrupt_entry(ledger: &Ledger, index: usize) -> anyhow::Result<Ledger> {
    let last = ledger.len() - 1;
    if last == 0 {
        anyhow::bail!("entry {index} cannot be corrupted; the ledger holds only its genesis entry");
    }
    if index == 0 || index > last {
        anyhow::bail!("entry {index} cannot be corrupted; choose 1..={last}");
    }
    let mut exported: Value = serde_json::from_str(&ledger.to_json()?)?;
    exported[index]["payload"] = Value::from(hex::encode(b"corrupted payload"));
    Ok(Ledger::from_json(&exported.to_string())?)
}

/// Sign the configured records with a fresh key pair and return the ledger.
pub fn export_ledger(config: &DemoConfig) -> anyhow::Result<Ledger> {
    fn build<P: SignatureProvider>(provider: &P, records: &[Value]) -> anyhow::Result<Ledger> {
        let (signing_key, verifying_key) = provider.generate_key_pair();
        let (ledger, _) = build_ledger(provider, &signing_key, &verifying_key, records)?;
        Ok(ledger)
    }

    match config.scheme {
        SignatureScheme::Ed25519 => build(&Ed25519Provider, &config.records),
        SignatureScheme::Secp256k1 => build(&Secp256k1Provider, &config.records),
    }
}

pub fn run(config: &DemoConfig, corrupt: Option<usize>) -> anyhow::Result<DemoOutcome> {
    match config.scheme {
        SignatureScheme::Ed25519 => run_with(&Ed25519Provider, config, corrupt),
        SignatureScheme::Secp256k1 => run_with(&Secp256k1Provider, config, corrupt),
    }
}

fn run_with<P: SignatureProvider>(
    provider: &P,
    config: &DemoConfig,
    corrupt: Option<usize>,
) -> anyhow::Result<DemoOutcome> {
    let (signing_key, verifying_key) = provider.generate_key_pair();

    let (ledger, signed) = build_ledger(provider, &signing_key, &verifying_key, &config.records)?;
    info!(scheme = ?config.scheme, records = signed.len(), "ledger built");

    let tamper = select_tamper(config);
    info!(?tamper, "tampering records");

    let rechecked: Vec<RecheckedRecord> = signed
        .iter()
        .enumerate()
        .map(|(position, s)| -> anyhow::Result<RecheckedRecord> {
            let tampered = tamper.contains(&position);
            let record = if tampered {
                tamper_record(&s.record, &config.tamper_field, position)
            } else {
                s.record.clone()
            };
            let current_hash = ContentHasher::RECORD.hash_json(&record)?;
            let signature_valid = s.attestation.verify_record(provider, &record);
            Ok(RecheckedRecord {
                position,
                record,
                current_hash,
                tampered,
                signature_valid,
            })
        })
        .collect::<anyhow::Result<_>>()?;

    let batch = RecordAttestation::verify_batch(
        provider,
        signed
            .iter()
            .zip(rechecked.iter())
            .map(|(s, r)| (&s.attestation, &r.record)),
    );

    let ledger = match corrupt {
        Some(index) => corrupt_entry(&ledger, index)?,
        None => ledger,
    };
    let validation = ledger.validate();

    Ok(DemoOutcome {
        scheme: config.scheme,
        signer_public_key: verifying_key.to_hex(),
        signed,
        rechecked,
        batch,
        ledger,
        corrupted_entry: corrupt,
        validation,
    })
}

#[cfg(test)]
mod tests {
    use tel_ledger::ViolationKind;

    use super::*;

    fn fixed(tamper: Vec<usize>) -> DemoConfig {
        DemoConfig {
            tamper: Some(tamper),
            ..DemoConfig::default()
        }
    }

    #[test]
    fn build_ledger_appends_one_entry_per_record() {
        let provider = Ed25519Provider;
        let (sk, pk) = provider.generate_key_pair();
        let records = DemoConfig::default().records;
        let (ledger, signed) = build_ledger(&provider, &sk, &pk, &records).unwrap();
        assert_eq!(ledger.len(), records.len() + 1);
        assert!(ledger.validate().is_valid());
        assert!(signed.iter().all(|s| s.signature_valid));
        let indices: Vec<u64> = signed.iter().map(|s| s.entry_index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn fixed_tamper_list_is_sorted_and_deduped() {
        assert_eq!(select_tamper(&fixed(vec![3, 1, 3])), vec![1, 3]);
    }

    #[test]
    fn seeded_selection_is_reproducible_and_non_empty() {
        let config = DemoConfig {
            seed: Some(42),
            ..DemoConfig::default()
        };
        let a = select_tamper(&config);
        let b = select_tamper(&config);
        assert_eq!(a, b);
        assert!(!a.is_empty());
        assert!(a.iter().all(|&i| i < config.records.len()));
    }

    #[test]
    fn no_records_means_nothing_to_tamper() {
        let config = DemoConfig {
            records: vec![],
            ..DemoConfig::default()
        };
        assert!(select_tamper(&config).is_empty());
    }

    #[test]
    fn tamper_record_overwrites_field() {
        let record = serde_json::json!({"prescription": "Metformin", "age": 50});
        let t = tamper_record(&record, "prescription", 2);
        assert_eq!(t["prescription"], "Tampered prescription #3");
        assert_eq!(t["age"], 50);
    }

    #[test]
    fn run_flags_exactly_the_tampered_records() {
        let outcome = run(&fixed(vec![0, 3]), None).unwrap();
        assert_eq!(outcome.batch.total, 5);
        assert_eq!(outcome.batch.verified, 3);
        assert_eq!(outcome.batch.failed, vec![0, 3]);
        for r in &outcome.rechecked {
            assert_eq!(r.signature_valid, !r.tampered);
        }
        // Records live outside the ledger, so the chain itself is still valid.
        assert!(outcome.validation.is_valid());
    }

    #[test]
    fn corrupted_entry_fails_validation_at_its_index() {
        let outcome = run(&fixed(vec![]), Some(3)).unwrap();
        assert!(outcome.batch.all_verified());
        let v = outcome.validation.violation.unwrap();
        assert_eq!(v.index, 3);
        assert_eq!(v.kind, ViolationKind::StructuralMismatch);
    }

    #[test]
    fn corrupt_entry_rejects_genesis_and_out_of_range() {
        let mut ledger = Ledger::new();
        ledger.append("one");
        ledger.append("two");
        assert!(corrupt_entry(&ledger, 0).is_err());
        let err = corrupt_entry(&ledger, 5).unwrap_err();
        assert!(err.to_string().ends_with("choose 1..=2"));
        assert!(corrupt_entry(&ledger, 2).is_ok());
    }

    #[test]
    fn genesis_only_ledger_has_nothing_to_corrupt() {
        let err = corrupt_entry(&Ledger::new(), 1).unwrap_err();
        assert!(err.to_string().contains("only its genesis entry"));
    }

    #[test]
    fn secp256k1_run_flags_tampered_records() {
        let config = DemoConfig {
            scheme: SignatureScheme::Secp256k1,
            ..fixed(vec![1])
        };
        let outcome = run(&config, None).unwrap();
        assert_eq!(outcome.scheme, SignatureScheme::Secp256k1);
        assert_eq!(outcome.signer_public_key.len(), 66);
        assert_eq!(outcome.batch.failed, vec![1]);
        assert!(outcome.signed.iter().all(|s| s.signature_valid));
        assert!(outcome.validation.is_valid());
    }

    #[test]
    fn export_ledger_honours_scheme() {
        for scheme in [SignatureScheme::Ed25519, SignatureScheme::Secp256k1] {
            let config = DemoConfig {
                scheme,
                ..DemoConfig::default()
            };
            let ledger = export_ledger(&config).unwrap();
            assert_eq!(ledger.len(), config.records.len() + 1);
            assert!(ledger.validate().is_valid());
        }
    }
}
