use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::samples;

/// Curve used to sign record attestations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum SignatureScheme {
    #[default]
    #[serde(rename = "ed25519")]
    #[value(name = "ed25519")]
    Ed25519,
    #[serde(rename = "secp256k1")]
    #[value(name = "secp256k1")]
    Secp256k1,
}

/// Settings for `tel demo` and `tel export`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Records to sign and chain. Each must serialize to a JSON object.
    pub records: Vec<Value>,
    /// Field overwritten in a tampered record.
    pub tamper_field: String,
    /// Fixed record positions to tamper. `None` picks a random subset.
    pub tamper: Option<Vec<usize>>,
    /// Seed for the random subset.
    pub seed: Option<u64>,
    pub scheme: SignatureScheme,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            records: samples::patient_records(),
            tamper_field: "prescription".into(),
            tamper: None,
            seed: None,
            scheme: SignatureScheme::default(),
        }
    }
}

impl DemoConfig {
    /// Read a TOML file; absent keys keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.check()?;
        Ok(config)
    }

    /// Defaults, or the file at `path` when given.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if let Some(pos) = self.records.iter().position(|r| !r.is_object()) {
            anyhow::bail!("record {pos} is not a table");
        }
        if let Some(bad) = self
            .tamper
            .iter()
            .flatten()
            .find(|&&i| i >= self.records.len())
        {
            anyhow::bail!(
                "tamper position {bad} out of range for {} records",
                self.records.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_uses_sample_records() {
        let c = DemoConfig::default();
        assert_eq!(c.records.len(), 5);
        assert_eq!(c.tamper_field, "prescription");
        assert!(c.tamper.is_none());
        assert!(c.seed.is_none());
        assert_eq!(c.scheme, SignatureScheme::Ed25519);
    }

    #[test]
    fn load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 7\ntamper = [0, 2]").unwrap();
        let c = DemoConfig::load(file.path()).unwrap();
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.tamper, Some(vec![0, 2]));
        assert_eq!(c.records.len(), 5);
    }

    #[test]
    fn load_custom_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "tamper_field = \"amount\"\n\n[[records]]\nid = \"a\"\namount = 10\n\n[[records]]\nid = \"b\"\namount = 20"
        )
        .unwrap();
        let c = DemoConfig::load(file.path()).unwrap();
        assert_eq!(c.records.len(), 2);
        assert_eq!(c.records[1]["amount"], 20);
        assert_eq!(c.tamper_field, "amount");
    }

    #[test]
    fn load_scheme() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scheme = \"secp256k1\"").unwrap();
        let c = DemoConfig::load(file.path()).unwrap();
        assert_eq!(c.scheme, SignatureScheme::Secp256k1);
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scheme = \"rsa\"").unwrap();
        assert!(DemoConfig::load(file.path()).is_err());
    }

    #[test]
    fn out_of_range_tamper_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tamper = [9]").unwrap();
        let err = DemoConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn missing_file_names_path() {
        let err = DemoConfig::load(Path::new("/nonexistent/tel.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tel.toml"));
    }

    #[test]
    fn resolve_without_path_is_default() {
        let c = DemoConfig::resolve(None).unwrap();
        assert_eq!(c.records.len(), 5);
    }
}
