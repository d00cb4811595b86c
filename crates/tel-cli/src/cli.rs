use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::SignatureScheme;

#[derive(Parser)]
#[command(
    name = "tel",
    about = "Tamper-evident ledger: hash-chained entries with signed record attestations",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign sample records, chain them, tamper some, and re-verify
    Demo(DemoArgs),
    /// Build a ledger from the configured records and write it as JSON
    Export(ExportArgs),
    /// Load a JSON ledger export and validate its chain
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    /// TOML file overriding the built-in sample records
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Seed for the random tamper selection
    #[arg(long)]
    pub seed: Option<u64>,
    /// Record positions (0-based) to tamper instead of a random subset
    #[arg(long = "tamper", value_delimiter = ',')]
    pub tamper: Vec<usize>,
    /// Also corrupt the stored payload of this ledger entry
    #[arg(long)]
    pub tamper_entry: Option<usize>,
    /// Signature scheme; overrides the config file
    #[arg(long)]
    pub scheme: Option<SignatureScheme>,
}

#[derive(Args)]
pub struct ExportArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Signature scheme; overrides the config file
    #[arg(long)]
    pub scheme: Option<SignatureScheme>,
}

#[derive(Args)]
pub struct ValidateArgs {
    pub path: PathBuf,
    /// Exit with an error when the chain is invalid
    #[arg(long)]
    pub strict: bool,
}
