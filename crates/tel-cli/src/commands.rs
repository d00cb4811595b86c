use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use tel_ledger::{Ledger, ValidationReport};

use crate::cli::*;
use crate::config::DemoConfig;
use crate::demo::{self, DemoOutcome};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Demo(args) => cmd_demo(args, cli.format),
        Command::Export(args) => cmd_export(args),
        Command::Validate(args) => cmd_validate(args, cli.format),
    }
}

fn cmd_demo(args: DemoArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut config = DemoConfig::resolve(args.config.as_deref())?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(scheme) = args.scheme {
        config.scheme = scheme;
    }
    if !args.tamper.is_empty() {
        if let Some(bad) = args.tamper.iter().find(|&&i| i >= config.records.len()) {
            anyhow::bail!("--tamper {bad} out of range for {} records", config.records.len());
        }
        config.tamper = Some(args.tamper);
    }

    let outcome = demo::run(&config, args.tamper_entry)?;
    match format {
        OutputFormat::Text => print_demo(&outcome),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&demo_json(&outcome))?),
    }
    Ok(())
}

fn print_demo(outcome: &DemoOutcome) {
    println!("Signature scheme: {:?}", outcome.scheme);
    println!("Signer public key: {}", outcome.signer_public_key.cyan());
    println!();

    for s in &outcome.signed {
        println!("{} {}", "Original Record:".bold(), s.record);
        println!("  Record Hash: {}", s.attestation.record_hash.to_string().dimmed());
        println!("  Signature:   {}", s.attestation.signature.dimmed());
        println!("  Signature valid? {}", yes_no(s.signature_valid));
        println!("  Appended as entry {}", format!("#{}", s.entry_index).yellow());
        println!();
    }

    for r in &outcome.rechecked {
        let label = format!("--- Record #{} ---", r.position + 1);
        if r.tampered {
            println!("{} {}", label.bold(), "(tampered)".red());
        } else {
            println!("{}", label.bold());
        }
        println!("  Record: {}", r.record);
        println!("  Record Hash: {}", r.current_hash.to_string().dimmed());
        println!("  Is the original signature still valid? {}", yes_no(r.signature_valid));
        println!();
    }

    let summary = outcome.batch.to_string();
    if outcome.batch.all_verified() {
        println!("{} {}", "✓".green().bold(), summary);
    } else {
        println!("{} {}", "✗".red().bold(), summary);
    }

    if let Some(index) = outcome.corrupted_entry {
        println!("Corrupted stored payload of entry {}", format!("#{index}").yellow());
    }
    print_validation(&outcome.validation);
}

fn demo_json(outcome: &DemoOutcome) -> serde_json::Value {
    json!({
        "scheme": outcome.scheme,
        "signer_public_key": outcome.signer_public_key,
        "records": outcome.rechecked.iter().zip(&outcome.signed).map(|(r, s)| json!({
            "position": r.position,
            "entry_index": s.entry_index,
            "attestation": s.attestation,
            "tampered": r.tampered,
            "current_hash": r.current_hash,
            "signature_valid": r.signature_valid,
        })).collect::<Vec<_>>(),
        "verified": outcome.batch.verified,
        "total": outcome.batch.total,
        "corrupted_entry": outcome.corrupted_entry,
        "ledger_entries": outcome.ledger.len(),
        "chain": validation_json(&outcome.validation),
    })
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut config = DemoConfig::resolve(args.config.as_deref())?;
    if let Some(scheme) = args.scheme {
        config.scheme = scheme;
    }
    let ledger = demo::export_ledger(&config)?;
    let json = ledger.to_json()?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "{} Exported {} entries to {}",
                "✓".green().bold(),
                ledger.len(),
                path.display().to_string().bold()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    let ledger = Ledger::from_json(&text)
        .with_context(|| format!("loading ledger from {}", args.path.display()))?;
    let report = ledger.validate();

    match format {
        OutputFormat::Text => print_validation(&report),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&validation_json(&report))?)
        }
    }

    if args.strict && !report.is_valid() {
        anyhow::bail!("ledger chain is invalid");
    }
    Ok(())
}

fn print_validation(report: &ValidationReport) {
    match &report.violation {
        None => println!(
            "{} Ledger chain valid ({} entries)",
            "✓".green().bold(),
            report.entry_count
        ),
        Some(v) => {
            println!("{} Ledger chain invalid", "✗".red().bold());
            println!("  First failure: entry {}", format!("#{}", v.index).yellow());
            println!("  Check: {}", format!("{:?}", v.kind).red());
            println!("  Detail: {}", v.description);
        }
    }
}

fn validation_json(report: &ValidationReport) -> serde_json::Value {
    json!({
        "valid": report.is_valid(),
        "entry_count": report.entry_count,
        "first_failure": report.violation.as_ref().map(|v| json!({
            "index": v.index,
            "kind": format!("{:?}", v.kind),
            "description": v.description,
        })),
    })
}

fn yes_no(ok: bool) -> colored::ColoredString {
    if ok {
        "yes".green()
    } else {
        "no".red()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn exported_ledger() -> serde_json::Value {
        let ledger = demo::export_ledger(&DemoConfig::default()).unwrap();
        serde_json::from_str(&ledger.to_json().unwrap()).unwrap()
    }

    fn write_export(value: &serde_json::Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(value.to_string().as_bytes()).unwrap();
        file
    }

    fn validate_args(file: &tempfile::NamedTempFile, strict: bool) -> ValidateArgs {
        ValidateArgs {
            path: file.path().to_path_buf(),
            strict,
        }
    }

    #[test]
    fn validate_accepts_clean_export_in_strict_mode() {
        let file = write_export(&exported_ledger());
        assert!(cmd_validate(validate_args(&file, true), OutputFormat::Text).is_ok());
    }

    #[test]
    fn strict_validate_fails_on_tampered_export() {
        let mut value = exported_ledger();
        value[2]["payload"] = serde_json::Value::from(hex::encode("edited"));
        let file = write_export(&value);
        let err = cmd_validate(validate_args(&file, true), OutputFormat::Json).unwrap_err();
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn lenient_validate_reports_but_succeeds() {
        let mut value = exported_ledger();
        value[0]["payload"] = serde_json::Value::from(hex::encode("FORGED GENESIS"));
        let file = write_export(&value);
        assert!(cmd_validate(validate_args(&file, false), OutputFormat::Text).is_ok());
        assert!(cmd_validate(validate_args(&file, true), OutputFormat::Text).is_err());
    }

    #[test]
    fn validate_rejects_unparseable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = cmd_validate(validate_args(&file, false), OutputFormat::Text).unwrap_err();
        assert!(err.to_string().starts_with("loading ledger from"));
    }

    #[test]
    fn validate_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = ValidateArgs {
            path: dir.path().join("missing.json"),
            strict: false,
        };
        let err = cmd_validate(args, OutputFormat::Text).unwrap_err();
        assert!(err.to_string().starts_with("reading"));
    }
}
