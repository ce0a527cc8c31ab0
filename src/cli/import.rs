use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use ledgerlens::transfer::{export, import_file, Format};
use ledgerlens::{Ledger, Transaction};

use super::transaction_table;

pub fn run(file: &str, format: Option<&str>, output: Option<&str>) -> Result<()> {
    let file_path = PathBuf::from(file);
    let format = format.map(str::parse::<Format>).transpose()?;

    let mut ledger = Ledger::default();
    let result = import_file(&file_path, format, &mut ledger)
        .with_context(|| format!("Importing {}", file_path.display()))?;

    println!(
        "{} imported, {} skipped (duplicate ids), {} need review",
        result.imported, result.skipped, result.flagged
    );

    let flagged: Vec<&Transaction> = ledger.needs_review();
    if !flagged.is_empty() {
        println!("{}\n{}", "Needs review".yellow().bold(), transaction_table(&flagged));
    }

    if let Some(out) = output {
        let out_path = PathBuf::from(out);
        let out_format = Format::from_path(&out_path).unwrap_or(Format::Json);
        let content = export(ledger.transactions(), out_format)?;
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&out_path, content)
            .with_context(|| format!("Writing {}", out_path.display()))?;
        println!("Wrote {}", out_path.display());
    }
    Ok(())
}
