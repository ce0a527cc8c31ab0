use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;

use ledgerlens::settings::{load_settings, shellexpand_path};
use ledgerlens::transfer::{export, Format};

use super::load_dataset;

fn default_path(format: Format) -> PathBuf {
    let date = Local::now().format("%Y-%m-%d").to_string();
    PathBuf::from(shellexpand_path(&load_settings().export_dir))
        .join(format!("transactions-{date}.{}", format.extension()))
}

pub fn run(data: Option<&str>, format: &str, output: Option<&str>, save: bool) -> Result<()> {
    let format: Format = format.parse()?;
    let (txns, _) = load_dataset(data)?;
    let content = export(&txns, format)?;

    let path = match (output, save) {
        (Some(o), _) => PathBuf::from(o),
        (None, true) => default_path(format),
        (None, false) => {
            print!("{content}");
            if format == Format::Json {
                println!();
            }
            return Ok(());
        }
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content).with_context(|| format!("Writing {}", path.display()))?;
    println!("Wrote {} transactions to {}", txns.len(), path.display());
    Ok(())
}
