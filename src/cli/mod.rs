pub mod ask;
pub mod config;
pub mod export;
pub mod import;
pub mod review;
pub mod search;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use colored::Colorize;
use comfy_table::{Cell, Table};

use ledgerlens::fmt::money;
use ledgerlens::settings::{load_settings, shellexpand_path};
use ledgerlens::{sample, transfer, Transaction};

#[derive(Parser)]
#[command(
    name = "ledgerlens",
    version,
    about = "Ask questions about your transactions in plain English."
)]
pub struct Cli {
    /// CSV or JSON transaction file (default: configured data file, else sample data)
    #[arg(long, global = true)]
    pub data: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question, e.g. "how much did I spend". Falls back to a text search.
    Ask {
        /// The question or search text
        #[arg(required = true)]
        query: Vec<String>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List transactions matching text and structured filters.
    Search {
        /// Text to look for in description, category, merchant or account
        query: Option<String>,
        /// Date range: all, today, week, month, quarter, year
        #[arg(long, conflicts_with_all = ["from_date", "to_date"])]
        range: Option<String>,
        /// Custom range start (YYYY-MM-DD)
        #[arg(long = "from")]
        from_date: Option<String>,
        /// Custom range end (YYYY-MM-DD)
        #[arg(long = "to")]
        to_date: Option<String>,
        /// Category to include (repeatable)
        #[arg(long)]
        category: Vec<String>,
        /// Minimum absolute amount
        #[arg(long)]
        min: Option<f64>,
        /// Maximum absolute amount
        #[arg(long)]
        max: Option<f64>,
    },
    /// Show transactions whose categorization needs review.
    Review,
    /// Parse and categorize a CSV/JSON file.
    Import {
        /// Path to the CSV or JSON file
        file: String,
        /// csv or json (default: from the file extension)
        #[arg(long)]
        format: Option<String>,
        /// Write the normalized transactions to this file
        #[arg(long)]
        output: Option<String>,
    },
    /// Export the current dataset.
    Export {
        /// csv or json
        #[arg(long, default_value = "csv")]
        format: String,
        /// Output path (default: stdout)
        #[arg(long)]
        output: Option<String>,
        /// Write to <export_dir>/transactions-YYYY-MM-DD.<ext>
        #[arg(long, conflicts_with = "output")]
        save: bool,
    },
    /// Show settings and dataset statistics.
    Status,
    /// Update settings.
    Config {
        /// Default dataset file
        #[arg(long = "data-file")]
        data_file: Option<String>,
        /// Go back to the sample dataset
        #[arg(long = "clear-data-file", conflicts_with = "data_file")]
        clear_data_file: bool,
        /// Your name
        #[arg(long = "user-name")]
        user_name: Option<String>,
        /// Directory for `export --save`
        #[arg(long = "export-dir")]
        export_dir: Option<String>,
    },
}

/// Where the working transaction list came from.
pub enum Source {
    File(PathBuf),
    Sample,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(p) => write!(f, "{}", p.display()),
            Self::Sample => f.write_str("built-in sample data"),
        }
    }
}

pub(crate) fn load_dataset(data: Option<&str>) -> Result<(Vec<Transaction>, Source)> {
    let configured = load_settings().data_file;
    match data.map(str::to_string).or(configured) {
        Some(path) => {
            let path = PathBuf::from(shellexpand_path(&path));
            let txns = transfer::load_file(&path)
                .with_context(|| format!("Loading {}", path.display()))?;
            log::info!("loaded {} transactions from {}", txns.len(), path.display());
            Ok((txns, Source::File(path)))
        }
        None => Ok((sample::transactions(Local::now().date_naive()), Source::Sample)),
    }
}

pub(crate) fn transaction_table(rows: &[&Transaction]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Category", "Merchant", "Account"]);
    for t in rows {
        let amount = if t.amount < 0.0 {
            money(t.amount).red()
        } else {
            money(t.amount).green()
        };
        let category = if t.needs_review() {
            format!("{} ({}%)", t.category, t.confidence).yellow()
        } else {
            t.category.normal()
        };
        table.add_row(vec![
            Cell::new(t.date),
            Cell::new(&t.description),
            Cell::new(amount),
            Cell::new(category),
            Cell::new(t.merchant.as_deref().unwrap_or("")),
            Cell::new(t.account.as_deref().unwrap_or("")),
        ]);
    }
    table
}
