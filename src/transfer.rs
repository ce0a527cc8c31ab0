use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};
use crate::ledger::Ledger;
use crate::models::{NewTransaction, Transaction, MAX_CONFIDENCE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for Format {
    type Err = LensError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(LensError::UnknownFormat(other.to_string())),
        }
    }
}

/// One line of the CSV layout `Date,Description,Amount,Category,Account,Merchant`.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Category", default)]
    category: Option<String>,
    #[serde(rename = "Account", default)]
    account: Option<String>,
    #[serde(rename = "Merchant", default)]
    merchant: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Accepts `1,234.56`, `$12.00`, `-5` and `(42.10)` for negatives.
/// `NaN` and infinities are refused.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace([',', '"', '$'], "");
    let s = s.trim();
    let value = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => -inner.trim().parse::<f64>().ok()?,
        None => s.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

/// ISO `YYYY-MM-DD`, falling back to US `M/D/YYYY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let m: u32 = parts[0].parse().ok()?;
    let d: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

fn non_blank(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

pub fn export_csv(transactions: &[Transaction]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for t in transactions {
        wtr.serialize(CsvRow {
            date: t.date.to_string(),
            description: t.description.clone(),
            amount: format!("{:.2}", t.amount),
            category: Some(t.category.clone()),
            account: t.account.clone(),
            merchant: t.merchant.clone(),
        })?;
    }
    if transactions.is_empty() {
        wtr.write_record(["Date", "Description", "Amount", "Category", "Account", "Merchant"])?;
    }
    let data = wtr.into_inner().map_err(|e| LensError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

pub fn export_json(transactions: &[Transaction]) -> Result<String> {
    Ok(serde_json::to_string_pretty(transactions)?)
}

pub fn export(transactions: &[Transaction], format: Format) -> Result<String> {
    log::info!("exporting {} transactions as {}", transactions.len(), format.extension());
    match format {
        Format::Csv => export_csv(transactions),
        Format::Json => export_json(transactions),
    }
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Parse CSV rows into drafts. Rows without a category are left for the
/// categorizer.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<NewTransaction>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut drafts = Vec::new();
    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        let line = i + 2;
        let row = row.map_err(|e| LensError::InvalidRow {
            line,
            reason: e.to_string(),
        })?;
        let date = parse_date(&row.date).ok_or_else(|| LensError::InvalidRow {
            line,
            reason: format!("bad date '{}'", row.date),
        })?;
        let amount = parse_amount(&row.amount).ok_or_else(|| LensError::InvalidRow {
            line,
            reason: format!("bad amount '{}'", row.amount),
        })?;
        drafts.push(NewTransaction {
            date,
            description: row.description,
            amount,
            category: non_blank(row.category),
            account: non_blank(row.account),
            merchant: non_blank(row.merchant),
        });
    }
    Ok(drafts)
}

/// Parse a JSON array of transactions. `line` in a row error is the
/// 1-based position of the entry in the array.
pub fn parse_json(content: &str) -> Result<Vec<Transaction>> {
    let transactions: Vec<Transaction> = serde_json::from_str(content)?;
    if let Some((i, t)) = transactions
        .iter()
        .enumerate()
        .find(|(_, t)| t.confidence > MAX_CONFIDENCE)
    {
        return Err(LensError::InvalidRow {
            line: i + 1,
            reason: format!("confidence {} is above {MAX_CONFIDENCE}", t.confidence),
        });
    }
    Ok(transactions)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub imported: usize,
    /// JSON entries whose id is already present.
    pub skipped: usize,
    /// Imported entries that need review.
    pub flagged: usize,
}

pub fn import_str(content: &str, format: Format, ledger: &mut Ledger) -> Result<ImportResult> {
    let before = ledger.len();
    let mut skipped = 0;
    match format {
        Format::Csv => {
            ledger.extend(parse_csv(content.as_bytes())?);
        }
        Format::Json => {
            let mut next = ledger.transactions().to_vec();
            for t in parse_json(content)? {
                if next.iter().any(|existing| existing.id == t.id) {
                    skipped += 1;
                } else {
                    next.push(t);
                }
            }
            ledger.replace_all(next);
        }
    }
    let flagged = ledger.transactions()[before..]
        .iter()
        .filter(|t| t.needs_review())
        .count();
    if flagged > 0 {
        log::warn!("{flagged} imported transactions need review");
    }
    let result = ImportResult {
        imported: ledger.len() - before,
        skipped,
        flagged,
    };
    log::info!("import finished: {result:?}");
    Ok(result)
}

pub fn import_file(path: &Path, format: Option<Format>, ledger: &mut Ledger) -> Result<ImportResult> {
    let format = match format {
        Some(f) => f,
        None => Format::from_path(path)?,
    };
    let content = std::fs::read_to_string(path)?;
    import_str(&content, format, ledger)
}

/// Read a whole dataset file into a fresh transaction list.
pub fn load_file(path: &Path) -> Result<Vec<Transaction>> {
    let mut ledger = Ledger::default();
    import_file(path, None, &mut ledger)?;
    Ok(ledger.into_transactions())
}
