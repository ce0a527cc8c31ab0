use anyhow::Result;
use colored::Colorize;

use ledgerlens::models::{Transaction, REVIEW_THRESHOLD};

use super::{load_dataset, transaction_table};

pub fn run(data: Option<&str>) -> Result<()> {
    let (txns, _) = load_dataset(data)?;
    let flagged: Vec<&Transaction> = txns.iter().filter(|t| t.needs_review()).collect();
    if flagged.is_empty() {
        println!("{}", "Nothing to review.".green());
        return Ok(());
    }
    println!(
        "{} transactions below {REVIEW_THRESHOLD}% confidence\n{}",
        flagged.len(),
        transaction_table(&flagged)
    );
    Ok(())
}
