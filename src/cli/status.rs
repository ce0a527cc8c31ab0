use anyhow::Result;
use chrono::Local;

use ledgerlens::filters::DateRange;
use ledgerlens::fmt::money;
use ledgerlens::settings::{load_settings, settings_path};

use super::load_dataset;

pub fn run(data: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let (txns, source) = load_dataset(data)?;
    let today = Local::now().date_naive();

    println!("User:       {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Settings:   {}", settings_path().display());
    println!("Exports:    {}", settings.export_dir);
    println!("Dataset:    {source}");

    let this_month = txns.iter().filter(|t| DateRange::Month.contains(t.date, today)).count();
    let review = txns.iter().filter(|t| t.needs_review()).count();
    let income: f64 = txns.iter().filter(|t| t.is_income()).map(|t| t.amount).sum();
    let spent: f64 = txns.iter().filter(|t| t.is_expense()).map(|t| t.amount.abs()).sum();

    println!();
    println!("Transactions:  {}", txns.len());
    println!("This month:    {this_month}");
    println!("Needs review:  {review}");
    println!("Income:        {}", money(income));
    println!("Spending:      {}", money(spent));
    Ok(())
}
