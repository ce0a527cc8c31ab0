use std::collections::BTreeSet;

use anyhow::{bail, Result};
use chrono::Local;

use ledgerlens::filters::{AmountRange, DateRange, FilterPatch, FilterState, AMOUNT_MAX, AMOUNT_MIN};
use ledgerlens::fmt::money;
use ledgerlens::transfer::parse_date;

use super::{load_dataset, transaction_table};

pub struct SearchArgs {
    pub query: Option<String>,
    pub range: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub categories: Vec<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

fn date_range(args: &SearchArgs) -> Result<Option<DateRange>> {
    match (args.from_date.as_deref(), args.to_date.as_deref()) {
        (Some(from), Some(to)) => {
            let (Some(from), Some(to)) = (parse_date(from), parse_date(to)) else {
                bail!("--from and --to must be dates like 2025-01-31");
            };
            if from > to {
                bail!("--from must not be after --to");
            }
            Ok(Some(DateRange::Custom { from, to }))
        }
        (Some(_), None) => bail!("--from requires --to (both date boundaries must be specified)"),
        (None, Some(_)) => bail!("--to requires --from (both date boundaries must be specified)"),
        (None, None) => Ok(args.range.as_deref().map(str::parse::<DateRange>).transpose()?),
    }
}

fn amount_range(args: &SearchArgs) -> Result<Option<AmountRange>> {
    if args.min.is_none() && args.max.is_none() {
        return Ok(None);
    }
    let range = AmountRange {
        min: args.min.unwrap_or(AMOUNT_MIN),
        max: args.max.unwrap_or(AMOUNT_MAX),
    };
    if range.min > range.max {
        bail!("--min must not exceed --max");
    }
    Ok(Some(range))
}

pub fn run(data: Option<&str>, args: SearchArgs) -> Result<()> {
    let (txns, _) = load_dataset(data)?;

    let mut state = FilterState::new();
    state.set_filters(FilterPatch {
        date_range: date_range(&args)?,
        categories: if args.categories.is_empty() {
            None
        } else {
            Some(args.categories.iter().cloned().collect::<BTreeSet<_>>())
        },
        amount_range: amount_range(&args)?,
    });
    if let Some(q) = &args.query {
        state.set_query(q.clone());
    }

    let rows = state.visible(&txns, Local::now().date_naive());
    if rows.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }
    let total: f64 = rows.iter().map(|t| t.amount).sum();
    println!(
        "{} transactions ({}), net {}\n{}",
        rows.len(),
        state.filters().date_range,
        money(total),
        transaction_table(&rows)
    );
    Ok(())
}
