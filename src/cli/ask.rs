use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};

use ledgerlens::filters::{text_search, FilterState};
use ledgerlens::SummaryCard;

use super::{load_dataset, transaction_table};

pub fn run(data: Option<&str>, query: &[String], json: bool) -> Result<()> {
    let query = query.join(" ");
    let (txns, _) = load_dataset(data)?;

    let mut state = FilterState::new();
    state.set_query(query.clone());
    if let Some(summary) = state.refresh_summary(&txns, Local::now().date_naive()) {
        let card = summary.card();
        if json {
            println!("{}", serde_json::to_string_pretty(&card)?);
        } else {
            print_card(&card);
        }
        return Ok(());
    }

    let hits = text_search(&query, &txns);
    if hits.is_empty() {
        println!("No transactions match \"{query}\".");
    } else {
        println!("{} matching transactions\n{}", hits.len(), transaction_table(&hits));
    }
    Ok(())
}

fn print_card(card: &SummaryCard) {
    println!("{}", card.title.bold());
    println!("{}  {}", card.value.green().bold(), card.period.dimmed());
    if let Some(change) = card.change {
        let text = format!("{change:+.1}%");
        // more spending is bad news
        let text = if change > 0.0 { text.red() } else { text.green() };
        println!("{text}");
    }
    println!("{}", card.details);
    for insight in &card.insights {
        println!("  - {insight}");
    }
    if !card.related.is_empty() {
        let mut table = Table::new();
        for (label, value) in &card.related {
            table.add_row(vec![Cell::new(label), Cell::new(value)]);
        }
        println!("{table}");
    }
}
