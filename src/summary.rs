//! Aggregates behind natural-language queries.
//!
//! [`build_search_summary`] classifies a query and scans the full
//! transaction list for the matched intent. Structured filters are not
//! consulted here; see [`crate::filters`].

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

use crate::fmt::{money, percent, safe_avg, share};
use crate::intent::{classify_intent, Intent};
use crate::models::Transaction;

/// Period label for spending, income and category summaries. The scan is
/// not actually limited to 30 days.
pub const RECENT_PERIOD: &str = "Last 30 days";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSummary {
    pub total: f64,
    pub transaction_count: usize,
    pub category_count: usize,
    pub average: f64,
    pub top_category: Option<CategoryTotal>,
    /// Per-category spend, largest first.
    pub breakdown: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeSummary {
    pub total: f64,
    pub deposit_count: usize,
    pub largest: f64,
    pub average: f64,
    pub source_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub keyword: String,
    pub total: f64,
    pub transaction_count: usize,
    pub average: f64,
    pub largest: f64,
    pub merchant_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantSummary {
    pub merchant: String,
    pub total: f64,
    pub visit_count: usize,
    pub average: f64,
    pub dominant_category: Option<String>,
    pub last_visit: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub current_label: String,
    pub previous_label: String,
    pub current_total: f64,
    pub previous_total: f64,
    /// `None` when there was no spend in the previous month.
    pub change_pct: Option<f64>,
}

impl ComparisonSummary {
    pub fn direction(&self) -> &'static str {
        match self.change_pct {
            Some(c) if c < 0.0 => "decrease",
            _ => "increase",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub average_daily: f64,
    pub active_days: usize,
    pub total: f64,
    pub busiest_day: Option<(NaiveDate, f64)>,
}

/// Result of a recognised natural-language query, one variant per intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchSummary {
    Spending(SpendingSummary),
    Income(IncomeSummary),
    Category(CategorySummary),
    Merchant(MerchantSummary),
    Comparison(ComparisonSummary),
    Trend(TrendSummary),
}

pub fn build_search_summary(query: &str, transactions: &[Transaction]) -> Option<SearchSummary> {
    build_search_summary_on(query, transactions, Local::now().date_naive())
}

/// Same as [`build_search_summary`] with an explicit "today" for the
/// month comparison.
pub fn build_search_summary_on(
    query: &str,
    transactions: &[Transaction],
    today: NaiveDate,
) -> Option<SearchSummary> {
    let summary = match classify_intent(query, transactions)? {
        Intent::Spending => SearchSummary::Spending(spending(transactions)),
        Intent::Income => SearchSummary::Income(income(transactions)),
        Intent::Category(kw) => SearchSummary::Category(category(kw, transactions)),
        Intent::Merchant(name) => SearchSummary::Merchant(merchant(&name, transactions)),
        Intent::Comparison => SearchSummary::Comparison(comparison(transactions, today)),
        Intent::Trend => SearchSummary::Trend(trend(transactions)),
    };
    Some(summary)
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

fn expenses(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(|t| t.is_expense())
}

fn distinct_merchants<'a>(txns: impl Iterator<Item = &'a Transaction>) -> usize {
    txns.filter_map(|t| t.merchant.as_deref())
        .collect::<HashSet<_>>()
        .len()
}

fn spending(transactions: &[Transaction]) -> SpendingSummary {
    // Insertion-ordered so ties go to the first category seen.
    let mut breakdown: Vec<CategoryTotal> = Vec::new();
    let mut total = 0.0;
    let mut count = 0;
    for t in expenses(transactions) {
        let amount = t.amount.abs();
        total += amount;
        count += 1;
        match breakdown.iter_mut().find(|c| c.name == t.category) {
            Some(c) => c.amount += amount,
            None => breakdown.push(CategoryTotal {
                name: t.category.clone(),
                amount,
            }),
        }
    }

    let top_category = breakdown
        .iter()
        .fold(None::<&CategoryTotal>, |best, c| match best {
            Some(b) if b.amount >= c.amount => Some(b),
            _ => Some(c),
        })
        .cloned();
    breakdown.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    SpendingSummary {
        total,
        transaction_count: count,
        category_count: breakdown.len(),
        average: safe_avg(total, count),
        top_category,
        breakdown,
    }
}

fn income(transactions: &[Transaction]) -> IncomeSummary {
    let deposits: Vec<&Transaction> = transactions.iter().filter(|t| t.is_income()).collect();
    let total: f64 = deposits.iter().map(|t| t.amount).sum();
    let largest = deposits.iter().map(|t| t.amount).fold(0.0, f64::max);
    IncomeSummary {
        total,
        deposit_count: deposits.len(),
        largest,
        average: safe_avg(total, deposits.len()),
        source_count: distinct_merchants(deposits.iter().copied()),
    }
}

fn category(keyword: &str, transactions: &[Transaction]) -> CategorySummary {
    let matching: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.category.to_lowercase().contains(keyword))
        .collect();
    let spent: Vec<f64> = matching
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount.abs())
        .collect();
    let total: f64 = spent.iter().sum();
    CategorySummary {
        keyword: keyword.to_string(),
        total,
        transaction_count: matching.len(),
        average: safe_avg(total, matching.len()),
        largest: spent.iter().copied().fold(0.0, f64::max),
        merchant_count: distinct_merchants(matching.iter().copied()),
    }
}

fn merchant(name: &str, transactions: &[Transaction]) -> MerchantSummary {
    let lower = name.to_lowercase();
    let visits: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.merchant.as_deref().map(str::to_lowercase).as_deref() == Some(lower.as_str()))
        .collect();
    let total: f64 = visits
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount.abs())
        .sum();

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for t in &visits {
        match counts.iter_mut().find(|(c, _)| *c == t.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((t.category.as_str(), 1)),
        }
    }
    let dominant_category = counts
        .iter()
        .fold(None::<&(&str, usize)>, |best, c| match best {
            Some(b) if b.1 >= c.1 => Some(b),
            _ => Some(c),
        })
        .map(|(c, _)| c.to_string());

    MerchantSummary {
        merchant: name.to_string(),
        total,
        visit_count: visits.len(),
        average: safe_avg(total, visits.len()),
        dominant_category,
        last_visit: visits.iter().map(|t| t.date).max(),
    }
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}

fn comparison(transactions: &[Transaction], today: NaiveDate) -> ComparisonSummary {
    let current = (today.year(), today.month());
    let previous = previous_month(current.0, current.1);

    let spend_in = |(y, m): (i32, u32)| -> f64 {
        expenses(transactions)
            .filter(|t| t.date.year() == y && t.date.month() == m)
            .map(|t| t.amount.abs())
            .sum()
    };
    let current_total = spend_in(current);
    let previous_total = spend_in(previous);
    let change_pct = if previous_total != 0.0 {
        Some((current_total - previous_total) / previous_total * 100.0)
    } else {
        None
    };

    ComparisonSummary {
        current_label: month_label(current.0, current.1),
        previous_label: month_label(previous.0, previous.1),
        current_total,
        previous_total,
        change_pct,
    }
}

fn trend(transactions: &[Transaction]) -> TrendSummary {
    let mut by_day: HashMap<NaiveDate, f64> = HashMap::new();
    for t in expenses(transactions) {
        *by_day.entry(t.date).or_insert(0.0) += t.amount.abs();
    }
    let total: f64 = by_day.values().sum();
    let busiest_day = by_day
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(d, v)| (*d, *v));
    TrendSummary {
        average_daily: safe_avg(total, by_day.len()),
        active_days: by_day.len(),
        total,
        busiest_day,
    }
}

// ---------------------------------------------------------------------------
// Display card
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    Spending,
    Income,
    Category,
    Trend,
    Comparison,
    General,
}

/// Flattened, display-ready form of a [`SearchSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub kind: SummaryKind,
    pub title: String,
    pub value: String,
    pub change: Option<f64>,
    pub period: String,
    pub details: String,
    pub insights: Vec<String>,
    pub related: Vec<(String, String)>,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl SearchSummary {
    pub fn kind(&self) -> SummaryKind {
        match self {
            Self::Spending(_) => SummaryKind::Spending,
            Self::Income(_) => SummaryKind::Income,
            Self::Category(_) => SummaryKind::Category,
            Self::Merchant(_) => SummaryKind::General,
            Self::Comparison(_) => SummaryKind::Comparison,
            Self::Trend(_) => SummaryKind::Trend,
        }
    }

    pub fn card(&self) -> SummaryCard {
        let kind = self.kind();
        match self {
            Self::Spending(s) => {
                let mut insights = Vec::new();
                if let Some(top) = &s.top_category {
                    insights.push(format!(
                        "{} accounts for {} of your spending",
                        top.name,
                        percent(share(top.amount, s.total))
                    ));
                }
                insights.push(format!("{} transactions recorded", s.transaction_count));
                insights.push("Based on your recent activity".to_string());
                SummaryCard {
                    kind,
                    title: "Total Spending".to_string(),
                    value: money(s.total),
                    change: None,
                    period: RECENT_PERIOD.to_string(),
                    details: format!(
                        "{} transactions across {} categories",
                        s.transaction_count, s.category_count
                    ),
                    insights,
                    related: vec![
                        ("Average per transaction".to_string(), money(s.average)),
                        (
                            "Top category".to_string(),
                            s.top_category
                                .as_ref()
                                .map(|c| format!("{} ({})", c.name, money(c.amount)))
                                .unwrap_or_else(|| "None".to_string()),
                        ),
                    ],
                }
            }
            Self::Income(s) => SummaryCard {
                kind,
                title: "Total Income".to_string(),
                value: money(s.total),
                change: None,
                period: RECENT_PERIOD.to_string(),
                details: format!("{} deposits received", s.deposit_count),
                insights: vec![
                    format!("Largest deposit: {}", money(s.largest)),
                    format!("{} income sources", s.source_count),
                ],
                related: vec![
                    ("Average deposit".to_string(), money(s.average)),
                    ("Largest deposit".to_string(), money(s.largest)),
                ],
            },
            Self::Category(s) => SummaryCard {
                kind,
                title: format!("{} Spending", capitalize(&s.keyword)),
                value: money(s.total),
                change: None,
                period: RECENT_PERIOD.to_string(),
                details: format!(
                    "{} transactions at {} merchants",
                    s.transaction_count, s.merchant_count
                ),
                insights: vec![format!("Largest expense: {}", money(s.largest))],
                related: vec![
                    ("Average".to_string(), money(s.average)),
                    ("Transactions".to_string(), s.transaction_count.to_string()),
                ],
            },
            Self::Merchant(s) => SummaryCard {
                kind,
                title: format!("{} Activity", s.merchant),
                value: money(s.total),
                change: None,
                period: "All time".to_string(),
                details: format!("{} visits", s.visit_count),
                insights: s
                    .last_visit
                    .map(|d| vec![format!("Most recent visit on {d}")])
                    .unwrap_or_default(),
                related: vec![
                    ("Average per visit".to_string(), money(s.average)),
                    (
                        "Category".to_string(),
                        s.dominant_category.clone().unwrap_or_else(|| "None".to_string()),
                    ),
                ],
            },
            Self::Comparison(s) => SummaryCard {
                kind,
                title: "Monthly Comparison".to_string(),
                value: money(s.current_total),
                change: s.change_pct,
                period: format!("{} vs {}", s.current_label, s.previous_label),
                details: match s.change_pct {
                    Some(c) => format!(
                        "{} {} compared to {}",
                        percent(c.abs()),
                        s.direction(),
                        s.previous_label
                    ),
                    None => format!("No spending recorded in {}", s.previous_label),
                },
                insights: Vec::new(),
                related: vec![
                    (s.current_label.clone(), money(s.current_total)),
                    (s.previous_label.clone(), money(s.previous_total)),
                ],
            },
            Self::Trend(s) => SummaryCard {
                kind,
                title: "Spending Trend".to_string(),
                value: money(s.average_daily),
                change: None,
                period: "Daily average".to_string(),
                details: format!("Spending recorded on {} days", s.active_days),
                insights: s
                    .busiest_day
                    .map(|(d, v)| vec![format!("Highest day: {d} with {}", money(v))])
                    .unwrap_or_default(),
                related: vec![("Total".to_string(), money(s.total))],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(date: NaiveDate, amount: f64, category: &str, merchant: Option<&str>) -> Transaction {
        Transaction {
            id: format!("{date}-{amount}"),
            date,
            description: "test".to_string(),
            amount,
            category: category.to_string(),
            confidence: 95,
            account: None,
            merchant: merchant.map(str::to_string),
        }
    }

    fn today() -> NaiveDate {
        day(2025, 6, 15)
    }

    fn scenario() -> Vec<Transaction> {
        vec![
            txn(day(2025, 6, 1), -87.32, "Food", Some("Whole Foods")),
            txn(day(2025, 6, 1), 4250.00, "Income", Some("Acme Corp")),
            txn(day(2025, 6, 2), -15.99, "Entertainment", Some("Netflix")),
        ]
    }

    #[test]
    fn test_end_to_end_spending() {
        let s = build_search_summary_on("how much did I spend", &scenario(), today()).unwrap();
        let SearchSummary::Spending(s) = s else {
            panic!("expected spending summary");
        };
        assert!(close(s.total, 103.31));
        assert_eq!(s.category_count, 2);
        assert_eq!(s.transaction_count, 2);
        let top = s.top_category.unwrap();
        assert_eq!(top.name, "Food");
        assert!(close(top.amount, 87.32));
    }

    #[test]
    fn test_spending_groups_by_category() {
        let txns = vec![
            txn(day(2025, 6, 1), -10.0, "Shopping", None),
            txn(day(2025, 6, 2), -30.0, "Food", None),
            txn(day(2025, 6, 3), -25.0, "Shopping", None),
        ];
        let Some(SearchSummary::Spending(s)) =
            build_search_summary_on("how much have I spent", &txns, today())
        else {
            panic!("expected spending summary");
        };
        assert_eq!(s.breakdown[0].name, "Shopping");
        assert!(close(s.breakdown[0].amount, 35.0));
        assert!(close(s.average, 65.0 / 3.0));
    }

    #[test]
    fn test_spending_empty() {
        let Some(SearchSummary::Spending(s)) =
            build_search_summary_on("how much did I spend", &[], today())
        else {
            panic!("expected spending summary");
        };
        assert_eq!(s.total, 0.0);
        assert_eq!(s.average, 0.0);
        assert!(s.top_category.is_none());
        let card = SearchSummary::Spending(s).card();
        assert_eq!(card.value, "$0.00");
    }

    #[test]
    fn test_income_totals() {
        let mut txns = scenario();
        txns.push(txn(day(2025, 6, 10), 300.0, "Income", Some("Side Gig")));
        let Some(SearchSummary::Income(s)) = build_search_summary_on("what was my income", &txns, today())
        else {
            panic!("expected income summary");
        };
        assert!(close(s.total, 4550.0));
        assert_eq!(s.deposit_count, 2);
        assert!(close(s.largest, 4250.0));
        assert!(close(s.average, 2275.0));
        assert_eq!(s.source_count, 2);
    }

    #[test]
    fn test_income_empty() {
        let Some(SearchSummary::Income(s)) = build_search_summary_on("how much have I earned", &[], today())
        else {
            panic!("expected income summary");
        };
        assert_eq!(s.total, 0.0);
        assert_eq!(s.largest, 0.0);
        assert_eq!(s.average, 0.0);
    }

    #[test]
    fn test_category_is_case_insensitive_substring() {
        let txns = vec![
            txn(day(2025, 6, 1), -20.0, "Food & Dining", Some("Chipotle")),
            txn(day(2025, 6, 2), -40.0, "FOOD", Some("Safeway")),
            txn(day(2025, 6, 3), -99.0, "Shopping", Some("Target")),
        ];
        let Some(SearchSummary::Category(s)) =
            build_search_summary_on("show me food purchases", &txns, today())
        else {
            panic!("expected category summary");
        };
        assert_eq!(s.keyword, "food");
        assert_eq!(s.transaction_count, 2);
        assert!(close(s.total, 60.0));
        assert!(close(s.largest, 40.0));
        assert_eq!(s.merchant_count, 2);
        assert_eq!(SearchSummary::Category(s).card().title, "Food Spending");
    }

    #[test]
    fn test_category_empty() {
        let Some(SearchSummary::Category(s)) =
            build_search_summary_on("show me housing costs", &scenario(), today())
        else {
            panic!("expected category summary");
        };
        assert_eq!(s.transaction_count, 0);
        assert_eq!(s.average, 0.0);
        assert_eq!(s.largest, 0.0);
    }

    #[test]
    fn test_merchant_true_mode_and_latest_date() {
        let txns = vec![
            txn(day(2025, 5, 2), -12.0, "Coffee", Some("Blue Bottle")),
            txn(day(2025, 6, 9), -8.0, "Snacks", Some("Blue Bottle")),
            txn(day(2025, 4, 20), -10.0, "Snacks", Some("blue bottle")),
        ];
        let Some(SearchSummary::Merchant(s)) =
            build_search_summary_on("show me blue bottle visits", &txns, today())
        else {
            panic!("expected merchant summary");
        };
        assert_eq!(s.visit_count, 3);
        assert!(close(s.total, 30.0));
        assert!(close(s.average, 10.0));
        assert_eq!(s.dominant_category.as_deref(), Some("Snacks"));
        assert_eq!(s.last_visit, Some(day(2025, 6, 9)));
        assert_eq!(SearchSummary::Merchant(s).kind(), SummaryKind::General);
    }

    #[test]
    fn test_comparison_month_over_month() {
        let txns = vec![
            txn(day(2025, 6, 3), -100.0, "Food", None),
            txn(day(2025, 6, 4), -50.0, "Food", None),
            txn(day(2025, 5, 20), -100.0, "Food", None),
            txn(day(2024, 6, 20), -500.0, "Food", None),
        ];
        let Some(SearchSummary::Comparison(s)) =
            build_search_summary_on("compare my months", &txns, today())
        else {
            panic!("expected comparison summary");
        };
        assert!(close(s.current_total, 150.0));
        assert!(close(s.previous_total, 100.0));
        assert!(close(s.change_pct.unwrap(), 50.0));
        assert_eq!(s.direction(), "increase");
        assert_eq!(s.current_label, "Jun 2025");
    }

    #[test]
    fn test_comparison_crosses_year_boundary() {
        let txns = vec![
            txn(day(2025, 1, 10), -50.0, "Food", None),
            txn(day(2024, 12, 10), -100.0, "Food", None),
            txn(day(2025, 12, 10), -999.0, "Food", None),
        ];
        let Some(SearchSummary::Comparison(s)) =
            build_search_summary_on("compare spending", &txns, day(2025, 1, 20))
        else {
            panic!("expected comparison summary");
        };
        assert!(close(s.previous_total, 100.0));
        assert!(close(s.change_pct.unwrap(), -50.0));
        assert_eq!(s.direction(), "decrease");
        assert_eq!(s.previous_label, "Dec 2024");
    }

    #[test]
    fn test_comparison_empty() {
        let Some(SearchSummary::Comparison(s)) =
            build_search_summary_on("compare months", &[], today())
        else {
            panic!("expected comparison summary");
        };
        assert_eq!(s.current_total, 0.0);
        assert!(s.change_pct.is_none());
        let card = SearchSummary::Comparison(s).card();
        assert!(card.details.starts_with("No spending recorded"));
    }

    #[test]
    fn test_trend_daily_average() {
        let txns = vec![
            txn(day(2025, 6, 1), -10.0, "Food", None),
            txn(day(2025, 6, 1), -20.0, "Food", None),
            txn(day(2025, 6, 2), -30.0, "Food", None),
            txn(day(2025, 6, 2), 500.0, "Income", None),
        ];
        let Some(SearchSummary::Trend(s)) =
            build_search_summary_on("what is my spending trend", &txns, today())
        else {
            panic!("expected trend summary");
        };
        assert_eq!(s.active_days, 2);
        assert!(close(s.average_daily, 30.0));
        assert_eq!(s.busiest_day, Some((day(2025, 6, 1), 30.0)));
    }

    #[test]
    fn test_trend_empty() {
        let Some(SearchSummary::Trend(s)) =
            build_search_summary_on("any spending habit", &[], today())
        else {
            panic!("expected trend summary");
        };
        assert_eq!(s.average_daily, 0.0);
        assert!(s.busiest_day.is_none());
    }

    #[test]
    fn test_unrecognised_query_returns_none() {
        assert!(build_search_summary_on("show me everything", &scenario(), today()).is_none());
    }

    #[test]
    fn test_idempotent() {
        let txns = scenario();
        let a = build_search_summary_on("how much did I spend", &txns, today());
        let b = build_search_summary_on("how much did I spend", &txns, today());
        assert_eq!(a, b);
    }

    #[test]
    fn test_spending_card() {
        let card = build_search_summary_on("how much did I spend", &scenario(), today())
            .unwrap()
            .card();
        assert_eq!(card.kind, SummaryKind::Spending);
        assert_eq!(card.value, "$103.31");
        assert_eq!(card.period, RECENT_PERIOD);
        assert_eq!(card.details, "2 transactions across 2 categories");
        assert_eq!(card.insights[0], "Food accounts for 84.5% of your spending");
    }

    #[test]
    fn test_summary_serializes_with_type_tag() {
        let s = build_search_summary_on("how much did I spend", &scenario(), today()).unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "spending");
        assert_eq!(json["category_count"], 2);
    }
}
