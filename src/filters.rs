//! Search and filter state.
//!
//! The filter criteria here narrow transaction *lists*. They are not fed
//! into the natural-language summary, which always scans the whole list.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::LensError;
use crate::intent::detect_natural_language_intent;
use crate::models::Transaction;
use crate::summary::{build_search_summary_on, SearchSummary};

pub const AMOUNT_MIN: f64 = 0.0;
pub const AMOUNT_MAX: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "range")]
pub enum DateRange {
    #[default]
    All,
    Today,
    /// The last seven days, today included.
    Week,
    Month,
    Quarter,
    Year,
    Custom { from: NaiveDate, to: NaiveDate },
}

impl DateRange {
    pub fn token(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
            Self::Custom { .. } => "custom",
        }
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match *self {
            Self::All => true,
            Self::Today => date == today,
            Self::Week => date <= today && date > today - Duration::days(7),
            Self::Month => date.year() == today.year() && date.month() == today.month(),
            Self::Quarter => date.year() == today.year() && date.month0() / 3 == today.month0() / 3,
            Self::Year => date.year() == today.year(),
            Self::Custom { from, to } => date >= from && date <= to,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { from, to } => write!(f, "{from} to {to}"),
            other => f.write_str(other.token()),
        }
    }
}

/// Parses the fixed tokens. `custom` needs explicit bounds and is built
/// with [`DateRange::Custom`] directly.
impl FromStr for DateRange {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            other => Err(LensError::UnknownFormat(format!("date range '{other}'"))),
        }
    }
}

/// Bounds on the magnitude of an amount, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

impl Default for AmountRange {
    fn default() -> Self {
        Self {
            min: AMOUNT_MIN,
            max: AMOUNT_MAX,
        }
    }
}

impl AmountRange {
    pub fn contains(&self, amount: f64) -> bool {
        let a = amount.abs();
        a >= self.min && a <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Filters {
    pub date_range: DateRange,
    /// Empty means every category.
    pub categories: BTreeSet<String>,
    pub amount_range: AmountRange,
}

/// Partial update for [`FilterState::set_filters`]; `None` fields keep
/// their current value.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub date_range: Option<DateRange>,
    pub categories: Option<BTreeSet<String>>,
    pub amount_range: Option<AmountRange>,
}

/// Current query text, structured filters and the last computed summary.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    query: String,
    filters: Filters,
    summary: Option<SearchSummary>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn summary(&self) -> Option<&SearchSummary> {
        self.summary.as_ref()
    }

    /// Replace the query. The stored summary no longer matches it and is
    /// dropped until the next [`refresh_summary`](Self::refresh_summary).
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
        self.summary = None;
    }

    pub fn set_filters(&mut self, patch: FilterPatch) {
        if let Some(range) = patch.date_range {
            self.filters.date_range = range;
        }
        if let Some(categories) = patch.categories {
            self.filters.categories = categories;
        }
        if let Some(amounts) = patch.amount_range {
            self.filters.amount_range = amounts;
        }
        log::debug!("filters now {:?}", self.filters);
    }

    pub fn clear_filters(&mut self) {
        self.query.clear();
        self.filters = Filters::default();
        self.summary = None;
    }

    /// Recompute the summary for the current query, keeping it only when
    /// the query reads as natural language.
    pub fn refresh_summary(
        &mut self,
        transactions: &[Transaction],
        today: NaiveDate,
    ) -> Option<&SearchSummary> {
        self.summary = if detect_natural_language_intent(&self.query) {
            build_search_summary_on(&self.query, transactions, today)
        } else {
            None
        };
        self.summary.as_ref()
    }

    /// Transactions passing the structured filters and, when the query is
    /// not natural language, the plain text search.
    pub fn visible<'a>(&self, transactions: &'a [Transaction], today: NaiveDate) -> Vec<&'a Transaction> {
        let filtered = apply_filters(transactions, &self.filters, today);
        if self.query.trim().is_empty() || detect_natural_language_intent(&self.query) {
            return filtered;
        }
        let needle = self.query.trim().to_lowercase();
        filtered
            .into_iter()
            .filter(|t| matches_text(t, &needle))
            .collect()
    }
}

pub fn apply_filters<'a>(
    transactions: &'a [Transaction],
    filters: &Filters,
    today: NaiveDate,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| filters.date_range.contains(t.date, today))
        .filter(|t| {
            filters.categories.is_empty()
                || filters
                    .categories
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&t.category))
        })
        .filter(|t| filters.amount_range.contains(t.amount))
        .collect()
}

fn matches_text(t: &Transaction, lower_needle: &str) -> bool {
    let fields = [
        Some(t.description.as_str()),
        Some(t.category.as_str()),
        t.merchant.as_deref(),
        t.account.as_deref(),
    ];
    fields
        .into_iter()
        .flatten()
        .any(|f| f.to_lowercase().contains(lower_needle))
}

/// Case-insensitive substring search, the fallback when no intent matches.
pub fn text_search<'a>(query: &str, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return transactions.iter().collect();
    }
    transactions
        .iter()
        .filter(|t| matches_text(t, &needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(id: &str, date: NaiveDate, amount: f64, category: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            date,
            description: format!("{category} purchase"),
            amount,
            category: category.to_string(),
            confidence: 95,
            account: Some("Checking".to_string()),
            merchant: Some(format!("{id} store")),
        }
    }

    fn today() -> NaiveDate {
        day(2025, 5, 14)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn("a", day(2025, 5, 14), -12.0, "Food"),
            txn("b", day(2025, 5, 9), -250.0, "Shopping"),
            txn("c", day(2025, 4, 2), -40.0, "Food"),
            txn("d", day(2025, 1, 20), 3000.0, "Income"),
            txn("e", day(2024, 12, 31), -15000.0, "Housing"),
        ]
    }

    fn ids(txns: &[&Transaction]) -> Vec<String> {
        txns.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_defaults() {
        let state = FilterState::new();
        assert_eq!(state.query(), "");
        assert_eq!(state.filters().date_range, DateRange::All);
        assert!(state.filters().categories.is_empty());
        assert_eq!(state.filters().amount_range, AmountRange { min: 0.0, max: 10_000.0 });
    }

    #[test]
    fn test_set_filters_merges() {
        let mut state = FilterState::new();
        state.set_filters(FilterPatch {
            categories: Some(BTreeSet::from(["Food".to_string()])),
            amount_range: Some(AmountRange { min: 10.0, max: 50.0 }),
            ..Default::default()
        });
        state.set_filters(FilterPatch {
            date_range: Some(DateRange::Month),
            ..Default::default()
        });
        let f = state.filters();
        assert_eq!(f.date_range, DateRange::Month);
        assert!(f.categories.contains("Food"));
        assert_eq!(f.amount_range.max, 50.0);
    }

    #[test]
    fn test_clear_filters_resets_everything() {
        let mut state = FilterState::new();
        state.set_query("how much did I spend");
        state.set_filters(FilterPatch {
            date_range: Some(DateRange::Year),
            categories: Some(BTreeSet::from(["Food".to_string()])),
            amount_range: Some(AmountRange { min: 5.0, max: 6.0 }),
        });
        state.refresh_summary(&sample(), today());
        assert!(state.summary().is_some());

        state.clear_filters();
        assert_eq!(state.query(), "");
        assert_eq!(state.filters(), &Filters::default());
        assert!(state.summary().is_none());
    }

    #[test]
    fn test_set_query_drops_stale_summary() {
        let mut state = FilterState::new();
        state.set_query("how much did I spend");
        state.refresh_summary(&sample(), today());
        state.set_query("coffee");
        assert!(state.summary().is_none());
    }

    #[test]
    fn test_refresh_summary_skips_plain_text() {
        let mut state = FilterState::new();
        state.set_query("food");
        assert!(state.refresh_summary(&sample(), today()).is_none());
    }

    #[test]
    fn test_summary_ignores_filters() {
        let mut state = FilterState::new();
        state.set_filters(FilterPatch {
            categories: Some(BTreeSet::from(["Food".to_string()])),
            ..Default::default()
        });
        state.set_query("how much did I spend");
        let Some(SearchSummary::Spending(s)) = state.refresh_summary(&sample(), today()) else {
            panic!("expected spending summary");
        };
        assert_eq!(s.category_count, 3);
    }

    #[test]
    fn test_date_ranges() {
        let t = today();
        assert!(DateRange::Today.contains(t, t));
        assert!(DateRange::Week.contains(day(2025, 5, 8), t));
        assert!(!DateRange::Week.contains(day(2025, 5, 7), t));
        assert!(DateRange::Month.contains(day(2025, 5, 1), t));
        assert!(!DateRange::Month.contains(day(2024, 5, 1), t));
        assert!(DateRange::Quarter.contains(day(2025, 4, 2), t));
        assert!(!DateRange::Quarter.contains(day(2025, 3, 31), t));
        assert!(DateRange::Year.contains(day(2025, 1, 1), t));
        let custom = DateRange::Custom { from: day(2025, 1, 1), to: day(2025, 1, 31) };
        assert!(custom.contains(day(2025, 1, 31), t));
        assert!(!custom.contains(day(2025, 2, 1), t));
    }

    #[test]
    fn test_date_range_tokens() {
        assert_eq!("Quarter".parse::<DateRange>().unwrap(), DateRange::Quarter);
        assert!("custom".parse::<DateRange>().is_err());
        assert_eq!(DateRange::Week.to_string(), "week");
    }

    #[test]
    fn test_apply_filters() {
        let txns = sample();
        let mut filters = Filters::default();
        assert_eq!(apply_filters(&txns, &filters, today()).len(), 4);

        filters.categories.insert("food".to_string());
        assert_eq!(ids(&apply_filters(&txns, &filters, today())), vec!["a", "c"]);

        filters.date_range = DateRange::Month;
        assert_eq!(ids(&apply_filters(&txns, &filters, today())), vec!["a"]);
    }

    #[test]
    fn test_amount_range_uses_magnitude() {
        let range = AmountRange { min: 100.0, max: 500.0 };
        assert!(range.contains(-250.0));
        assert!(range.contains(100.0));
        assert!(!range.contains(-12.0));
    }

    #[test]
    fn test_text_search() {
        let txns = sample();
        assert_eq!(ids(&text_search("SHOPPING", &txns)), vec!["b"]);
        assert_eq!(ids(&text_search("c store", &txns)), vec!["c"]);
        assert_eq!(text_search("checking", &txns).len(), 5);
        assert_eq!(text_search("  ", &txns).len(), 5);
    }

    #[test]
    fn test_visible_combines_filters_and_text() {
        let txns = sample();
        let mut state = FilterState::new();
        state.set_query("food");
        state.set_filters(FilterPatch {
            date_range: Some(DateRange::Year),
            ..Default::default()
        });
        assert_eq!(ids(&state.visible(&txns, today())), vec!["a", "c"]);
    }
}
