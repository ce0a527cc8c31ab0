//! Query intent detection.
//!
//! Everything here is plain lowercase substring containment: no stemming,
//! no fuzzy matching. Dispatch is first-match-wins in the order of
//! [`classify_intent`].

use crate::models::Transaction;

/// Phrases that mark a query as natural language rather than a text search.
pub const TRIGGER_PHRASES: &[&str] = &[
    "how much",
    "how many",
    "what did",
    "where did",
    "show me",
    "compare",
    "versus",
    " vs ",
    "trend",
    "pattern",
    "habit",
    "spent on",
    "spending",
    "income",
    "earned",
    "total",
    "average",
    "most",
    "least",
    "breakdown",
];

/// Queries this short are never natural language.
pub const MIN_QUERY_LEN: usize = 10;

/// Category words recognised by the category intent.
pub const CATEGORY_KEYWORDS: &[&str] = &[
    "food",
    "entertainment",
    "transportation",
    "shopping",
    "housing",
    "utilities",
];

const SPENDING_WORDS: &[&str] = &["spent", "spend"];
const INCOME_WORDS: &[&str] = &["income", "earned", "made"];
const COMPARISON_WORDS: &[&str] = &["compare", "vs", "versus"];
const TREND_WORDS: &[&str] = &["trend", "pattern", "habit"];

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Spending,
    Income,
    /// Matched keyword from [`CATEGORY_KEYWORDS`].
    Category(&'static str),
    /// Merchant name as it appears in the transaction list.
    Merchant(String),
    Comparison,
    Trend,
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

pub fn detect_natural_language_intent(query: &str) -> bool {
    if query.chars().count() <= MIN_QUERY_LEN {
        return false;
    }
    let q = query.to_lowercase();
    contains_any(&q, TRIGGER_PHRASES)
}

pub fn classify_intent(query: &str, transactions: &[Transaction]) -> Option<Intent> {
    let q = query.to_lowercase();

    let intent = if q.contains("how much") && contains_any(&q, SPENDING_WORDS) {
        Some(Intent::Spending)
    } else if contains_any(&q, INCOME_WORDS) {
        Some(Intent::Income)
    } else if let Some(kw) = CATEGORY_KEYWORDS.iter().find(|kw| q.contains(*kw)) {
        Some(Intent::Category(*kw))
    } else if let Some(merchant) = find_merchant(&q, transactions) {
        Some(Intent::Merchant(merchant))
    } else if contains_any(&q, COMPARISON_WORDS) {
        Some(Intent::Comparison)
    } else if contains_any(&q, TREND_WORDS) {
        Some(Intent::Trend)
    } else {
        None
    };

    log::debug!("query {query:?} classified as {intent:?}");
    intent
}

fn find_merchant(lower_query: &str, transactions: &[Transaction]) -> Option<String> {
    transactions
        .iter()
        .filter_map(|t| t.merchant.as_deref())
        .find(|m| {
            let m = m.trim().to_lowercase();
            !m.is_empty() && lower_query.contains(&m)
        })
        .map(str::to_string)
}
