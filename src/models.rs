use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Below this categorization confidence a transaction needs manual review.
pub const REVIEW_THRESHOLD: u8 = 90;
/// Confidence is a percentage.
pub const MAX_CONFIDENCE: u8 = 100;

/// A single ledger entry. Negative amounts are outflows, positive are inflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: String,
    #[serde(default = "default_confidence")]
    pub confidence: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
}

fn default_confidence() -> u8 {
    100
}

impl Transaction {
    pub fn needs_review(&self) -> bool {
        self.confidence < REVIEW_THRESHOLD
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }
}

/// A transaction before it has been given an id by the store.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    /// `None` runs the categorizer.
    pub category: Option<String>,
    pub account: Option<String>,
    pub merchant: Option<String>,
}

/// One piece of a split transaction.
#[derive(Debug, Clone)]
pub struct SplitPart {
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
}
