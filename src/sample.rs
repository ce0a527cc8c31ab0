use chrono::{Duration, NaiveDate};

use crate::ledger::transaction_id;
use crate::models::Transaction;

struct SampleTxn {
    /// Days before "today".
    days_ago: i64,
    description: &'static str,
    amount: f64,
    category: &'static str,
    confidence: u8,
    account: &'static str,
    merchant: Option<&'static str>,
}

const SAMPLES: &[SampleTxn] = &[
    SampleTxn { days_ago: 0, description: "Whole Foods Market", amount: -87.32, category: "Food & Dining", confidence: 95, account: "Chase Checking", merchant: Some("Whole Foods") },
    SampleTxn { days_ago: 1, description: "Payroll Deposit - ACME Corp", amount: 4250.00, category: "Income", confidence: 99, account: "Chase Checking", merchant: Some("ACME Corp") },
    SampleTxn { days_ago: 1, description: "Netflix Subscription", amount: -15.99, category: "Entertainment", confidence: 98, account: "Amex Gold", merchant: Some("Netflix") },
    SampleTxn { days_ago: 2, description: "Shell Gas Station", amount: -45.20, category: "Transportation", confidence: 92, account: "Amex Gold", merchant: Some("Shell") },
    SampleTxn { days_ago: 3, description: "Amazon Purchase", amount: -129.99, category: "Shopping", confidence: 85, account: "Amex Gold", merchant: Some("Amazon") },
    SampleTxn { days_ago: 4, description: "Starbucks Coffee", amount: -6.45, category: "Food & Dining", confidence: 97, account: "Amex Gold", merchant: Some("Starbucks") },
    SampleTxn { days_ago: 5, description: "Monthly Rent", amount: -2100.00, category: "Housing", confidence: 99, account: "Chase Checking", merchant: None },
    SampleTxn { days_ago: 6, description: "PG&E Utility Bill", amount: -142.18, category: "Utilities", confidence: 94, account: "Chase Checking", merchant: Some("PG&E") },
    SampleTxn { days_ago: 8, description: "Uber Ride", amount: -23.50, category: "Transportation", confidence: 88, account: "Amex Gold", merchant: Some("Uber") },
    SampleTxn { days_ago: 10, description: "Freelance Payment", amount: 850.00, category: "Income", confidence: 80, account: "Chase Checking", merchant: Some("Upwork") },
    SampleTxn { days_ago: 12, description: "Chipotle Mexican Grill", amount: -14.75, category: "Food & Dining", confidence: 96, account: "Amex Gold", merchant: Some("Chipotle") },
    SampleTxn { days_ago: 15, description: "Target Store", amount: -64.10, category: "Shopping", confidence: 91, account: "Amex Gold", merchant: Some("Target") },
    SampleTxn { days_ago: 18, description: "AMC Theatres", amount: -32.00, category: "Entertainment", confidence: 93, account: "Amex Gold", merchant: Some("AMC Theatres") },
    SampleTxn { days_ago: 33, description: "Whole Foods Market", amount: -102.44, category: "Food & Dining", confidence: 95, account: "Chase Checking", merchant: Some("Whole Foods") },
    SampleTxn { days_ago: 35, description: "Monthly Rent", amount: -2100.00, category: "Housing", confidence: 99, account: "Chase Checking", merchant: None },
    SampleTxn { days_ago: 38, description: "Comcast Internet", amount: -79.99, category: "Utilities", confidence: 90, account: "Chase Checking", merchant: Some("Comcast") },
    SampleTxn { days_ago: 40, description: "Spotify Premium", amount: -10.99, category: "Entertainment", confidence: 98, account: "Amex Gold", merchant: Some("Spotify") },
    SampleTxn { days_ago: 45, description: "Payroll Deposit - ACME Corp", amount: 4250.00, category: "Income", confidence: 99, account: "Chase Checking", merchant: Some("ACME Corp") },
    SampleTxn { days_ago: 47, description: "Venmo Transfer", amount: -60.00, category: "Uncategorized", confidence: 62, account: "Chase Checking", merchant: Some("Venmo") },
];

/// Mock dataset dated relative to `today`, spanning this month and the
/// previous one.
pub fn transactions(today: NaiveDate) -> Vec<Transaction> {
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let date = today - Duration::days(s.days_ago);
            Transaction {
                id: transaction_id(&date.to_string(), s.description, s.amount, i),
                date,
                description: s.description.to_string(),
                amount: s.amount,
                category: s.category.to_string(),
                confidence: s.confidence,
                account: Some(s.account.to_string()),
                merchant: s.merchant.map(str::to_string),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::CATEGORY_KEYWORDS;
    use crate::summary::{build_search_summary_on, SearchSummary};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 20).unwrap()
    }

    #[test]
    fn test_ids_are_unique() {
        let txns = transactions(today());
        let mut ids: Vec<&str> = txns.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), txns.len());
    }

    #[test]
    fn test_covers_every_category_keyword() {
        let txns = transactions(today());
        for kw in CATEGORY_KEYWORDS {
            assert!(
                txns.iter().any(|t| t.category.to_lowercase().contains(kw)),
                "no sample for {kw}"
            );
        }
    }

    #[test]
    fn test_has_review_items() {
        assert!(transactions(today()).iter().any(|t| t.needs_review()));
    }

    #[test]
    fn test_comparison_has_both_months() {
        let txns = transactions(today());
        let Some(SearchSummary::Comparison(c)) = build_search_summary_on("compare last month", &txns, today())
        else {
            panic!("expected comparison summary");
        };
        assert!(c.current_total > 0.0);
        assert!(c.previous_total > 0.0);
    }
}
