//! In-memory transaction store.
//!
//! Every mutation builds a new collection and swaps it in whole; nothing is
//! edited in place and nothing is persisted.

use sha2::{Digest, Sha256};

use crate::categorizer::{categorize, default_rules, Rule};
use crate::error::{LensError, Result};
use crate::models::{NewTransaction, SplitPart, Transaction};

/// Split parts may differ from the original amount by at most half a cent.
const SPLIT_TOLERANCE: f64 = 0.005;

/// Stable id derived from the entry's contents and a sequence number.
pub fn transaction_id(date: &str, description: &str, amount: f64, seq: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{date}|{description}|{amount:.2}|{seq}"));
    let digest = hex::encode(hasher.finalize());
    format!("txn-{}", &digest[..12])
}

pub struct Ledger {
    transactions: Vec<Transaction>,
    rules: Vec<Rule>,
    seq: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Ledger {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self::with_rules(transactions, default_rules())
    }

    pub fn with_rules(transactions: Vec<Transaction>, rules: Vec<Rule>) -> Self {
        let seq = transactions.len();
        Self {
            transactions,
            rules,
            seq,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn needs_review(&self) -> Vec<&Transaction> {
        self.transactions.iter().filter(|t| t.needs_review()).collect()
    }

    pub fn replace_all(&mut self, transactions: Vec<Transaction>) {
        log::info!("replacing {} transactions with {}", self.len(), transactions.len());
        self.transactions = transactions;
    }

    fn next_id(&mut self, date: &str, description: &str, amount: f64) -> String {
        self.seq += 1;
        transaction_id(date, description, amount, self.seq)
    }

    /// Turn a draft into a transaction, running the categorizer when no
    /// category was given. A user-chosen category is fully confident.
    pub fn materialize(&mut self, draft: NewTransaction) -> Transaction {
        let id = self.next_id(&draft.date.to_string(), &draft.description, draft.amount);
        let (category, confidence, guessed_merchant) = match draft.category {
            Some(c) => (c, 100, None),
            None => {
                let hit = categorize(&draft.description, &self.rules);
                (hit.category, hit.confidence, hit.merchant)
            }
        };
        Transaction {
            id,
            date: draft.date,
            description: draft.description,
            amount: draft.amount,
            category,
            confidence,
            account: draft.account,
            merchant: draft.merchant.or(guessed_merchant),
        }
    }

    pub fn add(&mut self, draft: NewTransaction) -> &Transaction {
        let txn = self.materialize(draft);
        log::info!("adding {} ({})", txn.id, txn.description);
        let mut next = self.transactions.clone();
        next.push(txn);
        self.transactions = next;
        &self.transactions[self.transactions.len() - 1]
    }

    /// Append a batch, e.g. from an import.
    pub fn extend(&mut self, drafts: Vec<NewTransaction>) -> usize {
        let mut next = self.transactions.clone();
        for draft in drafts {
            next.push(self.materialize(draft));
        }
        let added = next.len() - self.transactions.len();
        self.transactions = next;
        added
    }

    /// Replace the entry with `id`. The stored id is kept.
    pub fn update(&mut self, id: &str, replacement: Transaction) -> Result<()> {
        if self.get(id).is_none() {
            return Err(LensError::UnknownTransaction(id.to_string()));
        }
        self.transactions = self
            .transactions
            .iter()
            .map(|t| {
                if t.id == id {
                    Transaction {
                        id: t.id.clone(),
                        ..replacement.clone()
                    }
                } else {
                    t.clone()
                }
            })
            .collect();
        Ok(())
    }

    /// Replace one transaction with several, in place. Returns the new ids.
    pub fn split(&mut self, id: &str, parts: &[SplitPart]) -> Result<Vec<String>> {
        let original = self
            .get(id)
            .cloned()
            .ok_or_else(|| LensError::UnknownTransaction(id.to_string()))?;
        if parts.is_empty() {
            return Err(LensError::EmptySplit);
        }
        let actual: f64 = parts.iter().map(|p| p.amount).sum();
        if (actual - original.amount).abs() > SPLIT_TOLERANCE {
            return Err(LensError::SplitMismatch {
                expected: original.amount,
                actual,
            });
        }

        let n = parts.len();
        let pieces: Vec<Transaction> = parts
            .iter()
            .enumerate()
            .map(|(i, part)| {
                let description = part
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("{} ({}/{n})", original.description, i + 1));
                Transaction {
                    id: self.next_id(&original.date.to_string(), &description, part.amount),
                    description,
                    amount: part.amount,
                    category: part.category.clone(),
                    confidence: 100,
                    ..original.clone()
                }
            })
            .collect();
        let ids = pieces.iter().map(|t| t.id.clone()).collect();

        let mut next = Vec::with_capacity(self.transactions.len() + n - 1);
        for t in &self.transactions {
            if t.id == id {
                next.extend(pieces.iter().cloned());
            } else {
                next.push(t.clone());
            }
        }
        log::info!("split {id} into {n} parts");
        self.transactions = next;
        Ok(ids)
    }

    /// Bulk re-categorize. A manual category counts as reviewed.
    pub fn set_category(&mut self, ids: &[&str], category: &str) -> usize {
        let mut changed = 0;
        self.transactions = self
            .transactions
            .iter()
            .map(|t| {
                if ids.contains(&t.id.as_str()) {
                    changed += 1;
                    Transaction {
                        category: category.to_string(),
                        confidence: 100,
                        ..t.clone()
                    }
                } else {
                    t.clone()
                }
            })
            .collect();
        log::info!("set category {category:?} on {changed} transactions");
        changed
    }

    pub fn delete(&mut self, ids: &[&str]) -> usize {
        let before = self.transactions.len();
        self.transactions = self
            .transactions
            .iter()
            .filter(|t| !ids.contains(&t.id.as_str()))
            .cloned()
            .collect();
        let removed = before - self.transactions.len();
        log::info!("deleted {removed} transactions");
        removed
    }
}
