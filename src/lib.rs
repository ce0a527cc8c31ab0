//! Natural-language search and summaries over an in-memory list of
//! personal-finance transactions.

pub mod categorizer;
pub mod error;
pub mod filters;
pub mod fmt;
pub mod intent;
pub mod ledger;
pub mod models;
pub mod sample;
pub mod settings;
pub mod summary;
pub mod transfer;

pub use error::{LensError, Result};
pub use filters::{FilterPatch, FilterState, Filters};
pub use intent::{classify_intent, detect_natural_language_intent, Intent};
pub use ledger::Ledger;
pub use models::Transaction;
pub use summary::{build_search_summary, SearchSummary, SummaryCard};
