//! postwatch-store: Append-only report history
//!
//! Owns the SQLite-backed history table and the latest-per-device
//! aggregation queries. Rows are immutable once inserted; the collector
//! assigns the observation timestamp and the insertion-order row id, and
//! "latest" is always derived by query, never stored.

pub mod error;
pub mod history;

pub use error::StoreError;
pub use history::{HistoryStore, NewReport};
