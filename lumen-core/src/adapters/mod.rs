//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB ledger-state database for the CoreStore port
//! - DuckDB indexed database for the HistoryStore port

pub mod core_db;
pub mod duckdb;
pub mod history_db;

pub use core_db::DuckDbCoreStore;
pub use history_db::DuckDbHistoryStore;
