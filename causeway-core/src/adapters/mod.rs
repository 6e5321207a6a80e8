//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the RecordStore port
//! - An in-memory store for tests and ephemeral runs

pub mod duckdb;
pub mod memory;
