//! Storage sinks
//!
//! Raw World Bank observations are persisted through DuckDB, keyed by
//! (indicator, country, year). A record already present under that key is
//! reported as a duplicate and left untouched. There is no transactional or
//! exactly-once guarantee across runs.

mod duckdb_sink;

pub use duckdb_sink::DuckDbSink;
