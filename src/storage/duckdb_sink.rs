//! DuckDB-backed observation sink

use crate::error::{Error, Result};
use crate::roles::{Sink, SinkOutcome};
use crate::types::Record;
use crate::worldbank::Observation;
use async_trait::async_trait;
use chrono::Utc;
use duckdb::{params, Connection};
use std::path::Path;
use tracing::{debug, warn};

const SCHEMA: &str = "
CREATE SEQUENCE IF NOT EXISTS raw_indicator_data_id_seq;
CREATE TABLE IF NOT EXISTS raw_indicator_data (
    id BIGINT PRIMARY KEY DEFAULT nextval('raw_indicator_data_id_seq'),
    indicator_id VARCHAR NOT NULL,
    country_id VARCHAR NOT NULL,
    year INTEGER NOT NULL,
    value VARCHAR,
    api_response VARCHAR NOT NULL,
    downloaded_at TIMESTAMP NOT NULL,
    CONSTRAINT uq_raw_data UNIQUE (indicator_id, country_id, year)
);
";

/// Sink storing raw observations in a DuckDB database
pub struct DuckDbSink {
    conn: Connection,
    location: String,
}

impl DuckDbSink {
    /// Open (or create) a database file and ensure the schema exists
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            Error::storage(format!("Failed to open database {}: {e}", path.display()))
        })?;
        Self::with_connection(conn, path.display().to_string())
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage(format!("Failed to create DuckDB connection: {e}")))?;
        Self::with_connection(conn, ":memory:".to_string())
    }

    fn with_connection(conn: Connection, location: String) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::storage(format!("Failed to create schema: {e}")))?;
        debug!(%location, "Observation store ready");
        Ok(Self { conn, location })
    }

    /// Store one observation unless its key is already present
    pub fn insert(&self, observation: &Observation) -> Result<SinkOutcome> {
        if self.contains(&observation.indicator_id, &observation.country_id, observation.year)? {
            return Ok(SinkOutcome::Duplicate);
        }

        let raw = serde_json::to_string(&observation.raw)?;
        let downloaded_at = Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string();
        self.conn.execute(
            "INSERT INTO raw_indicator_data
                 (indicator_id, country_id, year, value, api_response, downloaded_at)
             VALUES (?, ?, ?, ?, ?, CAST(? AS TIMESTAMP))",
            params![
                observation.indicator_id,
                observation.country_id,
                observation.year,
                observation.value,
                raw,
                downloaded_at
            ],
        )?;
        Ok(SinkOutcome::Written)
    }

    /// Whether an observation with this key is stored
    pub fn contains(&self, indicator_id: &str, country_id: &str, year: i32) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM raw_indicator_data
             WHERE indicator_id = ? AND country_id = ? AND year = ?",
            params![indicator_id, country_id, year],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Stored value for a key; the outer `None` means no such row
    pub fn value_of(
        &self,
        indicator_id: &str,
        country_id: &str,
        year: i32,
    ) -> Result<Option<Option<String>>> {
        let mut stmt = self.conn.prepare(
            "SELECT value FROM raw_indicator_data
             WHERE indicator_id = ? AND country_id = ? AND year = ?",
        )?;
        let mut rows = stmt.query(params![indicator_id, country_id, year])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Number of stored observations
    pub fn count(&self) -> Result<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM raw_indicator_data", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Where the database lives
    pub fn location(&self) -> &str {
        &self.location
    }
}

#[async_trait]
impl Sink for DuckDbSink {
    async fn write(&mut self, record: &Record) -> Result<SinkOutcome> {
        let Some(observation) = Observation::from_record(record) else {
            warn!("Skipping record without indicator, country or year");
            return Ok(SinkOutcome::Skipped);
        };
        self.insert(&observation)
    }
}

impl std::fmt::Debug for DuckDbSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbSink")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
