//! Capability roles
//!
//! Roles are small traits a client implements selectively instead of a base
//! type chain. A client can be a [`Source`] and [`Internal`] at once.
//!
//! - [`Source`]: may start a pipeline
//! - [`Sink`]: may end a pipeline
//! - [`Intermediate`]: may sit in the middle (identity by default)
//! - [`Internal`]: may change client state outside the pipeline

use crate::error::Result;
use crate::types::{Record, RecordStream};
use async_trait::async_trait;
use futures::StreamExt;
use std::ops::{Deref, DerefMut};
use tracing::debug;

// ============================================================================
// Roles
// ============================================================================

/// A pipeline start: produces a lazy stream of records
pub trait Source {
    /// Stream every record this source knows how to produce
    fn records(&self) -> RecordStream<'_>;
}

/// What a sink did with one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOutcome {
    /// Record was stored
    Written,
    /// Record was already present
    Duplicate,
    /// Record was not usable by this sink
    Skipped,
}

/// A pipeline end
#[async_trait]
pub trait Sink: Send {
    /// Accept one record
    async fn write(&mut self, record: &Record) -> Result<SinkOutcome>;

    /// Flush buffered output
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A pipeline stage between source and sink
pub trait Intermediate {
    /// Transform a record. Identity unless overridden.
    fn pass_through(&self, data: Record) -> Record {
        data
    }
}

/// Identity stage
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Intermediate for Identity {}

/// Identity pass-through as a free function
pub fn pass_through<T>(data: T) -> T {
    data
}

/// Operations that change client state outside a pipeline
pub trait Internal {
    /// Acquire resources. Calling it twice is a no-op.
    fn connect(&mut self) -> Result<()>;

    /// Release resources. Safe when not connected.
    fn disconnect(&mut self);

    /// Whether resources are currently held
    fn is_connected(&self) -> bool;

    /// Connect and return a guard that disconnects when dropped
    fn scoped(&mut self) -> Result<Connected<'_, Self>>
    where
        Self: Sized,
    {
        connected(self)
    }
}

// ============================================================================
// Scoped connection
// ============================================================================

/// Connected client that is disconnected when the guard goes out of scope.
///
/// Abandoning a record stream early does not touch the session, so any
/// client usage should happen through this guard.
pub struct Connected<'a, C: Internal + ?Sized> {
    client: &'a mut C,
}

/// Connect a client and tie its disconnect to the returned guard
pub fn connected<C: Internal + ?Sized>(client: &mut C) -> Result<Connected<'_, C>> {
    client.connect()?;
    Ok(Connected { client })
}

impl<C: Internal + ?Sized> Deref for Connected<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.client
    }
}

impl<C: Internal + ?Sized> DerefMut for Connected<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.client
    }
}

impl<C: Internal + ?Sized> Drop for Connected<'_, C> {
    fn drop(&mut self) {
        self.client.disconnect();
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Counters from one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Records pulled from the source
    pub read: usize,
    /// Records the sink stored
    pub written: usize,
    /// Records the sink already had
    pub duplicates: usize,
    /// Records the sink could not use
    pub skipped: usize,
}

/// Drain a record stream through a stage into a sink.
///
/// With a `limit`, pulling stops once that many records were read and the
/// stream is dropped without requesting further pages.
pub async fn run_pipeline<I, K>(
    mut records: RecordStream<'_>,
    stage: &I,
    sink: &mut K,
    limit: Option<usize>,
) -> Result<PipelineStats>
where
    I: Intermediate + ?Sized,
    K: Sink + ?Sized,
{
    let mut stats = PipelineStats::default();

    while limit.map_or(true, |max| stats.read < max) {
        let Some(record) = records.next().await else {
            break;
        };
        let record = stage.pass_through(record?);
        stats.read += 1;

        match sink.write(&record).await? {
            SinkOutcome::Written => stats.written += 1,
            SinkOutcome::Duplicate => stats.duplicates += 1,
            SinkOutcome::Skipped => stats.skipped += 1,
        }
    }

    sink.flush().await?;
    debug!(?stats, "Pipeline finished");
    Ok(stats)
}
