//! Persistence collaborator boundary.
//!
//! The pipeline never assumes a specific storage technology: persistence is a
//! trait the caller supplies. The persist stage hands over the record together
//! with the warnings gathered so far, and a failure is reported on that
//! record's outcome only.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::asset::AssetId;
use crate::telemetry::{TelemetryRecord, Warning};

/// Caller-supplied persistence collaborator.
#[async_trait]
pub trait PersistSink: Send + Sync {
    /// Persists one annotated record.
    ///
    /// An `Err` is recorded on that record's outcome; it never aborts the
    /// batch or affects sibling records.
    async fn persist(
        &self,
        asset_id: AssetId,
        record: &TelemetryRecord,
        warnings: &[Warning],
    ) -> Result<()>;
}

/// A record as captured by [`MemorySink`].
#[derive(Clone, Debug)]
pub struct PersistedRecord {
    /// Asset the record referenced.
    pub asset_id: AssetId,
    /// Power reading at persist time.
    pub power: f64,
    /// Temperature reading at persist time.
    pub temperature: f64,
    /// Warnings attached before the persist stage ran.
    pub warnings: Vec<Warning>,
}

/// In-memory sink collecting every persisted record. Used by the demo binary
/// and tests; a real deployment supplies its own [`PersistSink`].
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<PersistedRecord>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything persisted so far.
    pub async fn records(&self) -> Vec<PersistedRecord> {
        self.records.lock().await.clone()
    }

    /// Number of records persisted so far.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether nothing has been persisted yet.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl PersistSink for MemorySink {
    async fn persist(
        &self,
        asset_id: AssetId,
        record: &TelemetryRecord,
        warnings: &[Warning],
    ) -> Result<()> {
        let mut records = self.records.lock().await;
        records.push(PersistedRecord {
            asset_id,
            power: record.power,
            temperature: record.temperature,
            warnings: warnings.to_vec(),
        });
        Ok(())
    }
}
