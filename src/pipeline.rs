//! Concurrent telemetry pipeline.
//!
//! Consumes a finite batch of [`TelemetryRecord`]s and runs each one through
//! four stages — validate, analyze, persist, check alerts — collecting one
//! [`Outcome`] per record. Records are independent of each other; stages are
//! strictly ordered within a record.
//!
//! ## Worker pool
//!
//! Parallelism is bounded by a semaphore sized from
//! [`PipelineSettings::max_concurrent`]: submission acquires a permit before a
//! worker task is spawned, so when the bound is reached submission blocks
//! instead of spawning one task per record. Large batches therefore run in
//! constant space regardless of batch size.
//!
//! ## Failure and cancellation
//!
//! Per-record failures are data on the outcome, never raised to the batch
//! caller. Cancellation lets in-flight records finish their stages; records
//! not yet started each yield an outcome carrying
//! [`OutcomeError::Cancelled`]. Every input record yields exactly one
//! outcome either way.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::asset::AssetHealth;
use crate::config::PipelineSettings;
use crate::registry::AssetRegistry;
use crate::sink::PersistSink;
use crate::telemetry::{Outcome, OutcomeError, TelemetryRecord, Warning};

/// The four-stage batch processor.
///
/// Holds no lock of its own; the registry is the only shared state and
/// guards itself.
pub struct TelemetryPipeline {
    registry: Arc<AssetRegistry>,
    sink: Arc<dyn PersistSink>,
    settings: PipelineSettings,
    limiter: Arc<Semaphore>,
}

impl TelemetryPipeline {
    /// Creates a pipeline over the given registry and persistence sink.
    pub fn new(
        registry: Arc<AssetRegistry>,
        sink: Arc<dyn PersistSink>,
        settings: PipelineSettings,
    ) -> Self {
        let limiter = Arc::new(Semaphore::new(settings.max_concurrent.max(1)));
        Self {
            registry,
            sink,
            settings,
            limiter,
        }
    }

    /// Processes a batch, returning exactly one outcome per input record.
    ///
    /// Outcome order follows completion, not submission. Returns once every
    /// record has an outcome; on cancellation, in-flight records finish and
    /// unstarted ones are reported as cancelled.
    pub async fn process(
        &self,
        records: Vec<TelemetryRecord>,
        cancel: CancellationToken,
    ) -> Vec<Outcome> {
        let total = records.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut workers: JoinSet<Outcome> = JoinSet::new();

        for record in records {
            if cancel.is_cancelled() {
                outcomes.push(Outcome::cancelled(record.asset_id));
                continue;
            }

            // Submission blocks here once max_concurrent workers are running.
            let permit = tokio::select! {
                permit = Arc::clone(&self.limiter).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => {
                        outcomes.push(Outcome::cancelled(record.asset_id));
                        continue;
                    }
                },
                () = cancel.cancelled() => {
                    outcomes.push(Outcome::cancelled(record.asset_id));
                    continue;
                }
            };

            let registry = Arc::clone(&self.registry);
            let sink = Arc::clone(&self.sink);
            let settings = self.settings.clone();
            workers.spawn(async move {
                let outcome = process_record(&record, &registry, sink.as_ref(), &settings).await;
                drop(permit);
                outcome
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => error!(error = %err, "telemetry worker task failed"),
            }
        }

        let persisted = outcomes.iter().filter(|o| o.persisted).count();
        let cancelled = outcomes
            .iter()
            .filter(|o| o.error == Some(OutcomeError::Cancelled))
            .count();
        info!(total, persisted, cancelled, "telemetry batch complete");
        outcomes
    }
}

/// Runs the four stages for a single record.
async fn process_record(
    record: &TelemetryRecord,
    registry: &AssetRegistry,
    sink: &dyn PersistSink,
    settings: &PipelineSettings,
) -> Outcome {
    let mut warnings = Vec::new();

    // Stage 1: validate. Advisory only; the record always continues.
    let asset = registry.find_by_id(record.asset_id).await.ok();
    if asset.is_none() {
        debug!(asset_id = %record.asset_id, "telemetry for unregistered asset");
    }
    if record.temperature > settings.high_temperature_threshold {
        warn!(
            asset_id = %record.asset_id,
            temperature = record.temperature,
            "high temperature detected"
        );
        warnings.push(Warning::HighTemperature);
    }

    // Stage 2: analyze. The one long-running stage; workers suspend here
    // without blocking each other.
    tokio::time::sleep(settings.analyze_duration).await;
    if let Some(asset) = &asset {
        let health = asset.evaluate_health(record.power, record.temperature);
        if health == AssetHealth::Critical {
            let flagged = registry.set_maintenance_for_kind(record.kind).await;
            warn!(
                asset_id = %record.asset_id,
                kind = ?record.kind,
                flagged,
                "critical health, kind flagged for maintenance"
            );
        }
    }

    // Stage 3: persist. Failure is recorded on this outcome only.
    let mut persisted = false;
    let mut outcome_error = None;
    match sink.persist(record.asset_id, record, &warnings).await {
        Ok(()) => {
            persisted = true;
            debug!(asset_id = %record.asset_id, "record persisted");
        }
        Err(err) => {
            error!(asset_id = %record.asset_id, error = %err, "persist failed");
            outcome_error = Some(OutcomeError::Persistence(err.to_string()));
        }
    }

    // Stage 4: check alerts.
    if record.power < settings.low_power_threshold {
        warn!(asset_id = %record.asset_id, power = record.power, "low power alert");
        warnings.push(Warning::LowPower);
    }

    Outcome {
        asset_id: record.asset_id,
        warnings,
        persisted,
        error: outcome_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Asset, AssetKind, AssetSpec, AssetStatus};
    use crate::sink::MemorySink;
    use chrono::NaiveDate;
    use std::time::Duration;
    use uuid::Uuid;

    fn fast_settings() -> PipelineSettings {
        PipelineSettings {
            analyze_duration: Duration::ZERO,
            ..PipelineSettings::default()
        }
    }

    fn record(power: f64, temperature: f64) -> TelemetryRecord {
        TelemetryRecord::new(Uuid::new_v4(), AssetKind::Turbine, power, temperature)
    }

    #[tokio::test]
    async fn thresholds_annotate_outcomes() {
        let registry = Arc::new(AssetRegistry::new());
        let sink = Arc::new(MemorySink::new());
        let pipeline = TelemetryPipeline::new(registry, sink, fast_settings());

        let hot = record(50.0, 150.0);
        let weak = record(5.0, 50.0);
        let clean = record(50.0, 50.0);
        let ids = (hot.asset_id, weak.asset_id, clean.asset_id);

        let outcomes = pipeline
            .process(vec![hot, weak, clean], CancellationToken::new())
            .await;
        assert_eq!(outcomes.len(), 3);

        let find = |id| {
            outcomes
                .iter()
                .find(|o| o.asset_id == id)
                .unwrap_or_else(|| panic!("missing outcome for {id}"))
        };

        assert_eq!(find(ids.0).warnings, vec![Warning::HighTemperature]);
        assert_eq!(find(ids.1).warnings, vec![Warning::LowPower]);
        assert!(find(ids.2).warnings.is_empty());
        assert!(outcomes.iter().all(|o| o.persisted && o.error.is_none()));
    }

    #[tokio::test]
    async fn pre_cancelled_batch_reports_every_record_cancelled() {
        let registry = Arc::new(AssetRegistry::new());
        let sink = Arc::new(MemorySink::new());
        let pipeline = TelemetryPipeline::new(registry, sink.clone(), fast_settings());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let records: Vec<_> = (0..5).map(|_| record(50.0, 50.0)).collect();
        let outcomes = pipeline.process(records, cancel).await;

        assert_eq!(outcomes.len(), 5);
        assert!(outcomes
            .iter()
            .all(|o| o.error == Some(OutcomeError::Cancelled) && !o.persisted));
        assert!(sink.is_empty().await);
    }

    #[tokio::test]
    async fn critical_health_flags_kind_for_maintenance() {
        let registry = Arc::new(AssetRegistry::new());
        let turbine = registry
            .add(Asset::new(
                "Ridge Turbine",
                AssetStatus::Active,
                NaiveDate::from_ymd_opt(2020, 10, 10).unwrap(),
                AssetSpec::Turbine { blade_count: 3 },
            ))
            .await
            .unwrap();

        let sink = Arc::new(MemorySink::new());
        let pipeline = TelemetryPipeline::new(Arc::clone(&registry), sink, fast_settings());

        // 150° is past the turbine critical bound, so the analyze stage must
        // flag the turbine fleet for maintenance.
        let record = TelemetryRecord::new(turbine.id(), AssetKind::Turbine, 50.0, 150.0);
        let outcomes = pipeline
            .process(vec![record], CancellationToken::new())
            .await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].has_warning(Warning::HighTemperature));
        assert_eq!(
            registry.find_by_id(turbine.id()).await.unwrap().status(),
            AssetStatus::Maintenance
        );
    }

    #[tokio::test]
    async fn empty_batch_yields_no_outcomes() {
        let registry = Arc::new(AssetRegistry::new());
        let sink = Arc::new(MemorySink::new());
        let pipeline = TelemetryPipeline::new(registry, sink, fast_settings());

        let outcomes = pipeline.process(Vec::new(), CancellationToken::new()).await;
        assert!(outcomes.is_empty());
    }
}
