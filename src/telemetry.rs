//! Telemetry input and outcome types.
//!
//! A [`TelemetryRecord`] is one reading for one asset: produced once by an
//! external source, consumed once by the pipeline, then discarded. The
//! pipeline answers with exactly one [`Outcome`] per record.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::{AssetId, AssetKind};

/// One telemetry reading for one asset.
///
/// `power` is >= 0 by convention only; the validation stage checks readings
/// but never rejects a record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Asset the reading belongs to.
    pub asset_id: AssetId,
    /// Variant tag as reported by the source.
    pub kind: AssetKind,
    /// Power reading in kW.
    pub power: f64,
    /// Temperature reading in °C.
    pub temperature: f64,
}

impl TelemetryRecord {
    /// Creates a record.
    pub fn new(asset_id: AssetId, kind: AssetKind, power: f64, temperature: f64) -> Self {
        Self {
            asset_id,
            kind,
            power,
            temperature,
        }
    }
}

/// Advisory annotation attached to an outcome by the validate and alert
/// stages. Warnings never abort a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Warning {
    /// Temperature exceeded the configured high-temperature threshold.
    HighTemperature,
    /// Power fell below the configured low-power threshold.
    LowPower,
}

/// Per-record failure carried on an [`Outcome`].
///
/// These are data, not raised errors: a record's failure never propagates to
/// sibling records or aborts the batch.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum OutcomeError {
    /// The persistence collaborator failed for this record.
    #[error("persistence failed: {0}")]
    Persistence(String),
    /// The batch was cancelled before this record started.
    #[error("cancelled before processing started")]
    Cancelled,
}

/// Result of running one record through the four-stage pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Outcome {
    /// Asset the record referenced.
    pub asset_id: AssetId,
    /// Advisory annotations gathered across stages.
    pub warnings: Vec<Warning>,
    /// Whether the persist stage succeeded.
    pub persisted: bool,
    /// Per-record failure, if any.
    pub error: Option<OutcomeError>,
}

impl Outcome {
    /// Outcome for a record the batch never started.
    pub(crate) fn cancelled(asset_id: AssetId) -> Self {
        Self {
            asset_id,
            warnings: Vec::new(),
            persisted: false,
            error: Some(OutcomeError::Cancelled),
        }
    }

    /// Whether the outcome carries the given warning.
    pub fn has_warning(&self, warning: Warning) -> bool {
        self.warnings.contains(&warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn cancelled_outcome_is_not_persisted() {
        let outcome = Outcome::cancelled(Uuid::new_v4());
        assert!(!outcome.persisted);
        assert_eq!(outcome.error, Some(OutcomeError::Cancelled));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn warnings_are_queryable() {
        let outcome = Outcome {
            asset_id: Uuid::new_v4(),
            warnings: vec![Warning::HighTemperature],
            persisted: true,
            error: None,
        };
        assert!(outcome.has_warning(Warning::HighTemperature));
        assert!(!outcome.has_warning(Warning::LowPower));
    }
}
