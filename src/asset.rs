//! Asset model: the closed set of physical unit variants tracked by the
//! registry.
//!
//! An [`Asset`] couples identity (`id`, `name`), lifecycle state
//! ([`AssetStatus`]) and an immutable variant payload ([`AssetSpec`]). The
//! variant set is closed: dispatch happens via `match`, not open inheritance,
//! so adding a variant is a compile-time event across the crate.
//!
//! Health evaluation ([`Asset::evaluate_health`]) is a pure function of the
//! variant and the supplied readings. It never touches shared state, which
//! lets the pipeline call it from any worker without coordination.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AssetError;

/// Globally unique asset identifier. Assigned at creation, never reused.
pub type AssetId = Uuid;

/// Lifecycle status of an asset.
///
/// Any status is reachable from any other, but `Maintenance` is the only
/// state the pipeline sets automatically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetStatus {
    /// In service and producing.
    Active,
    /// Flagged for or undergoing maintenance.
    Maintenance,
    /// Permanently decommissioned.
    Retired,
}

/// Health verdict produced by [`Asset::evaluate_health`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetHealth {
    /// Operating within expected bounds.
    Good,
    /// Producing, but below expectations for the variant.
    Degraded,
    /// Outside safe operating bounds; maintenance is warranted.
    Critical,
}

/// Variant tag, used for bulk operations and telemetry routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Wind turbine.
    Turbine,
    /// Solar panel.
    SolarPanel,
    /// Any other managed unit.
    Generic,
}

impl AssetKind {
    /// Parses a raw kind tag as it appears in an [`AssetDefinition`].
    fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "turbine" => Some(AssetKind::Turbine),
            "solar_panel" => Some(AssetKind::SolarPanel),
            "generic" => Some(AssetKind::Generic),
            _ => None,
        }
    }
}

// Health evaluation bounds per variant. Temperatures in °C, power in kW.
const TURBINE_CRITICAL_TEMP: f64 = 110.0;
const TURBINE_MIN_POWER_PER_BLADE: f64 = 4.0;
const PANEL_CRITICAL_TEMP: f64 = 85.0;
const PANEL_OUTPUT_PER_RATING: f64 = 5.0;
const GENERIC_CRITICAL_TEMP: f64 = 100.0;

/// Variant-specific payload. Immutable after construction; there is no
/// partial-update path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetSpec {
    /// Wind turbine with a fixed rotor configuration.
    Turbine {
        /// Number of rotor blades.
        blade_count: u32,
    },
    /// Solar panel with a factory efficiency rating.
    SolarPanel {
        /// Vendor efficiency rating (dimensionless, e.g. 9.2).
        efficiency_rating: f64,
    },
    /// A managed unit with no variant-specific attributes.
    Generic,
}

impl AssetSpec {
    /// The variant tag for this payload.
    pub fn kind(&self) -> AssetKind {
        match self {
            AssetSpec::Turbine { .. } => AssetKind::Turbine,
            AssetSpec::SolarPanel { .. } => AssetKind::SolarPanel,
            AssetSpec::Generic => AssetKind::Generic,
        }
    }
}

/// A managed physical unit.
///
/// Identity (`id`) and the variant payload are immutable; `status` changes
/// only through registry operations. The registry hands out clones, so a
/// caller can never mutate registry state through a returned `Asset`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    id: AssetId,
    name: String,
    status: AssetStatus,
    installed_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    spec: AssetSpec,
}

impl Asset {
    /// Creates an asset with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        status: AssetStatus,
        installed_date: NaiveDate,
        spec: AssetSpec,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, status, installed_date, spec)
    }

    /// Creates an asset with a caller-supplied id.
    pub fn with_id(
        id: AssetId,
        name: impl Into<String>,
        status: AssetStatus,
        installed_date: NaiveDate,
        spec: AssetSpec,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            status,
            installed_date,
            location: None,
            spec,
        }
    }

    /// Attaches an optional location description.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builds an asset from a raw [`AssetDefinition`].
    ///
    /// This is the only deserialization boundary for assets. Fails with
    /// [`AssetError::InvalidAsset`] when required fields are missing or the
    /// kind tag is unrecognized. A missing id is generated; a missing status
    /// defaults to [`AssetStatus::Active`].
    pub fn from_definition(def: AssetDefinition) -> Result<Self, AssetError> {
        let name = match def.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(AssetError::InvalidAsset("missing asset name".into())),
        };

        let installed_date = def
            .installed_date
            .ok_or_else(|| AssetError::InvalidAsset("missing installed_date".into()))?;

        let tag = def
            .kind
            .ok_or_else(|| AssetError::InvalidAsset("missing kind tag".into()))?;
        let kind = AssetKind::from_tag(&tag)
            .ok_or_else(|| AssetError::InvalidAsset(format!("unrecognized kind tag '{tag}'")))?;

        let spec = match kind {
            AssetKind::Turbine => {
                let blade_count = def
                    .params
                    .get("blade_count")
                    .and_then(serde_json::Value::as_u64)
                    .ok_or_else(|| {
                        AssetError::InvalidAsset("turbine requires params.blade_count".into())
                    })?;
                AssetSpec::Turbine {
                    blade_count: blade_count as u32,
                }
            }
            AssetKind::SolarPanel => {
                let efficiency_rating = def
                    .params
                    .get("efficiency_rating")
                    .and_then(serde_json::Value::as_f64)
                    .ok_or_else(|| {
                        AssetError::InvalidAsset(
                            "solar panel requires params.efficiency_rating".into(),
                        )
                    })?;
                AssetSpec::SolarPanel { efficiency_rating }
            }
            AssetKind::Generic => AssetSpec::Generic,
        };

        let mut asset = Self::with_id(
            def.id.unwrap_or_else(Uuid::new_v4),
            name,
            def.status.unwrap_or(AssetStatus::Active),
            installed_date,
            spec,
        );
        asset.location = def.location;
        Ok(asset)
    }

    /// Unique identifier.
    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Display name. Used as an alternate, case-insensitive lookup key; not
    /// guaranteed unique.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle status.
    pub fn status(&self) -> AssetStatus {
        self.status
    }

    /// Installation date. Immutable historical fact.
    pub fn installed_date(&self) -> NaiveDate {
        self.installed_date
    }

    /// Optional location description.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Variant payload.
    pub fn spec(&self) -> &AssetSpec {
        &self.spec
    }

    /// Variant tag.
    pub fn kind(&self) -> AssetKind {
        self.spec.kind()
    }

    /// Status transitions are funnelled through the registry.
    pub(crate) fn set_status(&mut self, status: AssetStatus) {
        self.status = status;
    }

    /// Evaluates asset health from the supplied readings.
    ///
    /// Pure function of the variant and the readings; no side effects.
    pub fn evaluate_health(&self, power: f64, temperature: f64) -> AssetHealth {
        match &self.spec {
            AssetSpec::Turbine { blade_count } => {
                if temperature > TURBINE_CRITICAL_TEMP {
                    AssetHealth::Critical
                } else if power < TURBINE_MIN_POWER_PER_BLADE * f64::from(*blade_count) {
                    AssetHealth::Degraded
                } else {
                    AssetHealth::Good
                }
            }
            AssetSpec::SolarPanel { efficiency_rating } => {
                if temperature > PANEL_CRITICAL_TEMP {
                    AssetHealth::Critical
                } else if power < PANEL_OUTPUT_PER_RATING * efficiency_rating / 2.0 {
                    AssetHealth::Degraded
                } else {
                    AssetHealth::Good
                }
            }
            AssetSpec::Generic => {
                if temperature > GENERIC_CRITICAL_TEMP {
                    AssetHealth::Critical
                } else if power <= 0.0 {
                    AssetHealth::Degraded
                } else {
                    AssetHealth::Good
                }
            }
        }
    }
}

/// Raw asset fields as supplied by an external layer (HTTP, CLI, config).
///
/// All fields are optional at the parse level; [`Asset::from_definition`]
/// enforces which ones are actually required.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssetDefinition {
    /// Caller-supplied id; generated when absent.
    #[serde(default)]
    pub id: Option<AssetId>,
    /// Display name. Required.
    #[serde(default)]
    pub name: Option<String>,
    /// Variant tag: `turbine`, `solar_panel` or `generic`. Required.
    #[serde(default)]
    pub kind: Option<String>,
    /// Initial status; defaults to `ACTIVE`.
    #[serde(default)]
    pub status: Option<AssetStatus>,
    /// Installation date. Required.
    #[serde(default)]
    pub installed_date: Option<NaiveDate>,
    /// Optional location description.
    #[serde(default)]
    pub location: Option<String>,
    /// Variant-specific attributes (e.g. `blade_count`, `efficiency_rating`).
    #[serde(default)]
    pub params: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn install_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 25).unwrap()
    }

    #[test]
    fn turbine_health_follows_readings() {
        let turbine = Asset::new(
            "Small Turbine",
            AssetStatus::Active,
            install_date(),
            AssetSpec::Turbine { blade_count: 3 },
        );

        assert_eq!(turbine.evaluate_health(50.0, 50.0), AssetHealth::Good);
        assert_eq!(turbine.evaluate_health(5.0, 50.0), AssetHealth::Degraded);
        assert_eq!(turbine.evaluate_health(50.0, 150.0), AssetHealth::Critical);
    }

    #[test]
    fn panel_health_uses_efficiency_rating() {
        let panel = Asset::new(
            "Premium Solar Panel",
            AssetStatus::Active,
            install_date(),
            AssetSpec::SolarPanel {
                efficiency_rating: 9.2,
            },
        );

        // Expected output is 5.0 * 9.2 = 46; below half of that is degraded.
        assert_eq!(panel.evaluate_health(46.0, 40.0), AssetHealth::Good);
        assert_eq!(panel.evaluate_health(10.0, 40.0), AssetHealth::Degraded);
        assert_eq!(panel.evaluate_health(46.0, 90.0), AssetHealth::Critical);
    }

    #[test]
    fn definition_builds_turbine() {
        let def = AssetDefinition {
            name: Some("Ridge Turbine".into()),
            kind: Some("turbine".into()),
            installed_date: Some(install_date()),
            params: json!({ "blade_count": 3 }),
            ..Default::default()
        };

        let asset = Asset::from_definition(def).unwrap();
        assert_eq!(asset.kind(), AssetKind::Turbine);
        assert_eq!(asset.status(), AssetStatus::Active);
        assert_eq!(
            asset.spec(),
            &AssetSpec::Turbine { blade_count: 3 },
        );
    }

    #[test]
    fn definition_rejects_missing_name() {
        let def = AssetDefinition {
            kind: Some("generic".into()),
            installed_date: Some(install_date()),
            ..Default::default()
        };

        let err = Asset::from_definition(def).unwrap_err();
        assert!(matches!(err, AssetError::InvalidAsset(_)));
    }

    #[test]
    fn definition_rejects_unknown_kind() {
        let def = AssetDefinition {
            name: Some("Mystery Unit".into()),
            kind: Some("hydro_dam".into()),
            installed_date: Some(install_date()),
            ..Default::default()
        };

        let err = Asset::from_definition(def).unwrap_err();
        match err {
            AssetError::InvalidAsset(msg) => assert!(msg.contains("hydro_dam")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn definition_rejects_turbine_without_blade_count() {
        let def = AssetDefinition {
            name: Some("Bare Turbine".into()),
            kind: Some("turbine".into()),
            installed_date: Some(install_date()),
            ..Default::default()
        };

        assert!(matches!(
            Asset::from_definition(def),
            Err(AssetError::InvalidAsset(_))
        ));
    }

    #[test]
    fn status_roundtrips_through_serde() {
        let json = serde_json::to_string(&AssetStatus::Maintenance).unwrap();
        assert_eq!(json, "\"MAINTENANCE\"");
        let back: AssetStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AssetStatus::Maintenance);
    }
}
