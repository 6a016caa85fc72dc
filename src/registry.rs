//! In-memory asset registry.
//!
//! The registry is the single owner of all [`Asset`] instances and the only
//! state shared across pipeline workers. All mutation funnels through one
//! `tokio::sync::Mutex` around the internal map; critical sections are scoped
//! to the map operation itself, never to a whole pipeline stage.
//!
//! Reads return cloned snapshots taken under the lock, so a caller can
//! iterate results while the registry is concurrently mutated and never
//! observes a partially applied change.
//!
//! Lookup contract: absence is always an explicit [`AssetError::AssetNotFound`],
//! never a null-equivalent. Uniqueness is enforced on id only; duplicate
//! names are permitted and name lookups treat the first case-insensitive
//! match in insertion order as canonical.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::asset::{Asset, AssetHealth, AssetId, AssetKind, AssetStatus};
use crate::error::{AppResult, AssetError};

/// Owner of the asset fleet.
///
/// Cheap to share as `Arc<AssetRegistry>`; all methods take `&self`.
#[derive(Default)]
pub struct AssetRegistry {
    inner: Mutex<RegistryInner>,
}

/// Map for id lookups plus an insertion-order index so bulk reads and name
/// lookups are deterministic.
#[derive(Default)]
struct RegistryInner {
    assets: HashMap<AssetId, Asset>,
    order: Vec<AssetId>,
}

impl RegistryInner {
    fn iter_ordered(&self) -> impl Iterator<Item = &Asset> {
        self.order.iter().filter_map(|id| self.assets.get(id))
    }
}

impl AssetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an asset.
    ///
    /// Fails with [`AssetError::DuplicateAsset`] when the id is already
    /// present, leaving the registry unchanged. Name collisions are allowed.
    pub async fn add(&self, asset: Asset) -> AppResult<Asset> {
        let mut inner = self.inner.lock().await;
        if inner.assets.contains_key(&asset.id()) {
            return Err(AssetError::DuplicateAsset(asset.id()));
        }

        inner.order.push(asset.id());
        inner.assets.insert(asset.id(), asset.clone());
        debug!(asset_id = %asset.id(), name = asset.name(), kind = ?asset.kind(), "asset registered");
        Ok(asset)
    }

    /// O(1) lookup by identity.
    pub async fn find_by_id(&self, id: AssetId) -> AppResult<Asset> {
        let inner = self.inner.lock().await;
        inner
            .assets
            .get(&id)
            .cloned()
            .ok_or_else(|| AssetError::AssetNotFound(id.to_string()))
    }

    /// Case-insensitive name lookup; first match in insertion order wins.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Asset> {
        let inner = self.inner.lock().await;
        inner
            .iter_ordered()
            .find(|asset| asset.name().eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| AssetError::AssetNotFound(name.to_string()))
    }

    /// Removes the first case-insensitive name match, consistent with
    /// [`find_by_name`](Self::find_by_name). Returns the removed asset, or
    /// [`AssetError::AssetNotFound`] when nothing matches.
    pub async fn remove(&self, name: &str) -> AppResult<Asset> {
        let mut guard = self.inner.lock().await;
        let RegistryInner { assets, order } = &mut *guard;

        let position = order.iter().position(|id| {
            assets
                .get(id)
                .is_some_and(|asset| asset.name().eq_ignore_ascii_case(name))
        });

        match position {
            Some(index) => {
                let id = order.remove(index);
                let asset = assets
                    .remove(&id)
                    .ok_or_else(|| AssetError::AssetNotFound(name.to_string()))?;
                info!(asset_id = %id, name = asset.name(), "asset removed");
                Ok(asset)
            }
            None => Err(AssetError::AssetNotFound(name.to_string())),
        }
    }

    /// Snapshot of every asset in insertion order.
    pub async fn find_all(&self) -> Vec<Asset> {
        let inner = self.inner.lock().await;
        inner.iter_ordered().cloned().collect()
    }

    /// Snapshot of assets with the given status, in insertion order.
    ///
    /// Safe to iterate while the registry is concurrently mutated elsewhere.
    pub async fn find_all_by_status(&self, status: AssetStatus) -> Vec<Asset> {
        let inner = self.inner.lock().await;
        inner
            .iter_ordered()
            .filter(|asset| asset.status() == status)
            .cloned()
            .collect()
    }

    /// Snapshot of assets whose health, evaluated against the supplied
    /// readings, matches `health`.
    pub async fn find_by_health(
        &self,
        power: f64,
        temperature: f64,
        health: AssetHealth,
    ) -> Vec<Asset> {
        let inner = self.inner.lock().await;
        inner
            .iter_ordered()
            .filter(|asset| asset.evaluate_health(power, temperature) == health)
            .cloned()
            .collect()
    }

    /// Bulk sets `MAINTENANCE` on every asset of the given variant.
    ///
    /// Returns the number of assets mutated. This is the one bulk-mutation
    /// entry point the pipeline uses; it may run concurrently with lookups.
    pub async fn set_maintenance_for_kind(&self, kind: AssetKind) -> usize {
        let mut inner = self.inner.lock().await;
        let mut count = 0;
        for asset in inner.assets.values_mut() {
            if asset.kind() == kind {
                asset.set_status(AssetStatus::Maintenance);
                count += 1;
            }
        }
        info!(kind = ?kind, count, "assets flagged for maintenance");
        count
    }

    /// Services every asset currently in `MAINTENANCE` and returns it to
    /// `ACTIVE`. Returns the number of assets serviced.
    pub async fn service_all(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let mut count = 0;
        for asset in inner.assets.values_mut() {
            if asset.status() != AssetStatus::Maintenance {
                continue;
            }
            match asset.kind() {
                AssetKind::Turbine => debug!(asset_id = %asset.id(), "blades replaced"),
                AssetKind::SolarPanel => debug!(asset_id = %asset.id(), "cells replaced"),
                AssetKind::Generic => debug!(asset_id = %asset.id(), "unit serviced"),
            }
            asset.set_status(AssetStatus::Active);
            count += 1;
        }
        info!(count, "maintenance pass complete");
        count
    }

    /// Number of registered assets.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.assets.len()
    }

    /// Whether the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.assets.is_empty()
    }
}
