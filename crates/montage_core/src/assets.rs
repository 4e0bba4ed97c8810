//! Append-only registry of ingested media.
//!
//! Durations are resolved asynchronously, exactly once, after registration.
//! Until then (and forever, if resolution fails) the asset's duration reads
//! as zero and the editor refuses to place it.

use crate::types::{Asset, AssetKind, SourceHandle, Time};
use std::collections::HashSet;
use std::future::Future;
use uuid::Uuid;

/// Still images carry no intrinsic duration; they are held on the timeline
/// for a fixed default.
pub const IMAGE_DEFAULT_DURATION: Time = Time(5_000_000);

#[derive(Debug, Default)]
pub struct AssetRegistry {
    assets: Vec<Asset>,
    resolved: HashSet<Uuid>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new asset. Image assets resolve immediately to the default
    /// still duration; video and audio start pending (duration zero) until
    /// [`complete_resolution`](Self::complete_resolution) is called.
    pub fn register(
        &mut self,
        kind: AssetKind,
        display_name: impl Into<String>,
        source: SourceHandle,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let duration = match kind {
            AssetKind::Image => IMAGE_DEFAULT_DURATION,
            AssetKind::Video | AssetKind::Audio => Time::ZERO,
        };
        if kind == AssetKind::Image {
            self.resolved.insert(id);
        }
        let display_name = display_name.into();
        tracing::debug!(%id, ?kind, name = %display_name, "asset registered");
        self.assets.push(Asset {
            id,
            kind,
            display_name,
            source,
            duration,
        });
        id
    }

    /// Apply a probe result. The first call per asset wins; later calls and
    /// calls for unknown ids are ignored. `None` records a permanent failure,
    /// leaving the duration at zero.
    pub fn complete_resolution(&mut self, id: Uuid, duration: Option<Time>) {
        if self.resolved.contains(&id) {
            tracing::debug!(%id, "duration already resolved, ignoring");
            return;
        }
        let Some(asset) = self.assets.iter_mut().find(|a| a.id == id) else {
            tracing::debug!(%id, "resolution for unknown asset, ignoring");
            return;
        };
        self.resolved.insert(id);
        match duration {
            Some(d) if d > Time::ZERO => {
                asset.duration = d;
                tracing::debug!(%id, duration = %d, "asset duration resolved");
            }
            _ => {
                tracing::warn!(%id, "asset duration resolution failed");
            }
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn duration_of(&self, id: Uuid) -> Option<Time> {
        self.get(id).map(|a| a.duration)
    }

    /// An asset can be placed once its duration has resolved to a positive
    /// value.
    pub fn is_placeable(&self, id: Uuid) -> bool {
        self.duration_of(id).is_some_and(|d| d > Time::ZERO)
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }
}

/// Await a duration probe with a bounded wait. Returns `None` on probe
/// failure or timeout; the caller feeds the result to
/// [`AssetRegistry::complete_resolution`].
pub async fn probe_duration<F>(probe: F, wait: std::time::Duration) -> Option<Time>
where
    F: Future<Output = Option<Time>>,
{
    match tokio::time::timeout(wait, probe).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(?wait, "duration probe timed out");
            None
        }
    }
}
