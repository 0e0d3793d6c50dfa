//! Trait for druggability tier lookup and the cached Pharos registry.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use stargazer_common::{DruggabilityTier, SourceState};
use stargazer_ingestion::sources::pharos::{read_tier_cache, write_tier_cache, TIER_CACHE_FILE};
use stargazer_ingestion::sources::{PharosClient, TargetTier};

/// Trait for accessing target development levels.
pub trait DruggabilityProvider: Send + Sync {
    /// Tier of a gene; `None` when the gene is not registered.
    fn tier(&self, gene: &str) -> DruggabilityTier;

    /// Whether the registry behind this provider loaded.
    fn status(&self) -> SourceState {
        SourceState::Available
    }
}

/// Read-only gene → tier snapshot.
#[derive(Debug, Clone)]
pub struct DruggabilityRegistry {
    tiers: HashMap<String, DruggabilityTier>,
    state: SourceState,
}

impl DruggabilityRegistry {
    /// First tier listed for a symbol wins.
    pub fn from_tiers(rows: Vec<TargetTier>) -> Self {
        let mut tiers = HashMap::with_capacity(rows.len());
        for row in rows {
            tiers.entry(row.sym).or_insert(row.tdl);
        }
        Self { tiers, state: SourceState::Available }
    }

    /// Registry that answers `None` for every gene.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            tiers: HashMap::new(),
            state: SourceState::Unavailable { reason: reason.into() },
        }
    }

    /// Load the snapshot from `cache_dir`, downloading it when the cache is
    /// missing or `refresh` is set. A failed download falls back to a stale
    /// cache if one exists. `client` is `None` when offline.
    pub fn load_or_fetch(client: Option<&PharosClient>, cache_dir: Option<&Path>, refresh: bool) -> Self {
        let cache_path = cache_dir.map(|d| d.join(TIER_CACHE_FILE));
        let cached = || -> Option<Vec<TargetTier>> {
            let path = cache_path.as_deref()?;
            if !path.exists() {
                return None;
            }
            match read_tier_cache(path) {
                Ok(rows) => Some(rows),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Unreadable druggability cache");
                    None
                }
            }
        };

        if !refresh {
            if let Some(rows) = cached() {
                info!(targets = rows.len(), "Druggability registry loaded from cache");
                return Self::from_tiers(rows);
            }
        }

        let Some(client) = client else {
            return Self::unavailable("offline and no cached registry");
        };

        match client.fetch_all_tiers() {
            Ok(rows) => {
                if let Some(path) = cache_path.as_deref() {
                    if let Err(e) = write_tier_cache(path, &rows) {
                        warn!(path = %path.display(), error = %e, "Could not write druggability cache");
                    }
                }
                Self::from_tiers(rows)
            }
            Err(e) => {
                warn!(error = %e, "Pharos unavailable");
                match cached() {
                    Some(rows) => {
                        warn!(targets = rows.len(), "Using stale druggability cache");
                        Self::from_tiers(rows)
                    }
                    None => Self::unavailable(e.to_string()),
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl DruggabilityProvider for DruggabilityRegistry {
    fn tier(&self, gene: &str) -> DruggabilityTier {
        self.tiers.get(gene).copied().unwrap_or_default()
    }

    fn status(&self) -> SourceState {
        self.state.clone()
    }
}

// ── Mock Implementation for Testing ────────────────────────────────────────

pub struct MockDruggabilityProvider {
    data: HashMap<String, DruggabilityTier>,
}

impl MockDruggabilityProvider {
    pub fn new() -> Self {
        Self { data: HashMap::new() }
    }

    pub fn with(mut self, gene: &str, tier: DruggabilityTier) -> Self {
        self.data.insert(gene.to_string(), tier);
        self
    }
}

impl Default for MockDruggabilityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DruggabilityProvider for MockDruggabilityProvider {
    fn tier(&self, gene: &str) -> DruggabilityTier {
        self.data.get(gene).copied().unwrap_or_default()
    }
}
