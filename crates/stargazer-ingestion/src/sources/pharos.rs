//! Pharos target development level (TDL) registry.
//!
//! One bulk GraphQL request returns every target with its TDL. The result is
//! small enough to keep as a CSV snapshot under the user cache directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use stargazer_common::sandbox::SandboxClient;
use stargazer_common::{DruggabilityTier, Result, StargazerError};

/// Snapshot file name inside the cache directory.
pub const TIER_CACHE_FILE: &str = "pharos-tdl.csv";

const ALL_TARGETS_QUERY: &str = r#"
query AllTargets {
  targets(
    filter: {
      facets: [{
        facet: "Target Development Level",
        values: ["Tclin", "Tchem", "Tbio", "Tdark"]
      }]
    }
  ) {
    targets(top: 100000) {
      sym
      tdl
    }
  }
}
"#;

/// One (symbol, tier) row of the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetTier {
    pub sym: String,
    pub tdl: DruggabilityTier,
}

pub struct PharosClient {
    client: SandboxClient,
    endpoint: String,
}

impl PharosClient {
    pub fn new(client: SandboxClient, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into() }
    }

    /// Download the full registry.
    #[instrument(skip(self))]
    pub fn fetch_all_tiers(&self) -> Result<Vec<TargetTier>> {
        let body: Value = self.client
            .post(&self.endpoint)?
            .json(&json!({ "query": ALL_TARGETS_QUERY }))
            .send()?
            .error_for_status()?
            .json()?;

        let tiers = parse_targets(&body)?;
        info!(targets = tiers.len(), "Pharos registry downloaded");
        Ok(tiers)
    }
}

/// Parse `data.targets.targets[] { sym tdl }`.
/// Rows without a symbol or with an unrecognised TDL are skipped; exact
/// duplicates are dropped.
pub fn parse_targets(body: &Value) -> Result<Vec<TargetTier>> {
    let rows = body["data"]["targets"]["targets"]
        .as_array()
        .ok_or_else(|| StargazerError::Upstream("Pharos: missing data.targets.targets".to_string()))?;

    let mut seen = HashSet::new();
    let mut tiers = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(sym) = row["sym"].as_str().filter(|s| !s.is_empty()) else {
            continue;
        };
        let tdl = match row["tdl"].as_str().unwrap_or("").parse::<DruggabilityTier>() {
            Ok(t) => t,
            Err(e) => {
                debug!(sym, error = %e, "Skipping Pharos row");
                continue;
            }
        };
        if seen.insert((sym.to_string(), tdl)) {
            tiers.push(TargetTier { sym: sym.to_string(), tdl });
        }
    }
    Ok(tiers)
}

// ── Snapshot cache ───────────────────────────────────────────────────────────

/// `<user cache dir>/stargazer`, if the platform has one.
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("stargazer"))
}

/// Read a snapshot written by [`write_tier_cache`].
pub fn read_tier_cache(path: &Path) -> Result<Vec<TargetTier>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut tiers = Vec::new();
    for row in reader.deserialize::<TargetTier>() {
        match row {
            Ok(t) => tiers.push(t),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping malformed cache row"),
        }
    }
    Ok(tiers)
}

pub fn write_tier_cache(path: &Path, tiers: &[TargetTier]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for t in tiers {
        writer.serialize(t)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = tiers.len(), "Pharos snapshot written");
    Ok(())
}
