//! Run settings: the loaded `StargazerConfig` with command-line overrides
//! applied on top.

use std::path::{Path, PathBuf};

use anyhow::Context;

use stargazer_common::StargazerConfig;
use stargazer_ingestion::PValueThreshold;
use stargazer_ranker::export::ExportFormat;
use stargazer_ranker::FeatureSet;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub offline: bool,
    pub disabled_features: Vec<String>,
    pub out_dir: Option<PathBuf>,
    pub format: Option<String>,
    pub top_n: Option<usize>,
}

/// Load the config file (see `StargazerConfig::load`) and apply overrides.
pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> anyhow::Result<StargazerConfig> {
    let mut config = StargazerConfig::load(explicit).context("Could not load StarGazer configuration")?;
    apply(&mut config, overrides);
    Ok(config)
}

pub fn apply(config: &mut StargazerConfig, overrides: &Overrides) {
    if overrides.offline {
        config.sources.offline = true;
    }
    for key in &overrides.disabled_features {
        if !config.scoring.disabled_features.contains(key) {
            config.scoring.disabled_features.push(key.clone());
        }
    }
    if let Some(dir) = &overrides.out_dir {
        config.output.dir = dir.clone();
    }
    if let Some(format) = &overrides.format {
        config.output.format = format.clone();
    }
    if let Some(n) = overrides.top_n {
        config.output.top_n = n;
    }
}

/// Threshold from the command line if given, otherwise from the config.
/// Unusable input silently becomes 0.05.
pub fn threshold(cli: Option<&str>, config: &StargazerConfig) -> PValueThreshold {
    match cli {
        Some(input) => PValueThreshold::parse(input),
        None => PValueThreshold::new(config.scoring.default_p_value).unwrap_or_default(),
    }
}

pub fn features(config: &StargazerConfig) -> anyhow::Result<FeatureSet> {
    FeatureSet::from_disabled(config.scoring.disabled_features.as_slice())
        .context("Invalid scoring.disabled_features")
}

pub fn export_format(config: &StargazerConfig) -> anyhow::Result<ExportFormat> {
    config
        .output
        .format
        .parse::<ExportFormat>()
        .with_context(|| format!("Invalid output.format '{}'", config.output.format))
}

#[cfg(test)]
mod tests;
