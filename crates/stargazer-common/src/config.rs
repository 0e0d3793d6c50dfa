//! Run configuration for StarGazer.
//!
//! Read from `stargazer.toml` (or YAML) in the current directory, from the
//! path in the STARGAZER_CONFIG env var, or from an explicit `--config` path.
//! Every field has a default so an absent file is not an error.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::entities::Source;

pub const CONFIG_ENV_VAR: &str = "STARGAZER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "stargazer.toml";

/// Complete run configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StargazerConfig {
    /// Association corpus inputs
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Upstream evidence services
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Threshold and feature selection
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Export options
    #[serde(default)]
    pub output: OutputConfig,
}

// ── Catalog ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// PheWAS catalog CSV
    #[serde(default = "default_phewas_path")]
    pub phewas_path: PathBuf,

    /// Additional catalogs in the same column layout
    #[serde(default)]
    pub extra: Vec<ExtraCatalog>,

    /// GWAS-catalog trait overlays appended after the catalogs
    #[serde(default = "default_overlays")]
    pub overlays: Vec<OverlaySpec>,
}

fn default_phewas_path() -> PathBuf { PathBuf::from("assets/phewas-catalog.csv") }

fn default_overlays() -> Vec<OverlaySpec> {
    vec![OverlaySpec {
        efo_id: "MONDO_0100096".to_string(),
        label: "COVID-19".to_string(),
    }]
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            phewas_path: default_phewas_path(),
            extra: vec![],
            overlays: default_overlays(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtraCatalog {
    pub path: PathBuf,
    pub source: Source,
}

/// A single trait pulled from the GWAS catalog REST API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlaySpec {
    /// EFO/MONDO trait identifier, e.g. MONDO_0100096
    pub efo_id: String,
    /// Used as both phenotype and GWAS-association label
    pub label: String,
}

// ── Sources ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_opentargets_url")]
    pub opentargets_url: String,

    #[serde(default = "default_string_url")]
    pub string_url: String,

    #[serde(default = "default_pharos_url")]
    pub pharos_url: String,

    #[serde(default = "default_gwas_catalog_url")]
    pub gwas_catalog_url: String,

    /// NCBI taxon for STRING queries
    #[serde(default = "default_species")]
    pub string_species: u32,

    #[serde(default = "default_caller_identity")]
    pub caller_identity: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Drop exact-duplicate interaction rows before counting degree
    #[serde(default = "default_true")]
    pub dedup_interactions: bool,

    /// Where the druggability registry snapshot is cached
    #[serde(default)]
    pub druggability_cache_dir: Option<PathBuf>,

    /// Skip every upstream call; all collected evidence is neutral
    #[serde(default)]
    pub offline: bool,
}

fn default_opentargets_url() -> String { "https://api.platform.opentargets.org/api/v4/graphql".to_string() }
fn default_string_url()      -> String { "https://string-db.org/api".to_string() }
fn default_pharos_url()      -> String { "https://pharos-api.ncats.io/graphql".to_string() }
fn default_gwas_catalog_url() -> String { "https://www.ebi.ac.uk/gwas/rest/api".to_string() }
fn default_species()         -> u32 { 9606 }
fn default_caller_identity() -> String { "stargazer".to_string() }
fn default_timeout_secs()    -> u64 { 30 }
fn default_true()            -> bool { true }

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            opentargets_url: default_opentargets_url(),
            string_url: default_string_url(),
            pharos_url: default_pharos_url(),
            gwas_catalog_url: default_gwas_catalog_url(),
            string_species: default_species(),
            caller_identity: default_caller_identity(),
            timeout_secs: default_timeout_secs(),
            dedup_interactions: true,
            druggability_cache_dir: None,
            offline: false,
        }
    }
}

// ── Scoring ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Significance threshold used when none is given on the command line
    #[serde(default = "default_p_value")]
    pub default_p_value: f64,

    /// Feature keys removed from the aggregate (e.g. "network_degree")
    #[serde(default)]
    pub disabled_features: Vec<String>,
}

pub fn default_p_value() -> f64 { 0.05 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_p_value: default_p_value(),
            disabled_features: vec![],
        }
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// csv, json or both
    #[serde(default = "default_format")]
    pub format: String,

    /// Rows printed per partition
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_output_dir() -> PathBuf { PathBuf::from("stargazer-results") }
fn default_format() -> String { "both".to_string() }
fn default_top_n() -> usize { 20 }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: default_format(),
            top_n: default_top_n(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl StargazerConfig {
    /// Load from TOML file
    pub fn from_toml(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in {}", path.display()))?;
        Ok(config)
    }

    /// Load from YAML file
    pub fn from_yaml(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?;
        Ok(config)
    }

    /// Pick the parser from the file extension.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(path),
            _ => Self::from_toml(path),
        }
    }

    /// Explicit path, then $STARGAZER_CONFIG, then ./stargazer.toml, then defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_path(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_path(local);
        }
        tracing::debug!("No config file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Save as TOML
    pub fn to_toml(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StargazerConfig::default();
        assert_eq!(config.scoring.default_p_value, 0.05);
        assert_eq!(config.sources.string_species, 9606);
        assert!(config.sources.dedup_interactions);
        assert!(!config.sources.offline);
        assert_eq!(config.catalog.overlays.len(), 1);
        assert_eq!(config.catalog.overlays[0].label, "COVID-19");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_src = r#"
            [scoring]
            disabled_features = ["network_degree"]

            [sources]
            offline = true
        "#;
        let config: StargazerConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.scoring.disabled_features, vec!["network_degree".to_string()]);
        assert_eq!(config.scoring.default_p_value, 0.05);
        assert!(config.sources.offline);
        assert_eq!(config.sources.caller_identity, "stargazer");
        assert_eq!(config.output.top_n, 20);
    }

    #[test]
    fn test_extra_catalog_source_tag() {
        let toml_src = r#"
            [[catalog.extra]]
            path = "data/gwas.csv"
            source = "gwas"
        "#;
        let config: StargazerConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.catalog.extra[0].source, Source::Gwas);
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stargazer.toml");
        let mut config = StargazerConfig::default();
        config.output.top_n = 5;
        config.to_toml(&path).unwrap();

        let parsed = StargazerConfig::load(Some(&path)).unwrap();
        assert_eq!(parsed.output.top_n, 5);
        assert_eq!(parsed.catalog.phewas_path, config.catalog.phewas_path);
    }

    #[test]
    fn test_yaml_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stargazer.yaml");
        std::fs::write(&path, "output:\n  format: csv\n").unwrap();
        let parsed = StargazerConfig::from_path(&path).unwrap();
        assert_eq!(parsed.output.format, "csv");
    }
}
