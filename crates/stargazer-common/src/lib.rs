//! stargazer-common: Shared types, errors, configuration and the HTTP client
//! used across all StarGazer crates.

pub mod error;
pub mod entities;
pub mod config;
pub mod sandbox;

// Re-export commonly used types
pub use config::{StargazerConfig, CatalogConfig, SourcesConfig, ScoringConfig, OutputConfig};
pub use entities::{AssociationRecord, DruggabilityTier, EnrichmentTerm, Evidence, InteractionEdge, Source, SourceState};
pub use error::{Result, StargazerError};
