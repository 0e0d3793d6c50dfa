//! stargazer-ranker: Target prioritization scoring engine.
//!
//! Evidence providers feed the feature assembler; each allele-direction
//! partition is then normalised and scored independently.

pub mod disease_provider;
pub mod druggability_provider;
pub mod export;
pub mod features;
pub mod interaction_provider;
pub mod normalise;
pub mod offline;
pub mod partition;
pub mod pipeline;
pub mod scorer;
pub mod weights;

pub use partition::{EffectTransform, Partition};
pub use pipeline::{PartitionNetwork, PrioritizationQuery, PrioritizationReport, Prioritizer, QueryOutcome, SourceStatus};
pub use scorer::{GeneScore, RankedTable};
pub use weights::{Feature, FeatureSet};
