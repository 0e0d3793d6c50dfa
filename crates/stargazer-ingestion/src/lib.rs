//! stargazer-ingestion: Association corpus loading and upstream evidence clients.
//!
//! `store` holds the unioned association table, `catalog` reads catalog CSVs,
//! `corpus` assembles both with the trait overlays, and `sources` wraps the
//! OpenTargets, STRING, Pharos and GWAS-catalog APIs.

pub mod catalog;
pub mod corpus;
pub mod sources;
pub mod store;

pub use corpus::{load_corpus, CorpusLoad};
pub use store::{disease_query_name, split_by_direction, AssociationStore, PValueThreshold, StudyScope};
