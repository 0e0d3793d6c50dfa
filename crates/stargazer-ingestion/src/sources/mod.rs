pub mod gwas_catalog;
pub mod opentargets;
pub mod pharos;
pub mod string_db;

pub use gwas_catalog::GwasCatalogClient;
pub use opentargets::{OpenTargetsClient, TargetAssociation};
pub use pharos::{PharosClient, TargetTier};
pub use string_db::StringDbClient;
