//! Wires configuration to the upstream clients and provider adapters.

use std::time::Duration;

use anyhow::Context;
use tracing::info;

use stargazer_common::sandbox::SandboxClient;
use stargazer_common::SourcesConfig;
use stargazer_ingestion::sources::pharos::default_cache_dir;
use stargazer_ingestion::sources::{GwasCatalogClient, OpenTargetsClient, PharosClient, StringDbClient};
use stargazer_ranker::disease_provider::{DiseaseAssociationProvider, OpenTargetsAdapter};
use stargazer_ranker::druggability_provider::DruggabilityRegistry;
use stargazer_ranker::interaction_provider::{InteractionProvider, StringDbAdapter};
use stargazer_ranker::offline::OfflineProvider;

/// Everything a query needs from outside the association store.
pub struct Services {
    pub diseases: Box<dyn DiseaseAssociationProvider>,
    pub interactions: Box<dyn InteractionProvider>,
    pub druggability: DruggabilityRegistry,
    /// `None` when offline
    pub gwas: Option<GwasCatalogClient>,
}

impl Services {
    /// Live clients, or offline stand-ins when `sources.offline` is set.
    /// The druggability registry is read from cache when one exists.
    pub fn build(sources: &SourcesConfig, refresh_druggability: bool) -> anyhow::Result<Self> {
        let cache_dir = sources.druggability_cache_dir.clone().or_else(default_cache_dir);

        if sources.offline {
            info!("Offline mode: upstream evidence sources disabled");
            return Ok(Self {
                diseases: Box::new(OfflineProvider),
                interactions: Box::new(OfflineProvider),
                druggability: DruggabilityRegistry::load_or_fetch(None, cache_dir.as_deref(), false),
                gwas: None,
            });
        }

        let client = http_client(sources)?;
        let pharos = PharosClient::new(client.clone(), sources.pharos_url.clone());
        let druggability = DruggabilityRegistry::load_or_fetch(Some(&pharos), cache_dir.as_deref(), refresh_druggability);

        Ok(Self {
            diseases: Box::new(OpenTargetsAdapter::new(OpenTargetsClient::new(
                client.clone(),
                sources.opentargets_url.clone(),
            ))),
            interactions: Box::new(StringDbAdapter::new(StringDbClient::new(
                client.clone(),
                sources.string_url.clone(),
                sources.string_species,
                sources.caller_identity.clone(),
            ))),
            druggability,
            gwas: Some(GwasCatalogClient::new(client, sources.gwas_catalog_url.clone())),
        })
    }
}

/// Sandboxed client that also admits the hosts of the configured endpoints.
pub fn http_client(sources: &SourcesConfig) -> anyhow::Result<SandboxClient> {
    let mut client = SandboxClient::with_timeout(Duration::from_secs(sources.timeout_secs))
        .context("Failed to build HTTP client")?;
    for url in [
        &sources.opentargets_url,
        &sources.string_url,
        &sources.pharos_url,
        &sources.gwas_catalog_url,
    ] {
        client.allow_url_host(url);
    }
    Ok(client)
}

/// GWAS-catalog client for the trait overlays; `None` when offline.
pub fn overlay_client(sources: &SourcesConfig) -> anyhow::Result<Option<GwasCatalogClient>> {
    if sources.offline {
        return Ok(None);
    }
    Ok(Some(GwasCatalogClient::new(http_client(sources)?, sources.gwas_catalog_url.clone())))
}
