//! Subcommand arguments and handlers.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use stargazer_common::{SourceState, StargazerConfig};
use stargazer_ingestion::{load_corpus, split_by_direction, AssociationStore, CorpusLoad, StudyScope};
use stargazer_ranker::export::export_report;
use stargazer_ranker::offline::OfflineProvider;
use stargazer_ranker::{Partition, PrioritizationQuery, Prioritizer, QueryOutcome};

use crate::config::{self, Overrides};
use crate::render;
use crate::services::{overlay_client, Services};

fn parse_scope(input: &str) -> Result<StudyScope, String> {
    input.parse::<StudyScope>()
}

fn load_store(config: &StargazerConfig) -> anyhow::Result<AssociationStore> {
    let gwas = overlay_client(&config.sources)?;
    let corpus = load_corpus(&config.catalog, gwas.as_ref()).context("Could not load the association corpus")?;
    report_overlays(&corpus);
    Ok(corpus.store)
}

fn report_overlays(corpus: &CorpusLoad) {
    for (label, state) in &corpus.overlays {
        if let SourceState::Unavailable { reason } = state {
            warn!(overlay = %label, %reason, "Trait overlay not included");
        }
    }
}

// ── prioritize ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PrioritizeArgs {
    /// Disease label, e.g. "Asthma"
    #[arg(short, long)]
    pub disease: String,

    /// p-value threshold; unusable input falls back to 0.05
    #[arg(short, long)]
    pub p_value: Option<String>,

    /// Feature to leave out of the score (repeatable)
    #[arg(long = "disable", value_name = "FEATURE")]
    pub disable: Vec<String>,

    /// Which record fields the disease label is matched against
    #[arg(long, default_value = "union", value_parser = parse_scope)]
    pub scope: StudyScope,

    /// Keep duplicate interaction rows when counting network degree
    #[arg(long)]
    pub keep_duplicate_edges: bool,

    /// Re-download the druggability registry even when cached
    #[arg(long)]
    pub refresh_druggability: bool,

    /// Output directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// csv, json or both
    #[arg(short, long)]
    pub format: Option<String>,

    /// Genes printed per partition
    #[arg(long)]
    pub top: Option<usize>,
}

impl PrioritizeArgs {
    pub fn overrides(&self, offline: bool) -> Overrides {
        Overrides {
            offline,
            disabled_features: self.disable.clone(),
            out_dir: self.out.clone(),
            format: self.format.clone(),
            top_n: self.top,
        }
    }
}

pub fn prioritize(config: &StargazerConfig, args: &PrioritizeArgs) -> anyhow::Result<()> {
    let features = config::features(config)?;
    let format = config::export_format(config)?;
    let threshold = config::threshold(args.p_value.as_deref(), config);

    let services = Services::build(&config.sources, args.refresh_druggability)?;
    let corpus = load_corpus(&config.catalog, services.gwas.as_ref())
        .context("Could not load the association corpus")?;
    report_overlays(&corpus);

    let prioritizer = Prioritizer::new(
        &corpus.store,
        services.diseases.as_ref(),
        services.interactions.as_ref(),
        &services.druggability,
    );
    let query = PrioritizationQuery::new(args.disease.clone())
        .with_threshold(threshold)
        .with_scope(args.scope)
        .with_features(features)
        .with_dedup(config.sources.dedup_interactions && !args.keep_duplicate_edges);

    match prioritizer.run(&query) {
        QueryOutcome::NoData { disease, threshold } => {
            println!("No data found for '{disease}' at p <= {threshold}.");
        }
        QueryOutcome::Ranked(report) => {
            render::report_header(&report);
            for table in report.tables() {
                render::ranked_table(table, config.output.top_n);
            }
            render::tier_breakdown(&report.tiers);

            let written = export_report(&report, &config.output.dir, format)
                .with_context(|| format!("Could not write results to {}", config.output.dir.display()))?;
            println!();
            for path in &written {
                println!("wrote {}", path.display());
            }
            info!(files = written.len(), "Export complete");
        }
    }
    Ok(())
}

// ── diseases ─────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DiseasesArgs {
    #[arg(long, default_value = "union", value_parser = parse_scope)]
    pub scope: StudyScope,
}

pub fn diseases(config: &StargazerConfig, args: &DiseasesArgs) -> anyhow::Result<()> {
    let store = load_store(config)?;
    let names = store.diseases(args.scope);
    for name in &names {
        println!("{name}");
    }
    info!(count = names.len(), "Diseases listed");
    Ok(())
}

// ── gene / variant ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GeneArgs {
    /// Gene symbol, e.g. IL13
    pub symbol: String,

    /// Restrict to one variant of the gene
    #[arg(long)]
    pub variant: Option<String>,

    /// Only show associations at or below this p-value
    #[arg(short, long)]
    pub p_value: Option<String>,
}

pub fn gene(config: &StargazerConfig, args: &GeneArgs) -> anyhow::Result<()> {
    let store = load_store(config)?;
    let variants = store.variants_of(&args.symbol);
    if variants.is_empty() {
        println!("No associations found for gene '{}'.", args.symbol);
        return Ok(());
    }
    let list: Vec<&str> = variants.into_iter().collect();
    println!("{}: {} variants ({})", args.symbol, list.len(), list.join(", "));

    let threshold = args.p_value.as_deref().map(|p| config::threshold(Some(p), config));
    let records = store.records_for_gene(&args.symbol).into_iter().filter(|r| {
        args.variant.as_deref().map_or(true, |v| r.variant == v)
            && threshold.map_or(true, |t| t.admits(r.significance))
    });
    let (risk, protective) = split_by_direction(records);
    render::association_records("Risk alleles", &risk);
    render::association_records("Protective alleles", &protective);
    Ok(())
}

#[derive(Debug, Args)]
pub struct VariantArgs {
    /// Variant id, e.g. rs20541
    pub id: String,

    /// Only show associations at or below this p-value
    #[arg(short, long)]
    pub p_value: Option<String>,
}

pub fn variant(config: &StargazerConfig, args: &VariantArgs) -> anyhow::Result<()> {
    let store = load_store(config)?;
    let threshold = args.p_value.as_deref().map(|p| config::threshold(Some(p), config));
    let records = store
        .records_for_variant(&args.id)
        .into_iter()
        .filter(|r| threshold.map_or(true, |t| t.admits(r.significance)));
    let (risk, protective) = split_by_direction(records);
    if risk.is_empty() && protective.is_empty() {
        println!("No associations found for variant '{}'.", args.id);
        return Ok(());
    }
    render::association_records("Risk alleles", &risk);
    render::association_records("Protective alleles", &protective);
    Ok(())
}

// ── study / network ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StudyArgs {
    #[arg(short, long)]
    pub disease: String,

    #[arg(long, default_value = "union", value_parser = parse_scope)]
    pub scope: StudyScope,

    #[arg(short, long)]
    pub p_value: Option<String>,

    /// Re-download the druggability registry even when cached
    #[arg(long)]
    pub refresh_druggability: bool,
}

pub fn study(config: &StargazerConfig, args: &StudyArgs) -> anyhow::Result<()> {
    let threshold = config::threshold(args.p_value.as_deref(), config);
    let services = Services::build(&config.sources, args.refresh_druggability)?;
    let corpus = load_corpus(&config.catalog, services.gwas.as_ref())
        .context("Could not load the association corpus")?;
    report_overlays(&corpus);

    let prioritizer = Prioritizer::new(
        &corpus.store,
        &OfflineProvider,
        services.interactions.as_ref(),
        &services.druggability,
    );
    let Some(view) = prioritizer.study(&args.disease, args.scope, threshold) else {
        println!("No data found for '{}' at p <= {threshold}.", args.disease);
        return Ok(());
    };
    render::feature_rows("Risk alleles", &view.partition(Partition::Risk));
    render::feature_rows("Protective alleles", &view.partition(Partition::Protective));
    render::tier_breakdown(&view.tiers);
    render::enrichment("Druggable genes", &prioritizer.enrichment(&view.druggable_genes()), config.output.top_n);
    Ok(())
}

#[derive(Debug, Args)]
pub struct NetworkArgs {
    #[arg(short, long)]
    pub disease: String,

    #[arg(long, default_value = "union", value_parser = parse_scope)]
    pub scope: StudyScope,

    #[arg(short, long)]
    pub p_value: Option<String>,

    /// Keep duplicate interaction rows when counting degree
    #[arg(long)]
    pub keep_duplicate_edges: bool,
}

pub fn network(config: &StargazerConfig, args: &NetworkArgs) -> anyhow::Result<()> {
    let threshold = config::threshold(args.p_value.as_deref(), config);
    let services = Services::build(&config.sources, false)?;
    let corpus = load_corpus(&config.catalog, services.gwas.as_ref())
        .context("Could not load the association corpus")?;
    report_overlays(&corpus);

    let prioritizer = Prioritizer::new(
        &corpus.store,
        services.diseases.as_ref(),
        services.interactions.as_ref(),
        &services.druggability,
    );
    let Some(nets) = prioritizer.network(
        &args.disease,
        args.scope,
        threshold,
        config.sources.dedup_interactions && !args.keep_duplicate_edges,
    ) else {
        println!("No data found for '{}' at p <= {threshold}.", args.disease);
        return Ok(());
    };
    for (partition, net) in &nets {
        render::degrees(*partition, &net.degrees);
        render::enrichment(partition.as_str(), &net.enrichment, config.output.top_n);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        args: PrioritizeArgs,
    }

    #[test]
    fn test_prioritize_args_parse() {
        let h = Harness::try_parse_from([
            "stargazer",
            "--disease",
            "Asthma",
            "--p-value",
            "1e-3",
            "--disable",
            "network_degree",
            "--disable",
            "co-occurrence",
            "--scope",
            "gwas",
        ])
        .unwrap();
        assert_eq!(h.args.disease, "Asthma");
        assert_eq!(h.args.p_value.as_deref(), Some("1e-3"));
        assert_eq!(h.args.scope, StudyScope::Gwas);

        let o = h.args.overrides(true);
        assert!(o.offline);
        assert_eq!(o.disabled_features, vec!["network_degree", "co-occurrence"]);
        assert_eq!(o.top_n, None);
    }

    #[test]
    fn test_unknown_scope_rejected() {
        assert!(Harness::try_parse_from(["stargazer", "--disease", "Asthma", "--scope", "cohort"]).is_err());
    }

    fn write_catalog(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("phewas.csv");
        std::fs::write(
            &path,
            "chromosome,snp,phewas phenotype,cases,p-value,odds-ratio,gene_name,phewas code,gwas-associations\n\
             5,rs20541,Asthma,1200,0.001,1.5,IL13,495,Asthma\n\
             17,rs7216389,Asthma,1100,0.01,0.8,GSDMB,495,\n",
        )
        .unwrap();
        path
    }

    fn offline_config(dir: &std::path::Path) -> StargazerConfig {
        let mut config = StargazerConfig::default();
        config.catalog.phewas_path = write_catalog(dir);
        config.sources.offline = true;
        config.sources.druggability_cache_dir = Some(dir.join("cache"));
        config.output.dir = dir.join("out");
        config
    }

    #[test]
    fn test_offline_prioritize_exports() {
        let dir = tempfile::tempdir().unwrap();
        let config = offline_config(dir.path());
        let args = Harness::try_parse_from(["stargazer", "--disease", "Asthma"]).unwrap().args;

        prioritize(&config, &args).unwrap();
        assert!(dir.path().join("out/asthma_report.json").exists());
        assert!(dir.path().join("out/asthma_overall_scores.csv").exists());
    }

    #[test]
    fn test_offline_prioritize_no_data_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = offline_config(dir.path());
        let args = Harness::try_parse_from(["stargazer", "--disease", "Psoriasis"]).unwrap().args;

        prioritize(&config, &args).unwrap();
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_offline_study_and_network_complete() {
        let dir = tempfile::tempdir().unwrap();
        let config = offline_config(dir.path());
        let study_args = StudyArgs {
            disease: "Asthma".to_string(),
            scope: StudyScope::Union,
            p_value: None,
            refresh_druggability: false,
        };
        study(&config, &study_args).unwrap();

        let network_args = NetworkArgs {
            disease: "Asthma".to_string(),
            scope: StudyScope::Union,
            p_value: None,
            keep_duplicate_edges: false,
        };
        network(&config, &network_args).unwrap();
    }

    #[test]
    fn test_missing_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = offline_config(dir.path());
        config.catalog.phewas_path = dir.path().join("absent.csv");
        assert!(diseases(&config, &DiseasesArgs { scope: StudyScope::Union }).is_err());
    }
}
