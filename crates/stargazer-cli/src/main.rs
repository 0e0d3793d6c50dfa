//! stargazer: rank candidate drug-target genes for a disease from
//! PheWAS/GWAS association catalogs.

mod commands;
mod config;
mod render;
mod services;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::Overrides;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Gene target prioritization from PheWAS and GWAS associations",
    long_about = "StarGazer scores the genes associated with a disease on effect size, \
    disease association, phenotype/GWAS co-occurrence, druggability and interaction \
    network degree, and ranks them for risk and protective alleles separately."
)]
struct Cli {
    /// Config file (TOML or YAML); defaults to $STARGAZER_CONFIG or ./stargazer.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Skip every network call; remote evidence counts as unavailable
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score and rank the genes of a disease
    Prioritize(commands::PrioritizeArgs),
    /// List the disease labels in the corpus
    Diseases(commands::DiseasesArgs),
    /// Associations of one gene, split into risk and protective
    Gene(commands::GeneArgs),
    /// Associations of one variant, split into risk and protective
    Variant(commands::VariantArgs),
    /// Filtered associations of a disease with druggability tiers
    Study(commands::StudyArgs),
    /// Interaction network degree of a disease's genes
    Network(commands::NetworkArgs),
}

fn log_filter(verbose: u8) -> EnvFilter {
    let default = match verbose {
        0 => "stargazer=info,warn",
        1 => "stargazer=debug,info",
        _ => "stargazer=trace,debug",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .init();

    debug!("Version: {}", env!("CARGO_PKG_VERSION"));

    let overrides = match &cli.command {
        Commands::Prioritize(args) => args.overrides(cli.offline),
        _ => Overrides { offline: cli.offline, ..Default::default() },
    };
    let config = config::load(cli.config.as_deref(), &overrides)?;
    if config.sources.offline {
        info!("Running offline");
    }

    match &cli.command {
        Commands::Prioritize(args) => commands::prioritize(&config, args),
        Commands::Diseases(args)   => commands::diseases(&config, args),
        Commands::Gene(args)       => commands::gene(&config, args),
        Commands::Variant(args)    => commands::variant(&config, args),
        Commands::Study(args)      => commands::study(&config, args),
        Commands::Network(args)    => commands::network(&config, args),
    }
}
