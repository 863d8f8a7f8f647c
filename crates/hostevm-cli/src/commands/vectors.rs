//! Conformance vector listing

use clap::Args;
use hostevm_vectors::{collect_cases, LoaderConfig};
use std::path::PathBuf;

use crate::output::{Format, Report};
use crate::CliError;

/// List the vectors selected for a ruleset
#[derive(Debug, Args)]
pub struct VectorsArgs {
    /// Corpus root (defaults to EF_TESTS_ROOT or the standard location)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Target ruleset
    #[arg(long)]
    pub network: Option<String>,
}

/// `hostevm vectors`
pub fn execute(args: VectorsArgs, json: bool) -> Result<(), CliError> {
    let mut config = LoaderConfig::from_env();
    config.enabled = true;
    if let Some(root) = args.root {
        config.root = root;
    }
    if let Some(network) = args.network {
        config.network = network;
    }

    let mut ids: Vec<String> = collect_cases(&config)?.into_iter().map(|(id, _)| id).collect();
    ids.sort();

    Report::titled(format!(
        "{} vectors for {} under {}",
        ids.len(),
        config.network,
        config.root.display()
    ))
    .text("network", &config.network)
    .text("root", config.root.display())
    .number("count", ids.len() as u64)
    .list("ids", &ids)
    .emit(Format::from_flag(json));

    Ok(())
}
