//! In-memory session bootstrap

use clap::Args;
use hostevm_harness::fixtures::{fixture_ledger, fixture_loader};
use hostevm_harness::{bootstrap, ClassRegistry, FsSourceLoader, HarnessConfig, SessionEnvironment, SourceLoader};
use hostevm_ledger::{DeclaredClass, Ledger};
use std::sync::Arc;

use super::parse_felt;
use crate::output::{Format, Report};
use crate::CliError;

/// Options shared by commands that need a session
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Owner identity (hex felt); defaults to the configured owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Read contract sources from the configured contracts root instead of built-in fixtures
    #[arg(long)]
    pub from_disk: bool,
}

/// Bootstrap a session on a fresh in-memory ledger
pub async fn start(
    config: &HarnessConfig,
    args: &SessionArgs,
) -> Result<(SessionEnvironment, ClassRegistry), CliError> {
    let owner = match &args.owner {
        Some(owner) => parse_felt(owner)?,
        None => config.owner,
    };

    let loader: Box<dyn SourceLoader> = if args.from_disk {
        Box::new(FsSourceLoader::new(&config.contracts_root))
    } else {
        Box::new(fixture_loader(&config.sources))
    };
    let mut registry = ClassRegistry::new(loader);
    let ledger: Arc<dyn Ledger> = Arc::new(fixture_ledger(&config.sources));

    let env = bootstrap(ledger, &mut registry, config, owner).await?;
    Ok((env, registry))
}

fn class_report(class: &DeclaredClass) -> Report {
    Report::section()
        .text("class_hash", class.class_hash.to_hex())
        .text("source", &class.source_id)
        .list("entry_points", &class.abi)
}

/// `hostevm bootstrap`
pub async fn execute(config: &HarnessConfig, args: SessionArgs, json: bool) -> Result<(), CliError> {
    let (env, registry) = start(config, &args).await?;
    let classes = env.classes();

    let proxy_check = env
        .ledger()
        .call(&env.dispatcher().address, "get_account_proxy_class_hash", &[])
        .await?;
    let dispatcher_agrees = proxy_check.first() == Some(&classes.account_proxy.class_hash.felt());

    Report::titled("Session ready")
        .text("owner", env.owner())
        .text("native_asset", env.native_asset().address)
        .text("dispatcher", env.dispatcher().address)
        .nest(
            "classes",
            Report::section()
                .nest("native_asset", class_report(&classes.native_asset))
                .nest("contract_account", class_report(&classes.contract_account))
                .nest("externally_owned_account", class_report(&classes.externally_owned_account))
                .nest("account_proxy", class_report(&classes.account_proxy))
                .nest("dispatcher", class_report(&classes.dispatcher)),
        )
        .number("ledger_declares", registry.ledger_declares() as u64)
        .flag("dispatcher_consistent", dispatcher_agrees)
        .emit(Format::from_flag(json));

    Ok(())
}
