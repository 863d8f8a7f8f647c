//! Address derivation command

use clap::Args;
use hostevm_crypto::{account_salt, calculate_contract_address};
use hostevm_harness::HarnessConfig;
use hostevm_primitives::{ClassHash, Felt};

use super::session::{start, SessionArgs};
use super::{parse_address, parse_contract_address, parse_felt};
use crate::output::{Format, Report};
use crate::CliError;

/// Derive the ledger address of an emulated account
#[derive(Debug, Args)]
pub struct AddressArgs {
    /// Emulated 20-byte address (hex)
    pub evm_address: String,

    /// Deployer address; with --class-hash, skips the session bootstrap
    #[arg(long, requires = "class_hash")]
    pub deployer: Option<String>,

    /// Deployed class hash
    #[arg(long, requires = "deployer")]
    pub class_hash: Option<String>,

    /// Constructor calldata (hex felts)
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    pub calldata: Vec<String>,

    #[command(flatten)]
    pub session: SessionArgs,
}

/// `hostevm address`
pub async fn execute(config: &HarnessConfig, args: AddressArgs, json: bool) -> Result<(), CliError> {
    let evm_address = parse_address(&args.evm_address)?;
    let calldata = args
        .calldata
        .iter()
        .map(|s| parse_felt(s))
        .collect::<Result<Vec<Felt>, _>>()?;

    let (deployer, class_hash) = match (&args.deployer, &args.class_hash) {
        (Some(deployer), Some(class_hash)) => (
            parse_contract_address(deployer)?,
            ClassHash::new(parse_felt(class_hash)?),
        ),
        _ => {
            let (env, _) = start(config, &args.session).await?;
            (env.dispatcher().address, env.classes().account_proxy.class_hash)
        }
    };

    let derived = calculate_contract_address(&account_salt(&evm_address), &class_hash, &calldata, &deployer);
    tracing::debug!(evm = %evm_address, derived = %derived, "derived account address");

    Report::titled(format!("{} -> {}", evm_address, derived))
        .text("evm_address", evm_address)
        .text("starknet_address", derived)
        .text("deployer", deployer)
        .text("class_hash", class_hash)
        .emit(Format::from_flag(json));

    Ok(())
}
