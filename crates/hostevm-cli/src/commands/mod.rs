//! CLI subcommands

pub mod address;
pub mod session;
pub mod vectors;

use crate::CliError;
use hostevm_primitives::{Address, ContractAddress, Felt};

pub(crate) fn parse_address(s: &str) -> Result<Address, CliError> {
    Address::from_hex(s).map_err(|e| CliError::InvalidAddress(format!("{}: {}", s, e)))
}

pub(crate) fn parse_felt(s: &str) -> Result<Felt, CliError> {
    Felt::from_hex(s).map_err(|e| CliError::InvalidFelt(format!("{}: {}", s, e)))
}

pub(crate) fn parse_contract_address(s: &str) -> Result<ContractAddress, CliError> {
    ContractAddress::from_hex(s).map_err(|e| CliError::InvalidFelt(format!("{}: {}", s, e)))
}
