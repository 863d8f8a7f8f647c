//! Deterministic contract address derivation
//!
//! ```text
//! address = hash_on_elements([
//!     CONTRACT_ADDRESS_PREFIX,
//!     deployer,
//!     salt,
//!     class_hash,
//!     hash_on_elements(constructor_calldata),
//! ]) mod (2^251 - 256)
//! ```
//!
//! The function is pure: given the same four inputs it returns the same
//! address in every process, so a test can tell where an emulated account
//! lives without asking the ledger.

use crate::error::DerivationError;
use crate::hash::hash_on_elements;
use hostevm_primitives::{Address, ClassHash, ContractAddress, Felt};

/// Domain separator for salted, deployer-scoped derivation
pub const CONTRACT_ADDRESS_PREFIX: Felt = Felt::from_short_str_const("STARKNET_CONTRACT_ADDRESS");

/// Domain separator for addresses the ledger assigns from its deploy counter
pub const LEDGER_ASSIGNED_PREFIX: Felt = Felt::from_short_str_const("LEDGER_ASSIGNED_ADDRESS");

/// Derive the address of a contract deployed by `deployer` from `class_hash`
/// with the given constructor calldata and salt.
pub fn calculate_contract_address(
    salt: &Felt,
    class_hash: &ClassHash,
    constructor_calldata: &[Felt],
    deployer: &ContractAddress,
) -> ContractAddress {
    let calldata_hash = hash_on_elements(constructor_calldata);
    let raw = hash_on_elements(&[
        CONTRACT_ADDRESS_PREFIX,
        deployer.felt(),
        *salt,
        class_hash.felt(),
        calldata_hash,
    ]);
    ContractAddress::from_felt_reduced(raw)
}

/// Byte-level entry point: every argument must be exactly 32 big-endian bytes
/// encoding a value below the field prime, and `deployer` must also be a valid
/// contract address.
///
/// Malformed input is rejected; nothing is truncated or padded.
pub fn calculate_contract_address_raw(
    salt: &[u8],
    class_hash: &[u8],
    constructor_calldata: &[&[u8]],
    deployer: &[u8],
) -> Result<ContractAddress, DerivationError> {
    let salt = Felt::from_slice(salt)
        .map_err(|source| DerivationError::InvalidInput { field: "salt", source })?;
    let class_hash = Felt::from_slice(class_hash)
        .map(ClassHash::new)
        .map_err(|source| DerivationError::InvalidInput { field: "class_hash", source })?;
    let deployer = Felt::from_slice(deployer)
        .and_then(ContractAddress::new)
        .map_err(|source| DerivationError::InvalidInput { field: "deployer", source })?;
    let calldata = constructor_calldata
        .iter()
        .map(|word| Felt::from_slice(word))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| DerivationError::InvalidInput {
            field: "constructor_calldata",
            source,
        })?;

    Ok(calculate_contract_address(&salt, &class_hash, &calldata, &deployer))
}

/// Address the ledger assigns to its `index`-th unsalted deployment.
///
/// Uses its own prefix, so it never coincides with a salted derivation.
pub fn ledger_assigned_address(index: u64, class_hash: &ClassHash) -> ContractAddress {
    let raw = hash_on_elements(&[
        LEDGER_ASSIGNED_PREFIX,
        Felt::from_u64(index),
        class_hash.felt(),
    ]);
    ContractAddress::from_felt_reduced(raw)
}

/// Salt used for an emulated account: its 20 bytes as a big-endian integer
pub fn account_salt(address: &Address) -> Felt {
    Felt::from(*address)
}
