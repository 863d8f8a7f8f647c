//! # hostevm-crypto
//!
//! Hashing primitives and the address derivation engine.
//!
//! - Keccak-256 hashing
//! - 250-bit truncated Keccak and chained element hashing
//! - Deterministic contract address derivation

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;
mod address;
mod error;

pub use hash::{keccak256, truncated_keccak, hash_pair, hash_on_elements};
pub use address::{
    calculate_contract_address, calculate_contract_address_raw, ledger_assigned_address,
    account_salt, CONTRACT_ADDRESS_PREFIX, LEDGER_ASSIGNED_PREFIX,
};
pub use error::DerivationError;
