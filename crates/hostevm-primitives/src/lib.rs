//! # hostevm-primitives
//!
//! Value types shared across the hostevm workspace.
//!
//! Two address spaces meet in this harness:
//! - [`Address`]: a 20-byte account in the emulated EVM address space
//! - [`ContractAddress`]: a field element addressing an object on the underlying ledger
//!
//! [`ClassHash`] identifies a declared implementation class on the ledger.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod felt;
mod contract;

pub use address::{Address, AddressError};
pub use felt::{Felt, FeltError};
pub use contract::{ClassHash, ContractAddress};

// Re-export primitive-types for range arithmetic
pub use primitive_types::U256;
