//! Native programs backing declared classes

use crate::error::{LedgerError, LedgerResult};
use hostevm_crypto::{hash_pair, truncated_keccak};
use hostevm_primitives::{ContractAddress, Felt};
use std::collections::BTreeMap;

/// Behavior of a declared class inside the in-memory ledger
pub trait Program: Send + Sync {
    /// Human-readable program name
    fn name(&self) -> &str;

    /// Callable entry points (the class ABI)
    fn entry_points(&self) -> &'static [&'static str];

    /// Run the constructor of a fresh instance
    fn construct(&self, ctx: &mut ExecutionContext<'_>, calldata: &[Felt]) -> LedgerResult<()>;

    /// Run an entry point. `method` is guaranteed to be in [`Program::entry_points`].
    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        method: &str,
        args: &[Felt],
    ) -> LedgerResult<Vec<Felt>>;
}

/// Storage key of a single-valued storage variable
pub fn storage_var_key(name: &str) -> Felt {
    truncated_keccak(name.as_bytes())
}

/// Storage key of `name[key]` for a mapping storage variable
pub fn storage_map_key(name: &str, key: &Felt) -> Felt {
    hash_pair(&storage_var_key(name), key)
}

/// What a program sees while running: its own address and storage
pub struct ExecutionContext<'a> {
    address: ContractAddress,
    storage: &'a mut BTreeMap<Felt, Felt>,
}

impl<'a> ExecutionContext<'a> {
    /// Create a context over an instance's storage
    pub fn new(address: ContractAddress, storage: &'a mut BTreeMap<Felt, Felt>) -> Self {
        Self { address, storage }
    }

    /// Address of the running instance
    pub fn address(&self) -> ContractAddress {
        self.address
    }

    /// Read a slot (zero if unset)
    pub fn read(&self, key: &Felt) -> Felt {
        self.storage.get(key).copied().unwrap_or(Felt::ZERO)
    }

    /// Write a slot; writing zero clears it
    pub fn write(&mut self, key: Felt, value: Felt) {
        if value.is_zero() {
            self.storage.remove(&key);
        } else {
            self.storage.insert(key, value);
        }
    }

    /// Fetch argument `index`, failing if the call was too short
    pub fn arg(args: &[Felt], index: usize, method: &str) -> LedgerResult<Felt> {
        args.get(index).copied().ok_or_else(|| {
            LedgerError::Execution(format!(
                "{}: expected at least {} arguments, got {}",
                method,
                index + 1,
                args.len()
            ))
        })
    }
}
