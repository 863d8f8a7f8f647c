//! Ledger collaborator traits

use crate::error::LedgerResult;
use crate::state::LedgerStateSnapshot;
use crate::types::{ContractCode, DeclaredClass, DeployRequest, DeployedInstance};
use async_trait::async_trait;
use hostevm_primitives::{ClassHash, ContractAddress, Felt};

/// Full-state copy and rebind.
///
/// `copy` captures the entire mutable state; `rebind` replaces the live state
/// with a previously captured copy. No diffing is involved.
pub trait StateStore: Send + Sync {
    /// Capture an immutable copy of the whole state
    fn copy(&self) -> LedgerResult<LedgerStateSnapshot>;

    /// Replace the live state with `snapshot`
    fn rebind(&self, snapshot: LedgerStateSnapshot);
}

/// Operations the harness issues against the underlying ledger (object-safe)
#[async_trait]
pub trait Ledger: StateStore {
    /// Declare a code body, returning its class
    async fn declare(&self, code: &ContractCode) -> LedgerResult<DeclaredClass>;

    /// Deploy an instance of a declared class
    async fn deploy(&self, request: DeployRequest) -> LedgerResult<DeployedInstance>;

    /// Invoke `method` on the instance at `address`
    async fn call(
        &self,
        address: &ContractAddress,
        method: &str,
        args: &[Felt],
    ) -> LedgerResult<Vec<Felt>>;

    /// Check whether `class_hash` is declared in the current state
    async fn is_declared(&self, class_hash: &ClassHash) -> LedgerResult<bool>;

    /// Check whether an instance lives at `address`
    async fn is_deployed(&self, address: &ContractAddress) -> LedgerResult<bool>;
}
