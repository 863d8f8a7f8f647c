//! Ledger state and snapshots

use crate::error::{LedgerError, LedgerResult};
use crate::program::Program;
use crate::types::DeclaredClass;
use hostevm_primitives::{ClassHash, ContractAddress, Felt};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A declared class together with the program that executes it
#[derive(Clone)]
pub struct ClassRecord {
    /// Declaration result
    pub declared: DeclaredClass,
    /// Executing program
    pub program: Arc<dyn Program>,
}

impl fmt::Debug for ClassRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRecord")
            .field("declared", &self.declared)
            .field("program", &self.program.name())
            .finish()
    }
}

/// Mutable state of one deployed instance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceState {
    /// Class the instance runs
    pub class_hash: ClassHash,
    /// Arguments the constructor received
    pub constructor_calldata: Vec<Felt>,
    /// Storage slots (absent = zero)
    pub storage: BTreeMap<Felt, Felt>,
}

/// The whole mutable ledger state
#[derive(Clone, Debug, Default)]
pub struct LedgerState {
    classes: BTreeMap<ClassHash, ClassRecord>,
    instances: BTreeMap<ContractAddress, InstanceState>,
    deploy_counter: u64,
}

impl LedgerState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declared classes
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of deployed instances
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of ledger-assigned deployments so far
    pub fn deploy_counter(&self) -> u64 {
        self.deploy_counter
    }
}

/// Read access to ledger state
pub trait StateReader {
    /// Get a declared class
    fn get_class(&self, class_hash: &ClassHash) -> Option<&ClassRecord>;

    /// Get an instance
    fn get_instance(&self, address: &ContractAddress) -> Option<&InstanceState>;

    /// Get a storage slot of an instance (zero if unset or not deployed)
    fn get_storage(&self, address: &ContractAddress, key: &Felt) -> Felt {
        self.get_instance(address)
            .and_then(|instance| instance.storage.get(key).copied())
            .unwrap_or(Felt::ZERO)
    }

    /// Check if an instance exists
    fn instance_exists(&self, address: &ContractAddress) -> bool {
        self.get_instance(address).is_some()
    }
}

/// Write access to ledger state
pub trait StateWriter {
    /// Record a declared class
    fn insert_class(&mut self, record: ClassRecord);

    /// Record a new instance
    fn insert_instance(&mut self, address: ContractAddress, instance: InstanceState);

    /// Replace the storage of an existing instance
    fn set_instance_storage(
        &mut self,
        address: &ContractAddress,
        storage: BTreeMap<Felt, Felt>,
    ) -> LedgerResult<()>;

    /// Take the next index for a ledger-assigned address
    fn next_deploy_index(&mut self) -> u64;
}

impl StateReader for LedgerState {
    fn get_class(&self, class_hash: &ClassHash) -> Option<&ClassRecord> {
        self.classes.get(class_hash)
    }

    fn get_instance(&self, address: &ContractAddress) -> Option<&InstanceState> {
        self.instances.get(address)
    }
}

impl StateWriter for LedgerState {
    fn insert_class(&mut self, record: ClassRecord) {
        self.classes.insert(record.declared.class_hash, record);
    }

    fn insert_instance(&mut self, address: ContractAddress, instance: InstanceState) {
        self.instances.insert(address, instance);
    }

    fn set_instance_storage(
        &mut self,
        address: &ContractAddress,
        storage: BTreeMap<Felt, Felt>,
    ) -> LedgerResult<()> {
        let instance = self
            .instances
            .get_mut(address)
            .ok_or(LedgerError::NotDeployed(*address))?;
        instance.storage = storage;
        Ok(())
    }

    fn next_deploy_index(&mut self) -> u64 {
        let index = self.deploy_counter;
        self.deploy_counter += 1;
        index
    }
}

/// Immutable copy of the whole ledger state at a point in time
#[derive(Clone, Debug)]
pub struct LedgerStateSnapshot {
    state: LedgerState,
}

impl LedgerStateSnapshot {
    /// Capture a copy of `state`
    pub fn capture(state: &LedgerState) -> Self {
        Self {
            state: state.clone(),
        }
    }

    /// Consume the snapshot, yielding the state to rebind
    pub fn into_state(self) -> LedgerState {
        self.state
    }

    /// Read-only view of the captured state
    pub fn state(&self) -> &LedgerState {
        &self.state
    }
}

impl StateReader for LedgerStateSnapshot {
    fn get_class(&self, class_hash: &ClassHash) -> Option<&ClassRecord> {
        self.state.get_class(class_hash)
    }

    fn get_instance(&self, address: &ContractAddress) -> Option<&InstanceState> {
        self.state.get_instance(address)
    }
}
