//! In-memory reference ledger

use crate::error::{LedgerError, LedgerResult};
use crate::program::{ExecutionContext, Program};
use crate::state::{ClassRecord, InstanceState, LedgerState, LedgerStateSnapshot, StateReader, StateWriter};
use crate::traits::{Ledger, StateStore};
use crate::types::{ContractCode, DeclaredClass, DeployRequest, DeployedInstance};
use async_trait::async_trait;
use hostevm_crypto::{calculate_contract_address, ledger_assigned_address, truncated_keccak};
use hostevm_primitives::{ClassHash, ContractAddress, Felt};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Ledger held entirely in memory.
///
/// Code bodies are content-addressed; each source identifier must have a
/// [`Program`] registered before it can be declared.
pub struct InMemoryLedger {
    /// Live state (rebound wholesale on restore)
    state: RwLock<LedgerState>,
    /// Programs by source identifier
    programs: RwLock<HashMap<String, Arc<dyn Program>>>,
    /// Declare operations received, including repeats
    declare_ops: AtomicU64,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    /// Create an empty ledger with no programs
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::new()),
            programs: RwLock::new(HashMap::new()),
            declare_ops: AtomicU64::new(0),
        }
    }

    /// Register `program` for `source_id` (builder form)
    pub fn with_program(self, source_id: impl Into<String>, program: Arc<dyn Program>) -> Self {
        self.register_program(source_id, program);
        self
    }

    /// Register `program` for `source_id`
    pub fn register_program(&self, source_id: impl Into<String>, program: Arc<dyn Program>) {
        self.programs.write().insert(source_id.into(), program);
    }

    /// Number of declare operations received so far
    pub fn declare_operations(&self) -> u64 {
        self.declare_ops.load(Ordering::SeqCst)
    }

    /// Run `f` against the live state
    pub fn read_state<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> R {
        f(&self.state.read())
    }

    /// Class hash of a code body
    pub fn class_hash_of(code: &ContractCode) -> ClassHash {
        ClassHash::new(truncated_keccak(&code.body))
    }

    fn resolve_address(
        request: &DeployRequest,
        state: &LedgerState,
    ) -> ContractAddress {
        match &request.salt {
            Some(salt) => calculate_contract_address(
                salt,
                &request.class_hash,
                &request.constructor_calldata,
                &request.deployer,
            ),
            None => ledger_assigned_address(state.deploy_counter(), &request.class_hash),
        }
    }
}

impl StateStore for InMemoryLedger {
    fn copy(&self) -> LedgerResult<LedgerStateSnapshot> {
        Ok(LedgerStateSnapshot::capture(&self.state.read()))
    }

    fn rebind(&self, snapshot: LedgerStateSnapshot) {
        *self.state.write() = snapshot.into_state();
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn declare(&self, code: &ContractCode) -> LedgerResult<DeclaredClass> {
        self.declare_ops.fetch_add(1, Ordering::SeqCst);

        if code.body.is_empty() {
            return Err(LedgerError::MalformedCode {
                source_id: code.source_id.clone(),
                reason: "empty code body".to_string(),
            });
        }

        let program = self
            .programs
            .read()
            .get(&code.source_id)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownProgram(code.source_id.clone()))?;

        let class_hash = Self::class_hash_of(code);
        let mut state = self.state.write();
        if let Some(existing) = state.get_class(&class_hash) {
            return Ok(existing.declared.clone());
        }

        let declared = DeclaredClass {
            class_hash,
            source_id: code.source_id.clone(),
            abi: program.entry_points().iter().map(|m| m.to_string()).collect(),
        };
        state.insert_class(ClassRecord {
            declared: declared.clone(),
            program,
        });
        tracing::debug!(source = %code.source_id, class_hash = %class_hash, "declared class");
        Ok(declared)
    }

    async fn deploy(&self, request: DeployRequest) -> LedgerResult<DeployedInstance> {
        let mut state = self.state.write();
        let program = state
            .get_class(&request.class_hash)
            .map(|record| Arc::clone(&record.program))
            .ok_or(LedgerError::UnknownClass(request.class_hash))?;

        let address = Self::resolve_address(&request, &state);
        if state.instance_exists(&address) {
            return Err(LedgerError::AlreadyDeployed(address));
        }

        let mut storage = BTreeMap::new();
        {
            let mut ctx = ExecutionContext::new(address, &mut storage);
            program.construct(&mut ctx, &request.constructor_calldata)?;
        }

        if request.salt.is_none() {
            state.next_deploy_index();
        }
        state.insert_instance(
            address,
            InstanceState {
                class_hash: request.class_hash,
                constructor_calldata: request.constructor_calldata.clone(),
                storage,
            },
        );
        tracing::debug!(%address, class_hash = %request.class_hash, program = program.name(), "deployed instance");

        Ok(DeployedInstance {
            address,
            class_hash: request.class_hash,
            constructor_calldata: request.constructor_calldata,
        })
    }

    async fn call(
        &self,
        address: &ContractAddress,
        method: &str,
        args: &[Felt],
    ) -> LedgerResult<Vec<Felt>> {
        let mut state = self.state.write();
        let instance = state
            .get_instance(address)
            .ok_or(LedgerError::NotDeployed(*address))?;
        let record = state
            .get_class(&instance.class_hash)
            .ok_or(LedgerError::UnknownClass(instance.class_hash))?;
        if !record.declared.has_entry_point(method) {
            return Err(LedgerError::UnknownEntryPoint {
                address: *address,
                method: method.to_string(),
            });
        }

        let program = Arc::clone(&record.program);
        let mut storage = instance.storage.clone();
        let output = {
            let mut ctx = ExecutionContext::new(*address, &mut storage);
            program.execute(&mut ctx, method, args)?
        };
        state.set_instance_storage(address, storage)?;
        Ok(output)
    }

    async fn is_declared(&self, class_hash: &ClassHash) -> LedgerResult<bool> {
        Ok(self.state.read().get_class(class_hash).is_some())
    }

    async fn is_deployed(&self, address: &ContractAddress) -> LedgerResult<bool> {
        Ok(self.state.read().instance_exists(address))
    }
}
