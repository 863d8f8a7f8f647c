//! Native fixture programs for the in-memory ledger.
//!
//! These stand in for the session contracts so a full session can be
//! bootstrapped without a real ledger:
//! - [`NativeAssetProgram`]: fungible token with owner-less mint and burn
//! - [`DispatcherProgram`]: records its constructor inputs and derives account addresses
//! - [`AccountProgram`]: contract account, externally-owned account and account proxy

use crate::config::{ClassSources, HarnessConfig};
use crate::error::HarnessResult;
use crate::registry::ClassRegistry;
use crate::session::{bootstrap, SessionEnvironment};
use crate::source::MemorySourceLoader;
use hostevm_crypto::calculate_contract_address;
use hostevm_ledger::{
    storage_map_key, storage_var_key, ExecutionContext, InMemoryLedger, Ledger, LedgerError,
    LedgerResult, Program,
};
use hostevm_primitives::{ClassHash, Felt, U256};
use std::sync::Arc;

fn felt_add(a: Felt, b: Felt, what: &str) -> LedgerResult<Felt> {
    let sum = a
        .to_u256()
        .checked_add(b.to_u256())
        .ok_or_else(|| LedgerError::Execution(format!("{}: overflow", what)))?;
    Felt::try_from(sum).map_err(|_| LedgerError::Execution(format!("{}: overflow", what)))
}

fn felt_sub(a: Felt, b: Felt, what: &str) -> LedgerResult<Felt> {
    let diff = a
        .to_u256()
        .checked_sub(b.to_u256())
        .ok_or_else(|| LedgerError::Execution(format!("{}: insufficient balance", what)))?;
    Felt::try_from(diff).map_err(|e| LedgerError::Execution(e.to_string()))
}

fn felt_to_index(value: Felt, what: &str) -> LedgerResult<u64> {
    let value = value.to_u256();
    if value > U256::from(u32::MAX) {
        return Err(LedgerError::Execution(format!("{}: length out of range", what)));
    }
    Ok(value.low_u64())
}

// ==================== Native asset ====================

const NATIVE_ASSET_ENTRY_POINTS: &[&str] = &[
    "name",
    "symbol",
    "decimals",
    "totalSupply",
    "balanceOf",
    "mint",
    "burn",
];

/// Fungible token. Constructor: `[name, symbol, decimals]`.
#[derive(Debug, Default)]
pub struct NativeAssetProgram;

impl Program for NativeAssetProgram {
    fn name(&self) -> &str {
        "native_asset"
    }

    fn entry_points(&self) -> &'static [&'static str] {
        NATIVE_ASSET_ENTRY_POINTS
    }

    fn construct(&self, ctx: &mut ExecutionContext<'_>, calldata: &[Felt]) -> LedgerResult<()> {
        ctx.write(storage_var_key("name"), ExecutionContext::arg(calldata, 0, "constructor")?);
        ctx.write(storage_var_key("symbol"), ExecutionContext::arg(calldata, 1, "constructor")?);
        ctx.write(storage_var_key("decimals"), ExecutionContext::arg(calldata, 2, "constructor")?);
        Ok(())
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        method: &str,
        args: &[Felt],
    ) -> LedgerResult<Vec<Felt>> {
        match method {
            "name" | "symbol" | "decimals" => Ok(vec![ctx.read(&storage_var_key(method))]),
            "totalSupply" => Ok(vec![ctx.read(&storage_var_key("total_supply"))]),
            "balanceOf" => {
                let account = ExecutionContext::arg(args, 0, method)?;
                Ok(vec![ctx.read(&storage_map_key("balances", &account))])
            }
            "mint" => {
                let account = ExecutionContext::arg(args, 0, method)?;
                let amount = ExecutionContext::arg(args, 1, method)?;
                let balance_key = storage_map_key("balances", &account);
                let supply_key = storage_var_key("total_supply");
                let supply = felt_add(ctx.read(&supply_key), amount, method)?;
                let balance = felt_add(ctx.read(&balance_key), amount, method)?;
                ctx.write(supply_key, supply);
                ctx.write(balance_key, balance);
                Ok(vec![])
            }
            "burn" => {
                let account = ExecutionContext::arg(args, 0, method)?;
                let amount = ExecutionContext::arg(args, 1, method)?;
                let balance_key = storage_map_key("balances", &account);
                let supply_key = storage_var_key("total_supply");
                let balance = felt_sub(ctx.read(&balance_key), amount, method)?;
                let supply = felt_sub(ctx.read(&supply_key), amount, method)?;
                ctx.write(balance_key, balance);
                ctx.write(supply_key, supply);
                Ok(vec![])
            }
            other => Err(LedgerError::Execution(format!("unhandled entry point {}", other))),
        }
    }
}

// ==================== Dispatcher ====================

const DISPATCHER_ENTRY_POINTS: &[&str] = &[
    "get_owner",
    "get_native_token",
    "get_contract_account_class_hash",
    "get_externally_owned_account_class_hash",
    "get_account_proxy_class_hash",
    "compute_starknet_address",
];

/// Constructor slots, in calldata order
const DISPATCHER_SLOTS: [&str; 5] = [
    "owner",
    "native_token",
    "contract_account_class_hash",
    "externally_owned_account_class_hash",
    "account_proxy_class_hash",
];

/// Session dispatcher. Constructor:
/// `[owner, native_token, contract_account_class, eoa_class, account_proxy_class]`.
#[derive(Debug, Default)]
pub struct DispatcherProgram;

impl Program for DispatcherProgram {
    fn name(&self) -> &str {
        "dispatcher"
    }

    fn entry_points(&self) -> &'static [&'static str] {
        DISPATCHER_ENTRY_POINTS
    }

    fn construct(&self, ctx: &mut ExecutionContext<'_>, calldata: &[Felt]) -> LedgerResult<()> {
        for (index, slot) in DISPATCHER_SLOTS.iter().enumerate() {
            let value = ExecutionContext::arg(calldata, index, "constructor")?;
            ctx.write(storage_var_key(slot), value);
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        method: &str,
        args: &[Felt],
    ) -> LedgerResult<Vec<Felt>> {
        let slot = match method {
            "get_owner" => "owner",
            "get_native_token" => "native_token",
            "get_contract_account_class_hash" => "contract_account_class_hash",
            "get_externally_owned_account_class_hash" => "externally_owned_account_class_hash",
            "get_account_proxy_class_hash" => "account_proxy_class_hash",
            "compute_starknet_address" => {
                let evm_address = ExecutionContext::arg(args, 0, method)?;
                let proxy = ClassHash::new(ctx.read(&storage_var_key("account_proxy_class_hash")));
                let address = calculate_contract_address(&evm_address, &proxy, &[], &ctx.address());
                return Ok(vec![address.felt()]);
            }
            other => {
                return Err(LedgerError::Execution(format!("unhandled entry point {}", other)))
            }
        };
        Ok(vec![ctx.read(&storage_var_key(slot))])
    }
}

// ==================== Accounts ====================

const CONTRACT_ACCOUNT_ENTRY_POINTS: &[&str] = &[
    "get_evm_address",
    "get_dispatcher",
    "get_nonce",
    "increment_nonce",
    "storage",
    "write_storage",
    "bytecode",
    "write_bytecode",
];

const EOA_ENTRY_POINTS: &[&str] = &[
    "get_evm_address",
    "get_dispatcher",
    "get_nonce",
    "increment_nonce",
];

const PROXY_ENTRY_POINTS: &[&str] = &[
    "initialize",
    "get_implementation",
    "get_evm_address",
    "get_dispatcher",
    "get_nonce",
    "increment_nonce",
    "storage",
    "write_storage",
    "bytecode",
    "write_bytecode",
];

/// Account flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    /// Account holding bytecode and storage
    ContractAccount,
    /// Account controlled by a key
    ExternallyOwned,
    /// Deployment target of derived accounts, initialized after deploy
    Proxy,
}

/// Emulated account program.
///
/// Contract and externally-owned accounts take `[dispatcher, evm_address]` as
/// constructor calldata. A proxy is deployed with empty calldata and serves
/// the contract-account interface once `initialize(implementation, dispatcher,
/// evm_address)` has run.
#[derive(Debug)]
pub struct AccountProgram {
    kind: AccountKind,
}

impl AccountProgram {
    /// Create a program of `kind`
    pub fn new(kind: AccountKind) -> Self {
        Self { kind }
    }

    /// Account flavor
    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    fn initialized(ctx: &ExecutionContext<'_>) -> bool {
        !ctx.read(&storage_var_key("implementation")).is_zero()
    }

    fn account_call(
        &self,
        ctx: &mut ExecutionContext<'_>,
        method: &str,
        args: &[Felt],
    ) -> LedgerResult<Vec<Felt>> {
        match method {
            "get_evm_address" => Ok(vec![ctx.read(&storage_var_key("evm_address"))]),
            "get_dispatcher" => Ok(vec![ctx.read(&storage_var_key("dispatcher"))]),
            "get_nonce" => Ok(vec![ctx.read(&storage_var_key("nonce"))]),
            "increment_nonce" => {
                let key = storage_var_key("nonce");
                let nonce = felt_add(ctx.read(&key), Felt::ONE, method)?;
                ctx.write(key, nonce);
                Ok(vec![nonce])
            }
            "storage" => {
                let key = ExecutionContext::arg(args, 0, method)?;
                Ok(vec![ctx.read(&storage_map_key("storage", &key))])
            }
            "write_storage" => {
                let key = ExecutionContext::arg(args, 0, method)?;
                let value = ExecutionContext::arg(args, 1, method)?;
                ctx.write(storage_map_key("storage", &key), value);
                Ok(vec![])
            }
            "bytecode" => {
                let len = felt_to_index(ctx.read(&storage_var_key("bytecode_len")), method)?;
                let mut words = Vec::with_capacity(len as usize);
                for i in 0..len {
                    words.push(ctx.read(&storage_map_key("bytecode", &Felt::from_u64(i))));
                }
                Ok(words)
            }
            "write_bytecode" => {
                let old_len = felt_to_index(ctx.read(&storage_var_key("bytecode_len")), method)?;
                for i in 0..old_len {
                    ctx.write(storage_map_key("bytecode", &Felt::from_u64(i)), Felt::ZERO);
                }
                for (i, word) in args.iter().enumerate() {
                    ctx.write(storage_map_key("bytecode", &Felt::from_u64(i as u64)), *word);
                }
                ctx.write(storage_var_key("bytecode_len"), Felt::from_u64(args.len() as u64));
                Ok(vec![])
            }
            other => Err(LedgerError::Execution(format!("unhandled entry point {}", other))),
        }
    }
}

impl Program for AccountProgram {
    fn name(&self) -> &str {
        match self.kind {
            AccountKind::ContractAccount => "contract_account",
            AccountKind::ExternallyOwned => "externally_owned_account",
            AccountKind::Proxy => "account_proxy",
        }
    }

    fn entry_points(&self) -> &'static [&'static str] {
        match self.kind {
            AccountKind::ContractAccount => CONTRACT_ACCOUNT_ENTRY_POINTS,
            AccountKind::ExternallyOwned => EOA_ENTRY_POINTS,
            AccountKind::Proxy => PROXY_ENTRY_POINTS,
        }
    }

    fn construct(&self, ctx: &mut ExecutionContext<'_>, calldata: &[Felt]) -> LedgerResult<()> {
        if self.kind == AccountKind::Proxy {
            return Ok(());
        }
        ctx.write(storage_var_key("dispatcher"), ExecutionContext::arg(calldata, 0, "constructor")?);
        ctx.write(storage_var_key("evm_address"), ExecutionContext::arg(calldata, 1, "constructor")?);
        Ok(())
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        method: &str,
        args: &[Felt],
    ) -> LedgerResult<Vec<Felt>> {
        if self.kind != AccountKind::Proxy {
            return self.account_call(ctx, method, args);
        }

        match method {
            "initialize" => {
                if Self::initialized(ctx) {
                    return Err(LedgerError::Execution("proxy already initialized".to_string()));
                }
                let implementation = ExecutionContext::arg(args, 0, method)?;
                if implementation.is_zero() {
                    return Err(LedgerError::Execution("initialize: zero implementation".to_string()));
                }
                ctx.write(storage_var_key("implementation"), implementation);
                ctx.write(storage_var_key("dispatcher"), ExecutionContext::arg(args, 1, method)?);
                ctx.write(storage_var_key("evm_address"), ExecutionContext::arg(args, 2, method)?);
                Ok(vec![])
            }
            "get_implementation" => Ok(vec![ctx.read(&storage_var_key("implementation"))]),
            _ if !Self::initialized(ctx) => Err(LedgerError::Execution(format!(
                "{}: proxy at {} is not initialized",
                method,
                ctx.address()
            ))),
            _ => self.account_call(ctx, method, args),
        }
    }
}

// ==================== Wiring ====================

/// Code body served for a fixture source
fn fixture_body(source_id: &str, program: &dyn Program) -> Vec<u8> {
    format!("{}:{}", program.name(), source_id).into_bytes()
}

fn fixture_programs(sources: &ClassSources) -> Vec<(String, Arc<dyn Program>)> {
    let native_asset: Arc<dyn Program> = Arc::new(NativeAssetProgram);
    let contract_account: Arc<dyn Program> = Arc::new(AccountProgram::new(AccountKind::ContractAccount));
    let eoa: Arc<dyn Program> = Arc::new(AccountProgram::new(AccountKind::ExternallyOwned));
    let proxy: Arc<dyn Program> = Arc::new(AccountProgram::new(AccountKind::Proxy));
    let dispatcher: Arc<dyn Program> = Arc::new(DispatcherProgram);
    vec![
        (sources.native_asset.clone(), native_asset),
        (sources.contract_account.clone(), contract_account),
        (sources.externally_owned_account.clone(), eoa),
        (sources.account_proxy.clone(), proxy),
        (sources.dispatcher.clone(), dispatcher),
    ]
}

/// In-memory ledger with a fixture program registered for each session source
pub fn fixture_ledger(sources: &ClassSources) -> InMemoryLedger {
    let ledger = InMemoryLedger::new();
    for (source_id, program) in fixture_programs(sources) {
        ledger.register_program(source_id, program);
    }
    ledger
}

/// Source loader serving a distinct body for each session source
pub fn fixture_loader(sources: &ClassSources) -> MemorySourceLoader {
    let mut loader = MemorySourceLoader::new();
    for (source_id, program) in fixture_programs(sources) {
        let body = fixture_body(&source_id, program.as_ref());
        loader.insert(source_id, body);
    }
    loader
}

/// Bootstrap a session on a fresh fixture ledger with the default configuration
pub async fn fixture_session(
    owner: Felt,
) -> HarnessResult<(Arc<InMemoryLedger>, SessionEnvironment)> {
    let config = HarnessConfig::default();
    let ledger = Arc::new(fixture_ledger(&config.sources));
    let mut registry = ClassRegistry::new(Box::new(fixture_loader(&config.sources)));
    let shared: Arc<dyn Ledger> = ledger.clone();
    let env = bootstrap(shared, &mut registry, &config, owner).await?;
    Ok((ledger, env))
}
