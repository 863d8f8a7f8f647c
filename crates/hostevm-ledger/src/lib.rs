//! # hostevm-ledger
//!
//! The underlying ledger as seen by the harness.
//!
//! This crate provides:
//! - [`Ledger`]: declare / deploy / call, all asynchronous
//! - [`StateStore`]: full-state copy and rebind, for test isolation
//! - [`InMemoryLedger`]: a reference ledger whose contracts are native [`Program`]s
//!
//! The in-memory ledger does not interpret contract code. A declared code body
//! is content-addressed into a [`ClassHash`](hostevm_primitives::ClassHash) and
//! bound to the program registered under its source identifier.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod types;
mod traits;
mod state;
mod program;
mod memory;

pub use error::{LedgerError, LedgerResult};
pub use types::{ContractCode, DeclaredClass, DeployRequest, DeployedInstance};
pub use traits::{Ledger, StateStore};
pub use state::{ClassRecord, InstanceState, LedgerState, LedgerStateSnapshot, StateReader, StateWriter};
pub use program::{storage_map_key, storage_var_key, ExecutionContext, Program};
pub use memory::InMemoryLedger;
