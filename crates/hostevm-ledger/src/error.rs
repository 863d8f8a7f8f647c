//! Ledger fault types

use hostevm_primitives::{ClassHash, ContractAddress};
use thiserror::Error;

/// Faults reported by the ledger
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Declared code body is empty or otherwise unusable
    #[error("malformed code for `{source_id}`: {reason}")]
    MalformedCode {
        /// Source identifier of the rejected code
        source_id: String,
        /// Why it was rejected
        reason: String,
    },

    /// No program is registered for the declared source
    #[error("no program registered for source `{0}`")]
    UnknownProgram(String),

    /// Class hash was never declared
    #[error("class {0} is not declared")]
    UnknownClass(ClassHash),

    /// Target address already holds an instance
    #[error("address {0} is already deployed")]
    AlreadyDeployed(ContractAddress),

    /// No instance at the target address
    #[error("no contract deployed at {0}")]
    NotDeployed(ContractAddress),

    /// Method is not an entry point of the class
    #[error("unknown entry point `{method}` on {address}")]
    UnknownEntryPoint {
        /// Called address
        address: ContractAddress,
        /// Requested method
        method: String,
    },

    /// Program execution failed
    #[error("execution failed: {0}")]
    Execution(String),

    /// State copy failed
    #[error("state copy failed: {0}")]
    StateCopy(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
