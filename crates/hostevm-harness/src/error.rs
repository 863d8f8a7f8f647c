//! Harness error types

use hostevm_ledger::LedgerError;
use hostevm_primitives::{ContractAddress, FeltError};
use thiserror::Error;

/// Harness errors
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Session setup failed; the session is unusable
    #[error("setup failed while {stage}: {source}")]
    Setup {
        /// Bootstrap step that failed
        stage: String,
        /// Underlying fault
        #[source]
        source: Box<HarnessError>,
    },

    /// Contract source could not be read
    #[error("cannot load contract source `{source_id}`: {reason}")]
    Source {
        /// Source identifier
        source_id: String,
        /// Why loading failed
        reason: String,
    },

    /// Method is not part of the handle's interface
    #[error("`{method}` is not an entry point of the account interface at {address}")]
    UnknownEntryPoint {
        /// Handle address
        address: ContractAddress,
        /// Requested method
        method: String,
    },

    /// Ledger fault during a call
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Value encoding error
    #[error("felt error: {0}")]
    Felt(#[from] FeltError),

    /// Isolation error
    #[error("isolation error: {0}")]
    Isolation(#[from] IsolationError),
}

impl HarnessError {
    /// Wrap a fault raised during setup. An error that is already a setup
    /// failure keeps its original stage.
    pub fn setup(stage: impl Into<String>, source: impl Into<HarnessError>) -> Self {
        match source.into() {
            err @ HarnessError::Setup { .. } => err,
            err => HarnessError::Setup {
                stage: stage.into(),
                source: Box::new(err),
            },
        }
    }

    /// Whether this is a setup failure
    pub fn is_setup(&self) -> bool {
        matches!(self, HarnessError::Setup { .. })
    }
}

/// Isolation window errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IsolationError {
    /// `begin` while another window is open
    #[error("isolation window {0} is still open; windows cannot nest")]
    WindowOpen(u64),

    /// `end` with a handle that does not belong to the open window
    #[error("snapshot handle belongs to window {got}, open window is {open:?}")]
    ForeignHandle {
        /// Window the handle was issued for
        got: u64,
        /// Currently open window, if any
        open: Option<u64>,
    },

    /// State copy failed; test infrastructure is broken
    #[error("state copy failed: {0}")]
    Copy(String),
}

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_keeps_innermost_stage() {
        let inner = HarnessError::setup("declaring a.cairo", LedgerError::UnknownProgram("a.cairo".into()));
        let outer = HarnessError::setup("declaring session classes", inner);

        match outer {
            HarnessError::Setup { stage, source } => {
                assert_eq!(stage, "declaring a.cairo");
                assert!(matches!(*source, HarnessError::Ledger(LedgerError::UnknownProgram(_))));
            }
            other => panic!("expected setup error, got {other:?}"),
        }
    }

    #[test]
    fn test_setup_wraps_source_errors() {
        let err = HarnessError::setup(
            "loading a.cairo",
            HarnessError::Source {
                source_id: "a.cairo".into(),
                reason: "missing".into(),
            },
        );
        assert!(err.is_setup());
        assert!(err.to_string().starts_with("setup failed while loading a.cairo"));
    }
}
