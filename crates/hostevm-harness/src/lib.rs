//! # hostevm-harness
//!
//! Session-level test harness for an EVM execution layer that runs as a set of
//! contracts on another ledger.
//!
//! ## Lifecycle
//!
//! 1. **Declare**: a [`ClassRegistry`] declares the native asset, the three
//!    account implementations and the dispatcher, once each, in that order
//! 2. **Bootstrap**: [`bootstrap`] deploys the native asset and the dispatcher
//!    and returns a read-only [`SessionEnvironment`]
//! 3. **Resolve**: [`SessionEnvironment::account_handle`] maps an emulated
//!    20-byte address to the ledger object derived for it
//! 4. **Isolate**: an [`IsolationManager`] snapshots the ledger before each
//!    test and rebinds it afterwards
//!
//! ## Usage
//!
//! ```ignore
//! let (ledger, env) = fixtures::fixture_session(Felt::ONE).await?;
//! let isolation = IsolationManager::new(ledger.clone());
//! let window = isolation.begin()?;
//! let account = env.account_handle(&Address::from_low_u64(0xabde1));
//! // ... exercise the ledger ...
//! isolation.end(window)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod config;
mod source;
mod registry;
mod session;
mod handle;
mod isolation;
pub mod fixtures;

pub use error::{HarnessError, HarnessResult, IsolationError};
pub use config::{ClassSources, HarnessConfig, NativeAssetConfig};
pub use source::{FsSourceLoader, MemorySourceLoader, SourceLoader};
pub use registry::{ClassKind, ClassRegistry, SessionClasses};
pub use session::{bootstrap, SessionEnvironment};
pub use handle::AccountHandle;
pub use isolation::{IsolationGuard, IsolationManager, SnapshotHandle};
