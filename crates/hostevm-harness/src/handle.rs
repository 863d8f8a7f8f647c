//! Account handles

use crate::error::{HarnessError, HarnessResult};
use hostevm_ledger::{DeclaredClass, Ledger};
use hostevm_primitives::{Address, ContractAddress, Felt};
use std::fmt;
use std::sync::Arc;

/// A ledger address bound to an account interface.
///
/// Creating a handle performs no ledger access; the object behind it may not
/// be deployed yet.
#[derive(Clone)]
pub struct AccountHandle {
    ledger: Arc<dyn Ledger>,
    address: ContractAddress,
    evm_address: Option<Address>,
    interface: DeclaredClass,
}

impl fmt::Debug for AccountHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountHandle")
            .field("address", &self.address)
            .field("evm_address", &self.evm_address)
            .field("interface", &self.interface.source_id)
            .finish()
    }
}

impl AccountHandle {
    pub(crate) fn new(
        ledger: Arc<dyn Ledger>,
        address: ContractAddress,
        evm_address: Option<Address>,
        interface: DeclaredClass,
    ) -> Self {
        Self {
            ledger,
            address,
            evm_address,
            interface,
        }
    }

    /// Ledger address
    pub fn address(&self) -> ContractAddress {
        self.address
    }

    /// Emulated address the handle was derived from, if any
    pub fn evm_address(&self) -> Option<Address> {
        self.evm_address
    }

    /// Interface the handle is bound to
    pub fn interface(&self) -> &DeclaredClass {
        &self.interface
    }

    /// Invoke `method` on the account
    pub async fn call(&self, method: &str, args: &[Felt]) -> HarnessResult<Vec<Felt>> {
        if !self.interface.has_entry_point(method) {
            return Err(HarnessError::UnknownEntryPoint {
                address: self.address,
                method: method.to_string(),
            });
        }
        tracing::debug!(address = %self.address, method, "account call");
        Ok(self.ledger.call(&self.address, method, args).await?)
    }

    /// Whether an instance lives at the handle's address
    pub async fn is_deployed(&self) -> HarnessResult<bool> {
        Ok(self.ledger.is_deployed(&self.address).await?)
    }
}
