//! Declare and deploy payloads

use hostevm_primitives::{ClassHash, ContractAddress, Felt};

/// A contract implementation submitted for declaration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCode {
    /// Source identifier (e.g. a path under the contracts root)
    pub source_id: String,
    /// Compiled code body; the class hash is derived from these bytes
    pub body: Vec<u8>,
}

impl ContractCode {
    /// Create a new code payload
    pub fn new(source_id: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            source_id: source_id.into(),
            body: body.into(),
        }
    }
}

/// Result of a successful declare
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclaredClass {
    /// Content-derived class identifier
    pub class_hash: ClassHash,
    /// Source the class was declared from
    pub source_id: String,
    /// Entry points exposed by the class
    pub abi: Vec<String>,
}

impl DeclaredClass {
    /// Check whether `method` is an entry point of this class
    pub fn has_entry_point(&self, method: &str) -> bool {
        self.abi.iter().any(|m| m == method)
    }
}

/// Deploy request
///
/// Without a salt the ledger assigns the address from its deploy counter;
/// with a salt the address is derived from `(salt, class, calldata, deployer)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployRequest {
    /// Class to instantiate
    pub class_hash: ClassHash,
    /// Constructor arguments
    pub constructor_calldata: Vec<Felt>,
    /// Optional salt for deterministic placement
    pub salt: Option<Felt>,
    /// Deployer identity mixed into salted derivation
    pub deployer: ContractAddress,
}

impl DeployRequest {
    /// Deploy `class_hash` with no calldata at a ledger-assigned address
    pub fn new(class_hash: ClassHash) -> Self {
        Self {
            class_hash,
            constructor_calldata: Vec::new(),
            salt: None,
            deployer: ContractAddress::ZERO,
        }
    }

    /// Set constructor calldata
    pub fn calldata(mut self, calldata: Vec<Felt>) -> Self {
        self.constructor_calldata = calldata;
        self
    }

    /// Set salt
    pub fn salt(mut self, salt: Felt) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Set deployer
    pub fn deployer(mut self, deployer: ContractAddress) -> Self {
        self.deployer = deployer;
        self
    }
}

/// A live instance on the ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedInstance {
    /// Ledger-native address
    pub address: ContractAddress,
    /// Class the instance runs
    pub class_hash: ClassHash,
    /// Arguments the constructor received
    pub constructor_calldata: Vec<Felt>,
}
