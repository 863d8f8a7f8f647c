//! Contract source resolution

use crate::error::{HarnessError, HarnessResult};
use hostevm_ledger::ContractCode;
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolves a source identifier to a code body
pub trait SourceLoader: Send + Sync {
    /// Load the code for `source_id`
    fn load(&self, source_id: &str) -> HarnessResult<ContractCode>;
}

/// Reads code bodies from files under a contracts root
#[derive(Debug, Clone)]
pub struct FsSourceLoader {
    root: PathBuf,
}

impl FsSourceLoader {
    /// Create a loader rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Contracts root
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl SourceLoader for FsSourceLoader {
    fn load(&self, source_id: &str) -> HarnessResult<ContractCode> {
        let path = self.root.join(source_id);
        let body = std::fs::read(&path).map_err(|e| HarnessError::Source {
            source_id: source_id.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        Ok(ContractCode::new(source_id, body))
    }
}

/// Serves code bodies from memory
#[derive(Debug, Clone, Default)]
pub struct MemorySourceLoader {
    bodies: HashMap<String, Vec<u8>>,
}

impl MemorySourceLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body (builder form)
    pub fn with_source(mut self, source_id: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.insert(source_id, body);
        self
    }

    /// Add a body
    pub fn insert(&mut self, source_id: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.bodies.insert(source_id.into(), body.into());
    }
}

impl SourceLoader for MemorySourceLoader {
    fn load(&self, source_id: &str) -> HarnessResult<ContractCode> {
        self.bodies
            .get(source_id)
            .map(|body| ContractCode::new(source_id, body.clone()))
            .ok_or_else(|| HarnessError::Source {
                source_id: source_id.to_string(),
                reason: "no such source".to_string(),
            })
    }
}
