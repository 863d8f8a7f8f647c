//! Class declaration with per-session caching

use crate::config::ClassSources;
use crate::error::{HarnessError, HarnessResult};
use crate::source::SourceLoader;
use hostevm_ledger::{DeclaredClass, Ledger};
use std::collections::HashMap;
use std::fmt;

/// The five classes a session declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Native asset
    NativeAsset,
    /// Contract-account implementation
    ContractAccount,
    /// Externally-owned-account implementation
    ExternallyOwnedAccount,
    /// Account proxy implementation
    AccountProxy,
    /// Dispatcher
    Dispatcher,
}

impl ClassKind {
    /// Declaration order. The dispatcher's constructor needs the other four, so it comes last.
    pub const DECLARE_ORDER: [ClassKind; 5] = [
        ClassKind::NativeAsset,
        ClassKind::ContractAccount,
        ClassKind::ExternallyOwnedAccount,
        ClassKind::AccountProxy,
        ClassKind::Dispatcher,
    ];

    /// Source identifier configured for this kind
    pub fn source_id<'a>(&self, sources: &'a ClassSources) -> &'a str {
        match self {
            ClassKind::NativeAsset => &sources.native_asset,
            ClassKind::ContractAccount => &sources.contract_account,
            ClassKind::ExternallyOwnedAccount => &sources.externally_owned_account,
            ClassKind::AccountProxy => &sources.account_proxy,
            ClassKind::Dispatcher => &sources.dispatcher,
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassKind::NativeAsset => "native asset",
            ClassKind::ContractAccount => "contract account",
            ClassKind::ExternallyOwnedAccount => "externally owned account",
            ClassKind::AccountProxy => "account proxy",
            ClassKind::Dispatcher => "dispatcher",
        };
        f.write_str(name)
    }
}

/// Classes declared for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClasses {
    /// Native asset class
    pub native_asset: DeclaredClass,
    /// Contract-account implementation
    pub contract_account: DeclaredClass,
    /// Externally-owned-account implementation
    pub externally_owned_account: DeclaredClass,
    /// Account proxy implementation
    pub account_proxy: DeclaredClass,
    /// Dispatcher class
    pub dispatcher: DeclaredClass,
}

/// Declares classes once per source identifier.
///
/// The cache lives in the registry value, so its scope is whoever owns the
/// registry (normally one session).
pub struct ClassRegistry {
    loader: Box<dyn SourceLoader>,
    cache: HashMap<String, DeclaredClass>,
    declared: Vec<DeclaredClass>,
    ledger_declares: usize,
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("declared", &self.declared)
            .field("ledger_declares", &self.ledger_declares)
            .finish()
    }
}

impl ClassRegistry {
    /// Create a registry resolving sources through `loader`
    pub fn new(loader: Box<dyn SourceLoader>) -> Self {
        Self {
            loader,
            cache: HashMap::new(),
            declared: Vec::new(),
            ledger_declares: 0,
        }
    }

    /// Declare `source_id`, or return the cached class if already declared.
    ///
    /// A cached class is confirmed against the ledger first. If the ledger
    /// state was rebound to a point before the declaration, the entry is
    /// dropped and the class declared again.
    pub async fn declare(
        &mut self,
        ledger: &dyn Ledger,
        source_id: &str,
    ) -> HarnessResult<DeclaredClass> {
        if let Some(class) = self.cache.get(source_id).cloned() {
            let live = ledger
                .is_declared(&class.class_hash)
                .await
                .map_err(|e| HarnessError::setup(format!("checking {}", source_id), e))?;
            if live {
                tracing::debug!(source = source_id, class_hash = %class.class_hash, "declare cache hit");
                return Ok(class);
            }
            tracing::debug!(source = source_id, class_hash = %class.class_hash, "cached class rolled back");
            self.evict(source_id);
        }

        let code = self
            .loader
            .load(source_id)
            .map_err(|e| HarnessError::setup(format!("loading {}", source_id), e))?;
        self.ledger_declares += 1;
        let class = ledger
            .declare(&code)
            .await
            .map_err(|e| HarnessError::setup(format!("declaring {}", source_id), e))?;

        tracing::debug!(source = source_id, class_hash = %class.class_hash, "declared");
        self.cache.insert(source_id.to_string(), class.clone());
        self.declared.push(class.clone());
        Ok(class)
    }

    fn evict(&mut self, source_id: &str) {
        self.cache.remove(source_id);
        self.declared.retain(|class| class.source_id != source_id);
    }

    /// Declare all five session classes in dependency order
    pub async fn declare_session_classes(
        &mut self,
        ledger: &dyn Ledger,
        sources: &ClassSources,
    ) -> HarnessResult<SessionClasses> {
        let mut classes = Vec::with_capacity(ClassKind::DECLARE_ORDER.len());
        for kind in ClassKind::DECLARE_ORDER {
            let class = self.declare(ledger, kind.source_id(sources)).await?;
            tracing::info!(kind = %kind, class_hash = %class.class_hash, "class ready");
            classes.push(class);
        }

        let [native_asset, contract_account, externally_owned_account, account_proxy, dispatcher]: [DeclaredClass; 5] =
            classes
                .try_into()
                .map_err(|_| HarnessError::Config("unexpected session class count".to_string()))?;
        Ok(SessionClasses {
            native_asset,
            contract_account,
            externally_owned_account,
            account_proxy,
            dispatcher,
        })
    }

    /// Classes declared so far, in declaration order
    pub fn declared(&self) -> &[DeclaredClass] {
        &self.declared
    }

    /// Declare operations issued to the ledger
    pub fn ledger_declares(&self) -> usize {
        self.ledger_declares
    }

    /// Cached class for `source_id`, if declared
    pub fn get(&self, source_id: &str) -> Option<&DeclaredClass> {
        self.cache.get(source_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{fixture_ledger, fixture_loader};
    use crate::source::MemorySourceLoader;
    use crate::isolation::IsolationManager;
    use hostevm_ledger::{DeployRequest, InMemoryLedger, LedgerError};
    use std::sync::Arc;

    fn registry(sources: &ClassSources) -> ClassRegistry {
        ClassRegistry::new(Box::new(fixture_loader(sources)))
    }

    #[tokio::test]
    async fn test_declare_is_idempotent() {
        let sources = ClassSources::default();
        let ledger = fixture_ledger(&sources);
        let mut registry = registry(&sources);

        let first = registry.declare(&ledger, &sources.account_proxy).await.unwrap();
        let second = registry.declare(&ledger, &sources.account_proxy).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.ledger_declares(), 1);
        assert_eq!(ledger.declare_operations(), 1);
        assert_eq!(registry.declared().len(), 1);
    }

    #[tokio::test]
    async fn test_session_classes_in_order() {
        let sources = ClassSources::default();
        let ledger = fixture_ledger(&sources);
        let mut registry = registry(&sources);

        let classes = registry.declare_session_classes(&ledger, &sources).await.unwrap();

        let order: Vec<&str> = registry.declared().iter().map(|c| c.source_id.as_str()).collect();
        assert_eq!(
            order,
            vec![
                sources.native_asset.as_str(),
                sources.contract_account.as_str(),
                sources.externally_owned_account.as_str(),
                sources.account_proxy.as_str(),
                sources.dispatcher.as_str(),
            ]
        );
        assert_eq!(classes.dispatcher.source_id, sources.dispatcher);
        assert!(classes.contract_account.has_entry_point("write_storage"));
        assert_eq!(registry.get(&sources.dispatcher), Some(&classes.dispatcher));
    }

    #[tokio::test]
    async fn test_redeclare_session_issues_nothing() {
        let sources = ClassSources::default();
        let ledger = fixture_ledger(&sources);
        let mut registry = registry(&sources);

        let first = registry.declare_session_classes(&ledger, &sources).await.unwrap();
        let second = registry.declare_session_classes(&ledger, &sources).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.ledger_declares(), 5);
    }

    #[tokio::test]
    async fn test_rejected_declare_is_setup_failure() {
        let ledger = InMemoryLedger::new();
        let loader = MemorySourceLoader::new().with_source("unregistered.cairo", "code");
        let mut registry = ClassRegistry::new(Box::new(loader));

        let err = registry.declare(&ledger, "unregistered.cairo").await.unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Setup { source, .. }
                if matches!(*source, HarnessError::Ledger(LedgerError::UnknownProgram(_)))
        ));
        assert!(registry.get("unregistered.cairo").is_none());
    }

    #[tokio::test]
    async fn test_missing_source_never_reaches_ledger() {
        let ledger = InMemoryLedger::new();
        let mut registry = ClassRegistry::new(Box::new(MemorySourceLoader::new()));

        let err = registry.declare(&ledger, "absent.cairo").await.unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Setup { source, .. } if matches!(*source, HarnessError::Source { .. })
        ));
        assert_eq!(ledger.declare_operations(), 0);
        assert_eq!(registry.ledger_declares(), 0);
    }

    #[tokio::test]
    async fn test_declare_after_rollback_reaches_ledger() {
        let sources = ClassSources::default();
        let ledger = Arc::new(fixture_ledger(&sources));
        let isolation = IsolationManager::new(ledger.clone());
        let mut registry = registry(&sources);

        let window = isolation.begin().unwrap();
        let inside = registry.declare(ledger.as_ref(), &sources.account_proxy).await.unwrap();
        isolation.end(window).unwrap();

        let after = registry.declare(ledger.as_ref(), &sources.account_proxy).await.unwrap();
        assert_eq!(inside, after);
        assert_eq!(registry.ledger_declares(), 2);
        assert_eq!(registry.declared().len(), 1);

        let deployed = ledger.deploy(DeployRequest::new(after.class_hash)).await;
        assert!(deployed.is_ok(), "{:?}", deployed);
    }

    #[tokio::test]
    async fn test_cache_hit_outside_window_skips_ledger() {
        let sources = ClassSources::default();
        let ledger = Arc::new(fixture_ledger(&sources));
        let isolation = IsolationManager::new(ledger.clone());
        let mut registry = registry(&sources);

        registry.declare(ledger.as_ref(), &sources.dispatcher).await.unwrap();
        isolation.run(|| async {}).await.unwrap();
        registry.declare(ledger.as_ref(), &sources.dispatcher).await.unwrap();

        assert_eq!(registry.ledger_declares(), 1);
        assert_eq!(ledger.declare_operations(), 1);
    }
}
