//! Session bootstrap and environment

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::handle::AccountHandle;
use crate::registry::{ClassRegistry, SessionClasses};
use hostevm_crypto::{account_salt, calculate_contract_address};
use hostevm_ledger::{DeployRequest, DeployedInstance, Ledger};
use hostevm_primitives::{Address, ContractAddress, Felt};
use std::fmt;
use std::sync::Arc;

/// Read-only view of a bootstrapped session
#[derive(Clone)]
pub struct SessionEnvironment {
    ledger: Arc<dyn Ledger>,
    owner: Felt,
    native_asset: DeployedInstance,
    dispatcher: DeployedInstance,
    classes: SessionClasses,
}

impl fmt::Debug for SessionEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEnvironment")
            .field("owner", &self.owner)
            .field("native_asset", &self.native_asset.address)
            .field("dispatcher", &self.dispatcher.address)
            .field("classes", &self.classes)
            .finish()
    }
}

/// Declare the session classes, then deploy the native asset and the dispatcher.
///
/// Every failure is fatal and surfaces as [`HarnessError::Setup`] naming the
/// step that failed. The returned error leaves no usable session.
pub async fn bootstrap(
    ledger: Arc<dyn Ledger>,
    registry: &mut ClassRegistry,
    config: &HarnessConfig,
    owner: Felt,
) -> HarnessResult<SessionEnvironment> {
    tracing::info!(owner = %owner, "bootstrapping session");
    let classes = registry
        .declare_session_classes(ledger.as_ref(), &config.sources)
        .await
        .map_err(|e| HarnessError::setup("declaring session classes", e))?;

    let asset_calldata = config
        .native_asset
        .constructor_calldata()
        .map_err(|e| HarnessError::setup("encoding native asset configuration", e))?;
    let native_asset = ledger
        .deploy(DeployRequest::new(classes.native_asset.class_hash).calldata(asset_calldata))
        .await
        .map_err(|e| HarnessError::setup("deploying native asset", e))?;
    tracing::info!(
        address = %native_asset.address,
        symbol = %config.native_asset.symbol,
        "native asset deployed"
    );

    let dispatcher_calldata = vec![
        owner,
        native_asset.address.felt(),
        classes.contract_account.class_hash.felt(),
        classes.externally_owned_account.class_hash.felt(),
        classes.account_proxy.class_hash.felt(),
    ];
    let dispatcher = ledger
        .deploy(DeployRequest::new(classes.dispatcher.class_hash).calldata(dispatcher_calldata))
        .await
        .map_err(|e| HarnessError::setup("deploying dispatcher", e))?;
    tracing::info!(address = %dispatcher.address, "dispatcher deployed");

    Ok(SessionEnvironment {
        ledger,
        owner,
        native_asset,
        dispatcher,
        classes,
    })
}

impl SessionEnvironment {
    /// Owner identity passed to the dispatcher
    pub fn owner(&self) -> Felt {
        self.owner
    }

    /// Native asset instance
    pub fn native_asset(&self) -> &DeployedInstance {
        &self.native_asset
    }

    /// Dispatcher instance
    pub fn dispatcher(&self) -> &DeployedInstance {
        &self.dispatcher
    }

    /// Declared session classes
    pub fn classes(&self) -> &SessionClasses {
        &self.classes
    }

    /// Ledger the session runs on
    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// Ledger address derived for an emulated account
    pub fn starknet_address(&self, evm_address: &Address) -> ContractAddress {
        calculate_contract_address(
            &account_salt(evm_address),
            &self.classes.account_proxy.class_hash,
            &[],
            &self.dispatcher.address,
        )
    }

    /// Handle on the object derived for `evm_address`, bound to the contract-account interface
    pub fn account_handle(&self, evm_address: &Address) -> AccountHandle {
        AccountHandle::new(
            Arc::clone(&self.ledger),
            self.starknet_address(evm_address),
            Some(*evm_address),
            self.classes.contract_account.clone(),
        )
    }

    /// Bind the contract-account interface to an arbitrary ledger address
    pub fn contract_account_at(&self, address: ContractAddress) -> AccountHandle {
        AccountHandle::new(
            Arc::clone(&self.ledger),
            address,
            None,
            self.classes.contract_account.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{fixture_ledger, fixture_loader, fixture_session};
    use hostevm_ledger::LedgerError;

    #[tokio::test]
    async fn test_bootstrap_wires_dispatcher() {
        let (ledger, env) = fixture_session(Felt::ONE).await.unwrap();
        let dispatcher = env.dispatcher().address;
        let classes = env.classes();

        let owner = ledger.call(&dispatcher, "get_owner", &[]).await.unwrap();
        assert_eq!(owner, vec![Felt::ONE]);

        let token = ledger.call(&dispatcher, "get_native_token", &[]).await.unwrap();
        assert_eq!(token, vec![env.native_asset().address.felt()]);

        let ca = ledger
            .call(&dispatcher, "get_contract_account_class_hash", &[])
            .await
            .unwrap();
        assert_eq!(ca, vec![classes.contract_account.class_hash.felt()]);

        let eoa = ledger
            .call(&dispatcher, "get_externally_owned_account_class_hash", &[])
            .await
            .unwrap();
        assert_eq!(eoa, vec![classes.externally_owned_account.class_hash.felt()]);

        let proxy = ledger
            .call(&dispatcher, "get_account_proxy_class_hash", &[])
            .await
            .unwrap();
        assert_eq!(proxy, vec![classes.account_proxy.class_hash.felt()]);
    }

    #[tokio::test]
    async fn test_native_asset_configuration() {
        let (ledger, env) = fixture_session(Felt::ONE).await.unwrap();
        let token = env.native_asset().address;

        let name = ledger.call(&token, "name", &[]).await.unwrap();
        let symbol = ledger.call(&token, "symbol", &[]).await.unwrap();
        let decimals = ledger.call(&token, "decimals", &[]).await.unwrap();
        assert_eq!(name, vec![Felt::from_short_string("Ether").unwrap()]);
        assert_eq!(symbol, vec![Felt::from_short_string("ETH").unwrap()]);
        assert_eq!(decimals, vec![Felt::from_u64(18)]);
    }

    #[tokio::test]
    async fn test_dispatcher_derivation_matches_harness() {
        let (ledger, env) = fixture_session(Felt::ONE).await.unwrap();
        let evm = Address::from_low_u64(0xabde1);

        let reported = ledger
            .call(
                &env.dispatcher().address,
                "compute_starknet_address",
                &[account_salt(&evm)],
            )
            .await
            .unwrap();
        assert_eq!(reported, vec![env.starknet_address(&evm).felt()]);
    }

    #[tokio::test]
    async fn test_account_handle_is_deterministic() {
        let (_ledger, env) = fixture_session(Felt::ONE).await.unwrap();
        let evm = Address::from_low_u64(0xabde1);

        let a = env.account_handle(&evm);
        let b = env.account_handle(&evm);
        assert_eq!(a.address(), b.address());
        assert_eq!(a.evm_address(), Some(evm));

        let other = env.account_handle(&Address::from_low_u64(0xabde2));
        assert_ne!(a.address(), other.address());
    }

    #[tokio::test]
    async fn test_undeployed_handle_surfaces_ledger_fault() {
        let (_ledger, env) = fixture_session(Felt::ONE).await.unwrap();
        let handle = env.account_handle(&Address::from_low_u64(7));

        assert!(!handle.is_deployed().await.unwrap());
        let err = handle.call("get_nonce", &[]).await.unwrap_err();
        assert!(matches!(err, HarnessError::Ledger(LedgerError::NotDeployed(_))));
    }

    #[tokio::test]
    async fn test_handle_rejects_method_outside_interface() {
        let (_ledger, env) = fixture_session(Felt::ONE).await.unwrap();
        let handle = env.account_handle(&Address::from_low_u64(7));

        let err = handle.call("initialize", &[]).await.unwrap_err();
        assert!(matches!(err, HarnessError::UnknownEntryPoint { method, .. } if method == "initialize"));
    }

    #[tokio::test]
    async fn test_deployed_proxy_serves_account_interface() {
        let (ledger, env) = fixture_session(Felt::ONE).await.unwrap();
        let evm = Address::from_low_u64(0xabde1);
        let salt = account_salt(&evm);

        let deployed = ledger
            .deploy(
                DeployRequest::new(env.classes().account_proxy.class_hash)
                    .salt(salt)
                    .deployer(env.dispatcher().address),
            )
            .await
            .unwrap();
        let handle = env.account_handle(&evm);
        assert_eq!(deployed.address, handle.address());

        ledger
            .call(
                &deployed.address,
                "initialize",
                &[
                    env.classes().contract_account.class_hash.felt(),
                    env.dispatcher().address.felt(),
                    salt,
                ],
            )
            .await
            .unwrap();

        assert!(handle.is_deployed().await.unwrap());
        assert_eq!(handle.call("get_evm_address", &[]).await.unwrap(), vec![salt]);

        let same = env.contract_account_at(deployed.address);
        assert_eq!(same.call("get_nonce", &[]).await.unwrap(), vec![Felt::ZERO]);
        assert_eq!(same.evm_address(), None);
    }

    #[tokio::test]
    async fn test_bootstrap_failure_is_fatal() {
        let config = HarnessConfig::default();
        let mut ledger_sources = config.sources.clone();
        ledger_sources.dispatcher = "elsewhere/dispatcher.cairo".to_string();
        let ledger: Arc<dyn Ledger> = Arc::new(fixture_ledger(&ledger_sources));
        let mut registry = ClassRegistry::new(Box::new(fixture_loader(&config.sources)));

        let err = bootstrap(ledger, &mut registry, &config, Felt::ONE)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Setup { source, .. }
                if matches!(*source, HarnessError::Ledger(LedgerError::UnknownProgram(_)))
        ));
        assert_eq!(registry.declared().len(), 4);
    }

    #[tokio::test]
    async fn test_bootstrap_missing_source_is_setup_failure() {
        let mut config = HarnessConfig::default();
        let ledger: Arc<dyn Ledger> = Arc::new(fixture_ledger(&config.sources));
        let mut registry = ClassRegistry::new(Box::new(fixture_loader(&config.sources)));
        config.sources.externally_owned_account = "missing/eoa.cairo".to_string();

        let err = bootstrap(ledger, &mut registry, &config, Felt::ONE)
            .await
            .unwrap_err();
        match err {
            HarnessError::Setup { stage, source } => {
                assert_eq!(stage, "loading missing/eoa.cairo");
                assert!(matches!(*source, HarnessError::Source { .. }));
            }
            other => panic!("expected setup error, got {other:?}"),
        }
        assert_eq!(registry.declared().len(), 2);
    }

    #[tokio::test]
    async fn test_bootstrap_bad_asset_name_is_setup_failure() {
        let mut config = HarnessConfig::default();
        config.native_asset.name = "a token name that is longer than thirty-one bytes".to_string();
        let ledger: Arc<dyn Ledger> = Arc::new(fixture_ledger(&config.sources));
        let mut registry = ClassRegistry::new(Box::new(fixture_loader(&config.sources)));

        let err = bootstrap(ledger, &mut registry, &config, Felt::ONE)
            .await
            .unwrap_err();
        match err {
            HarnessError::Setup { stage, source } => {
                assert_eq!(stage, "encoding native asset configuration");
                assert!(matches!(*source, HarnessError::Felt(_)));
            }
            other => panic!("expected setup error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bootstrap_records_classes_in_registry() {
        let config = HarnessConfig::default();
        let ledger: Arc<dyn Ledger> = Arc::new(fixture_ledger(&config.sources));
        let mut registry = ClassRegistry::new(Box::new(fixture_loader(&config.sources)));

        let env = bootstrap(ledger, &mut registry, &config, Felt::ONE).await.unwrap();

        assert_eq!(registry.ledger_declares(), 5);
        assert_eq!(
            Some(&env.classes().account_proxy),
            registry.get(&config.sources.account_proxy)
        );
        assert_ne!(env.native_asset().address, env.dispatcher().address);
    }
}
