//! Harness configuration

use crate::error::{HarnessError, HarnessResult};
use hostevm_primitives::Felt;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source identifiers of the five session classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSources {
    /// Native asset (fungible token) implementation
    #[serde(default = "default_native_asset_source")]
    pub native_asset: String,
    /// Contract-account implementation
    #[serde(default = "default_contract_account_source")]
    pub contract_account: String,
    /// Externally-owned-account implementation
    #[serde(default = "default_eoa_source")]
    pub externally_owned_account: String,
    /// Account proxy implementation
    #[serde(default = "default_proxy_source")]
    pub account_proxy: String,
    /// Dispatcher implementation
    #[serde(default = "default_dispatcher_source")]
    pub dispatcher: String,
}

fn default_native_asset_source() -> String {
    "tests/fixtures/ERC20.cairo".to_string()
}

fn default_contract_account_source() -> String {
    "src/kakarot/accounts/contract/contract_account.cairo".to_string()
}

fn default_eoa_source() -> String {
    "src/kakarot/accounts/eoa/externally_owned_account.cairo".to_string()
}

fn default_proxy_source() -> String {
    "src/kakarot/accounts/proxy/proxy.cairo".to_string()
}

fn default_dispatcher_source() -> String {
    "src/kakarot/kakarot.cairo".to_string()
}

impl Default for ClassSources {
    fn default() -> Self {
        Self {
            native_asset: default_native_asset_source(),
            contract_account: default_contract_account_source(),
            externally_owned_account: default_eoa_source(),
            account_proxy: default_proxy_source(),
            dispatcher: default_dispatcher_source(),
        }
    }
}

/// Fixed configuration of the native asset instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeAssetConfig {
    /// Token name (short string, at most 31 ASCII bytes)
    #[serde(default = "default_asset_name")]
    pub name: String,
    /// Token symbol (short string)
    #[serde(default = "default_asset_symbol")]
    pub symbol: String,
    /// Decimals
    #[serde(default = "default_asset_decimals")]
    pub decimals: u8,
}

fn default_asset_name() -> String {
    "Ether".to_string()
}

fn default_asset_symbol() -> String {
    "ETH".to_string()
}

fn default_asset_decimals() -> u8 {
    18
}

impl Default for NativeAssetConfig {
    fn default() -> Self {
        Self {
            name: default_asset_name(),
            symbol: default_asset_symbol(),
            decimals: default_asset_decimals(),
        }
    }
}

impl NativeAssetConfig {
    /// Constructor calldata: `[name, symbol, decimals]`
    pub fn constructor_calldata(&self) -> HarnessResult<Vec<Felt>> {
        Ok(vec![
            Felt::from_short_string(&self.name)?,
            Felt::from_short_string(&self.symbol)?,
            Felt::from_u64(self.decimals as u64),
        ])
    }
}

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Directory the source identifiers are resolved against
    #[serde(default = "default_contracts_root")]
    pub contracts_root: PathBuf,
    /// Class sources
    #[serde(default)]
    pub sources: ClassSources,
    /// Native asset configuration
    #[serde(default)]
    pub native_asset: NativeAssetConfig,
    /// Owner identity passed to the dispatcher constructor
    #[serde(default = "default_owner")]
    pub owner: Felt,
}

fn default_contracts_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_owner() -> Felt {
    Felt::ONE
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            contracts_root: default_contracts_root(),
            sources: ClassSources::default(),
            native_asset: NativeAssetConfig::default(),
            owner: default_owner(),
        }
    }
}

impl HarnessConfig {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> HarnessResult<Self> {
        toml::from_str(content).map_err(|e| HarnessError::Config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> HarnessResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| HarnessError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> HarnessResult<String> {
        toml::to_string_pretty(self).map_err(|e| HarnessError::Config(e.to_string()))
    }
}
