//! Loader configuration from the environment

use std::path::PathBuf;

/// Variable that enables the conformance corpus when set
pub const ENV_TOGGLE: &str = "EF_TESTS";

/// Variable overriding the corpus root
pub const ENV_ROOT: &str = "EF_TESTS_ROOT";

/// Default corpus root
pub const DEFAULT_ROOT: &str = "./tests/ef_tests/test_data/BlockchainTests/GeneralStateTests/";

/// Ruleset vectors are selected for
pub const DEFAULT_NETWORK: &str = "Shanghai";

/// Where and what to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Whether the corpus is enabled at all
    pub enabled: bool,
    /// Corpus root
    pub root: PathBuf,
    /// Target ruleset tag
    pub network: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            root: PathBuf::from(DEFAULT_ROOT),
            network: DEFAULT_NETWORK.to_string(),
        }
    }
}

impl LoaderConfig {
    /// Enabled config for `root` and `network`
    pub fn new(root: impl Into<PathBuf>, network: impl Into<String>) -> Self {
        Self {
            enabled: true,
            root: root.into(),
            network: network.into(),
        }
    }

    /// Read [`ENV_TOGGLE`] and [`ENV_ROOT`] from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self {
            enabled: lookup(ENV_TOGGLE).is_some(),
            ..Self::default()
        };
        if let Some(root) = lookup(ENV_ROOT).filter(|r| !r.is_empty()) {
            config.root = PathBuf::from(root);
        }
        config
    }
}
