//! # hostevm-vectors
//!
//! Discovers conformance test vectors on disk and selects the ones written
//! against one protocol ruleset.
//!
//! Vectors live in `.json` files, each a mapping of test identifier to a
//! record with at least a `network` field. [`VectorLoader`] walks a corpus
//! lazily; [`collect_cases`] drains it according to a [`LoaderConfig`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod types;
mod config;
mod loader;

pub use error::{VectorError, VectorResult};
pub use types::{TestVector, VectorFile};
pub use config::{LoaderConfig, DEFAULT_NETWORK, DEFAULT_ROOT, ENV_ROOT, ENV_TOGGLE};
pub use loader::{collect_cases, load, matches_network, parse_file, CorpusStats, VectorIter, VectorLoader};
