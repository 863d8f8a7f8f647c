//! Lazy corpus walk with separate parse and filter stages

use crate::config::LoaderConfig;
use crate::error::{VectorError, VectorResult};
use crate::types::{TestVector, VectorFile};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Counters for one walk over the corpus
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CorpusStats {
    /// `.json` files parsed
    pub files: usize,
    /// Vectors found in those files
    pub vectors_seen: usize,
    /// Vectors matching the target ruleset
    pub vectors_selected: usize,
}

/// Parse one vector file
pub fn parse_file(path: &Path) -> VectorResult<VectorFile> {
    let content = std::fs::read(path).map_err(|source| VectorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| VectorError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether `vector` targets `network`
pub fn matches_network(vector: &TestVector, network: &str) -> bool {
    vector.network == network
}

fn is_vector_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

/// A corpus root and target ruleset.
///
/// Iterating `&VectorLoader` starts a fresh walk every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorLoader {
    root: PathBuf,
    network: String,
}

/// Create a loader for `root` selecting vectors tagged `network`
pub fn load(root: impl Into<PathBuf>, network: impl Into<String>) -> VectorLoader {
    VectorLoader {
        root: root.into(),
        network: network.into(),
    }
}

impl VectorLoader {
    /// Corpus root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Target ruleset
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Start a walk
    pub fn iter(&self) -> VectorIter {
        let mut iter = VectorIter {
            network: self.network.clone(),
            dirs: Vec::new(),
            files: Vec::new(),
            current: Vec::new().into_iter(),
            stats: CorpusStats::default(),
        };

        if self.root.is_dir() {
            iter.dirs.push(self.root.clone());
        } else if self.root.is_file() {
            iter.files.push(self.root.clone());
        } else {
            tracing::warn!(
                root = %self.root.display(),
                "EFTests directory {} doesn't exist, no vectors loaded",
                self.root.display()
            );
        }
        iter
    }
}

impl<'a> IntoIterator for &'a VectorLoader {
    type Item = VectorResult<(String, TestVector)>;
    type IntoIter = VectorIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One walk over a corpus. Files are parsed only when reached.
#[derive(Debug)]
pub struct VectorIter {
    network: String,
    dirs: Vec<PathBuf>,
    files: Vec<PathBuf>,
    current: std::vec::IntoIter<(String, TestVector)>,
    stats: CorpusStats,
}

impl VectorIter {
    /// Counters so far
    pub fn stats(&self) -> CorpusStats {
        self.stats
    }

    fn expand_dir(&mut self, dir: &Path) -> VectorResult<()> {
        let io_err = |source| VectorError::Io {
            path: dir.to_path_buf(),
            source,
        };
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let file_type = entry.file_type().map_err(io_err)?;
            let path = entry.path();
            // Symlinked directories are not descended into; symlinked files are read
            if file_type.is_dir() {
                self.dirs.push(path);
            } else if is_vector_file(&path) && !path.is_dir() {
                self.files.push(path);
            }
        }
        Ok(())
    }

    fn open_file(&mut self, path: &Path) -> VectorResult<()> {
        let parsed = parse_file(path)?;
        self.stats.files += 1;
        self.stats.vectors_seen += parsed.len();

        let selected: Vec<(String, TestVector)> = parsed
            .into_iter()
            .filter(|(_, vector)| matches_network(vector, &self.network))
            .collect();
        self.stats.vectors_selected += selected.len();
        tracing::debug!(file = %path.display(), selected = selected.len(), "parsed vector file");

        self.current = selected.into_iter();
        Ok(())
    }
}

impl Iterator for VectorIter {
    type Item = VectorResult<(String, TestVector)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pair) = self.current.next() {
                return Some(Ok(pair));
            }
            if let Some(file) = self.files.pop() {
                if let Err(e) = self.open_file(&file) {
                    return Some(Err(e));
                }
                continue;
            }
            let dir = self.dirs.pop()?;
            if let Err(e) = self.expand_dir(&dir) {
                return Some(Err(e));
            }
        }
    }
}

/// Load every selected vector named by `config`.
///
/// A disabled config yields nothing without touching the filesystem. The
/// first error, including a repeated identifier, fails the whole collection.
pub fn collect_cases(config: &LoaderConfig) -> VectorResult<Vec<(String, TestVector)>> {
    if !config.enabled {
        tracing::debug!("conformance vectors disabled");
        return Ok(Vec::new());
    }

    let loader = load(&config.root, &config.network);
    let mut iter = loader.iter();
    let mut seen = HashSet::new();
    let mut cases = Vec::new();
    for item in iter.by_ref() {
        let (id, vector) = item?;
        if !seen.insert(id.clone()) {
            return Err(VectorError::DuplicateId(id));
        }
        cases.push((id, vector));
    }

    let stats = iter.stats();
    tracing::info!(
        files = stats.files,
        seen = stats.vectors_seen,
        selected = stats.vectors_selected,
        network = %config.network,
        "loaded conformance vectors"
    );
    Ok(cases)
}
