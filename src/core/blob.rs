use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::arch::{ArchClassifier, Architecture};
use super::filter::LibraryFilter;
use crate::tools::StringScanner;

/// One scanned binary artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blob {
    pub path: PathBuf,
    pub name: String,
    pub architecture: Architecture,
    /// Referenced libraries in first-seen order, without the blob's own name
    pub dependencies: Vec<String>,
}

impl Blob {
    pub fn is_known(&self) -> bool {
        self.architecture.is_known()
    }
}

/// Base file name used as a blob's identity across architectures
pub fn blob_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Result of scanning every file of a tree, one scan per distinct blob name
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub blobs: Vec<Blob>,
    /// Further same-named blobs whose scan was skipped
    pub duplicates: Vec<(String, Architecture)>,
}

/// Extracts the dependency list of a single blob
pub struct BlobScanner {
    classifier: Arc<ArchClassifier>,
    strings: Arc<dyn StringScanner>,
    filter: Arc<LibraryFilter>,
}

impl BlobScanner {
    pub fn new(
        classifier: Arc<ArchClassifier>,
        strings: Arc<dyn StringScanner>,
        filter: Arc<LibraryFilter>,
    ) -> Self {
        Self {
            classifier,
            strings,
            filter,
        }
    }

    /// Classify and, when the architecture is known, collect dependencies.
    ///
    /// Blobs of unknown architecture come back with no dependencies and no
    /// string extraction is attempted for them.
    pub fn scan(&self, path: &Path) -> Blob {
        let architecture = self.classifier.classify(path);
        if !architecture.is_known() {
            debug!("Skipping {}: unknown architecture", path.display());
            return Blob {
                path: path.to_path_buf(),
                name: blob_name(path),
                architecture,
                dependencies: Vec::new(),
            };
        }

        self.scan_with_architecture(path, architecture)
    }

    pub fn scan_with_architecture(&self, path: &Path, architecture: Architecture) -> Blob {
        let name = blob_name(path);
        let dependencies = self.dependencies(path, &name);
        debug!(
            "Scanned {} ({}-bit): {} dependencies",
            path.display(),
            architecture,
            dependencies.len()
        );

        Blob {
            path: path.to_path_buf(),
            name,
            architecture,
            dependencies,
        }
    }

    fn dependencies(&self, path: &Path, own_name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.strings
            .extract_strings(path)
            .into_iter()
            .filter(|token| self.filter.is_candidate_library(token))
            .filter(|token| token != own_name)
            .filter(|token| seen.insert(token.clone()))
            .collect()
    }

    /// Classify `files` in parallel and scan the first known-architecture
    /// file of every name. Must run inside the caller's worker pool.
    pub fn scan_all(&self, files: &[PathBuf]) -> Inventory {
        use rayon::prelude::*;

        let classified: Vec<(&PathBuf, Architecture)> = files
            .par_iter()
            .map(|path| (path, self.classifier.classify(path)))
            .collect();

        let mut seen = HashSet::new();
        let mut to_scan = Vec::new();
        let mut duplicates = Vec::new();

        for (path, architecture) in classified {
            if !architecture.is_known() {
                continue;
            }
            let name = blob_name(path);
            if seen.insert(name.clone()) {
                to_scan.push((path, architecture));
            } else {
                duplicates.push((name, architecture));
            }
        }

        let blobs = to_scan
            .par_iter()
            .map(|(path, architecture)| self.scan_with_architecture(path, *architecture))
            .collect();

        Inventory { blobs, duplicates }
    }
}
