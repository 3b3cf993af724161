use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::arch::{ArchClassifier, ArchStrategy};
use super::blob::{BlobScanner, Inventory};
use super::closure::{Closure, ClosureResolver};
use super::graph::{DependencyGraph, GraphBuilder};
use super::resolver::PathResolver;
use super::usage::rank_usage;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::formatters::{Record, Reporter};
use crate::tools::Toolchain;

/// What a run produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Consolidated name -> {dependencies, architectures} graph
    Tree,
    /// Library usage counts, least used first
    Usage,
    /// Transitive closure of a seed given relative to the root
    Closure { seed: PathBuf },
}

/// Wires configuration and collaborators for one root directory
pub struct BlobAnalyzer {
    root: PathBuf,
    config: Config,
    toolchain: Toolchain,
    scanner: Arc<BlobScanner>,
    classifier: Arc<ArchClassifier>,
}

impl BlobAnalyzer {
    pub fn new(root: &Path, config: Config, toolchain: Toolchain, strategy: ArchStrategy) -> Result<Self> {
        let root = root.canonicalize().map_err(|source| Error::Io {
            path: root.to_path_buf(),
            source,
        })?;
        if !root.is_dir() {
            return Err(Error::RootNotDirectory(root));
        }

        let classifier = Arc::new(ArchClassifier::new(
            &config,
            strategy,
            toolchain.detector.clone(),
        ));
        let scanner = Arc::new(BlobScanner::new(
            classifier.clone(),
            toolchain.strings.clone(),
            config.library_filter(),
        ));

        Ok(Self {
            root,
            config,
            toolchain,
            scanner,
            classifier,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan every file once per distinct blob name
    pub fn inventory(&self) -> Result<Inventory> {
        let mut files = self.toolchain.lister.list_files(&self.root);
        files.sort();
        info!("Found {} files under {}", files.len(), self.root.display());

        let pool = super::worker_pool(self.config.worker_count())?;
        let inventory = pool.install(|| self.scanner.scan_all(&files));
        info!(
            "Scanned {} blobs ({} duplicate names skipped)",
            inventory.blobs.len(),
            inventory.duplicates.len()
        );
        Ok(inventory)
    }

    pub fn tree(&self) -> Result<DependencyGraph> {
        let inventory = self.inventory()?;

        let mut builder = GraphBuilder::new();
        for blob in inventory.blobs {
            builder.add_blob(blob);
        }
        for (name, architecture) in &inventory.duplicates {
            builder.merge_architecture(name, *architecture);
        }

        let folded = builder.fold_subsumed();
        let graph = builder.into_graph();
        info!("Dependency graph has {} blobs ({} folded)", graph.len(), folded);
        Ok(graph)
    }

    pub fn usage(&self) -> Result<Vec<(String, usize)>> {
        let inventory = self.inventory()?;
        Ok(rank_usage(&inventory.blobs))
    }

    /// Resolve the closure of `seed` (relative to the root), streaming paths to `reporter`
    pub fn closure<R: Reporter + ?Sized>(&self, seed: &Path, reporter: &mut R) -> Result<Closure> {
        let joined = self.root.join(seed);
        // Match the canonical paths the file index is built from
        let seed_path = match joined.canonicalize() {
            Ok(path) if path.is_file() => path,
            _ => return Err(Error::SeedNotFound(joined)),
        };

        let resolver = Arc::new(PathResolver::new(
            self.root.clone(),
            self.toolchain.lister.clone(),
            self.classifier.clone(),
        ));
        let closure_resolver =
            ClosureResolver::new(self.scanner.clone(), resolver, self.config.worker_count());

        closure_resolver.resolve(&seed_path, reporter)
    }

    pub fn run<R: Reporter + ?Sized>(&self, mode: &Mode, reporter: &mut R) -> Result<()> {
        let start = Instant::now();

        match mode {
            Mode::Tree => {
                let graph = self.tree()?;
                reporter.emit(Record::Graph(&graph))?;
            }
            Mode::Usage => {
                let ranking = self.usage()?;
                reporter.emit(Record::Usage(&ranking))?;
            }
            Mode::Closure { seed } => {
                let closure = self.closure(seed, reporter)?;
                info!("{} libraries required by {}", closure.len(), seed.display());
            }
        }

        info!("Completed in {:.2}s", start.elapsed().as_secs_f64());
        Ok(())
    }
}
