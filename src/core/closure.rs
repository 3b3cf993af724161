use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use tracing::{debug, warn};

use super::blob::BlobScanner;
use super::resolver::PathResolver;
use crate::error::{Error, Result};
use crate::formatters::{Record, Reporter};

/// Every library path transitively required by a seed, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    pub seed: PathBuf,
    pub paths: Vec<PathBuf>,
}

impl Closure {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

/// Transitive dependency resolution over a bounded worker pool.
///
/// The calling thread acts as coordinator: it alone owns the visited-set,
/// reports new paths and schedules their expansion. Workers only scan and
/// resolve, so each path is expanded and reported at most once.
pub struct ClosureResolver {
    scanner: Arc<BlobScanner>,
    resolver: Arc<PathResolver>,
    workers: usize,
}

impl ClosureResolver {
    pub fn new(scanner: Arc<BlobScanner>, resolver: Arc<PathResolver>, workers: usize) -> Self {
        Self {
            scanner,
            resolver,
            workers: workers.max(1),
        }
    }

    /// Resolve one blob's dependencies to concrete paths of its own architecture
    pub fn expand(&self, path: &Path) -> Vec<PathBuf> {
        let blob = self.scanner.scan(path);
        if !blob.is_known() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        blob.dependencies
            .iter()
            .flat_map(|library| self.resolver.resolve(library, blob.architecture))
            .filter(|resolved| seen.insert(resolved.clone()))
            .collect()
    }

    /// Walk the dependency closure of `seed`, emitting each newly found path
    /// (relative to the root) as soon as it is discovered.
    pub fn resolve<R: Reporter + ?Sized>(&self, seed: &Path, reporter: &mut R) -> Result<Closure> {
        self.resolver.prepare();
        let pool = super::worker_pool(self.workers)?;

        let (tx, rx) = mpsc::channel::<Vec<PathBuf>>();
        let mut visited: HashSet<PathBuf> = HashSet::from([seed.to_path_buf()]);
        let mut paths = Vec::new();
        let mut failure: Option<Error> = None;

        pool.in_place_scope(|scope| {
            self.spawn_expand(scope, seed.to_path_buf(), tx.clone());
            let mut pending = 1usize;

            while pending > 0 {
                let Ok(resolved) = rx.recv() else {
                    break;
                };
                pending -= 1;

                // Keep draining after a reporting failure, but schedule nothing new
                if failure.is_some() {
                    continue;
                }

                for path in resolved {
                    if !visited.insert(path.clone()) {
                        continue;
                    }

                    let relative = path
                        .strip_prefix(self.resolver.root())
                        .unwrap_or(path.as_path());
                    if let Err(err) = reporter.emit(Record::Path(relative)) {
                        failure = Some(err);
                        break;
                    }

                    paths.push(path.clone());
                    self.spawn_expand(scope, path, tx.clone());
                    pending += 1;
                }
            }
        });

        if let Some(err) = failure {
            return Err(err);
        }

        debug!("Closure of {} has {} paths", seed.display(), paths.len());
        Ok(Closure {
            seed: seed.to_path_buf(),
            paths,
        })
    }

    fn spawn_expand<'s>(&'s self, scope: &rayon::Scope<'s>, path: PathBuf, tx: Sender<Vec<PathBuf>>) {
        scope.spawn(move |_| {
            let resolved = match panic::catch_unwind(AssertUnwindSafe(|| self.expand(&path))) {
                Ok(resolved) => resolved,
                Err(_) => {
                    warn!("Resolution of {} failed; treating it as a leaf", path.display());
                    Vec::new()
                }
            };
            // Receiver lives until every spawned task has reported
            let _ = tx.send(resolved);
        });
    }
}
