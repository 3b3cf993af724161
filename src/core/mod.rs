pub mod analyzer;
pub mod arch;
pub mod blob;
pub mod closure;
pub mod filter;
pub mod graph;
pub mod resolver;
pub mod scanner;
pub mod usage;

pub use analyzer::{BlobAnalyzer, Mode};
pub use arch::{ArchClassifier, ArchStrategy, Architecture};
pub use blob::{Blob, BlobScanner, Inventory};
pub use closure::{Closure, ClosureResolver};
pub use filter::LibraryFilter;
pub use graph::{BlobRecord, DependencyGraph, GraphBuilder};
pub use resolver::PathResolver;
pub use scanner::WalkDirLister;
pub use usage::rank_usage;

use crate::error::Result;

/// Worker pool scoped to a single run; dropped when the run returns.
pub(crate) fn worker_pool(workers: usize) -> Result<rayon::ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("blobdeps-worker-{i}"))
        .build()?;
    Ok(pool)
}
