pub mod json;

use std::path::{Path, PathBuf};

use crate::core::DependencyGraph;
use crate::error::Result;

pub use json::JsonReporter;

/// One unit of output
#[derive(Debug, Clone, Copy)]
pub enum Record<'a> {
    /// Final consolidated graph of a tree scan
    Graph(&'a DependencyGraph),
    /// `[library, count]` pairs, least used first
    Usage(&'a [(String, usize)]),
    /// A newly discovered closure member, relative to the root
    Path(&'a Path),
}

/// Sink for run results
pub trait Reporter {
    fn emit(&mut self, record: Record<'_>) -> Result<()>;
}

/// Keeps every record in memory
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    pub graphs: Vec<DependencyGraph>,
    pub rankings: Vec<Vec<(String, usize)>>,
    pub paths: Vec<PathBuf>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for CollectingReporter {
    fn emit(&mut self, record: Record<'_>) -> Result<()> {
        match record {
            Record::Graph(graph) => self.graphs.push(graph.clone()),
            Record::Usage(ranking) => self.rankings.push(ranking.to_vec()),
            Record::Path(path) => self.paths.push(path.to_path_buf()),
        }
        Ok(())
    }
}
