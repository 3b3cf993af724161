use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use super::arch::Architecture;
use super::blob::Blob;

/// Consolidated view of every blob sharing one name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlobRecord {
    pub dependencies: Vec<String>,
    pub architectures: BTreeSet<Architecture>,
}

/// Blob name to consolidated record, in insertion order.
///
/// Serializes as a JSON object keyed by blob name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    entries: Vec<(String, BlobRecord)>,
}

impl DependencyGraph {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&BlobRecord> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, record)| record)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BlobRecord)> {
        self.entries
            .iter()
            .map(|(name, record)| (name.as_str(), record))
    }
}

impl Serialize for DependencyGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, record) in &self.entries {
            map.serialize_entry(name, record)?;
        }
        map.end()
    }
}

/// Accumulates scanned blobs into a [`DependencyGraph`]
#[derive(Debug, Default)]
pub struct GraphBuilder {
    entries: Vec<(String, BlobRecord)>,
    index: HashMap<String, usize>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scanned blob. A blob whose name is already present only
    /// contributes its architecture; blobs of unknown architecture are dropped.
    pub fn add_blob(&mut self, blob: Blob) -> bool {
        if !blob.is_known() {
            return false;
        }

        if let Some(&idx) = self.index.get(&blob.name) {
            let record = &mut self.entries[idx].1;
            record.architectures.insert(blob.architecture);
            for dependency in blob.dependencies {
                push_unique(&mut record.dependencies, dependency);
            }
            return false;
        }

        let record = BlobRecord {
            dependencies: blob.dependencies,
            architectures: BTreeSet::from([blob.architecture]),
        };
        self.index.insert(blob.name.clone(), self.entries.len());
        self.entries.push((blob.name, record));
        true
    }

    /// Merge the architecture of a same-named blob that was not scanned
    pub fn merge_architecture(&mut self, name: &str, architecture: Architecture) -> bool {
        if !architecture.is_known() {
            return false;
        }
        match self.index.get(name) {
            Some(&idx) => self.entries[idx].1.architectures.insert(architecture),
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Fold every blob listed as a dependency of another blob into that blob.
    ///
    /// The absorbed blob's dependencies are appended to each blob that lists
    /// it, then it is removed as a top-level entry. Passes repeat until one
    /// removes nothing. Returns the number of folded blobs.
    pub fn fold_subsumed(&mut self) -> usize {
        let mut folded = 0;

        loop {
            let mut removed = vec![false; self.entries.len()];
            let mut changed = false;

            for dependency_idx in 0..self.entries.len() {
                if removed[dependency_idx] {
                    continue;
                }

                let name = self.entries[dependency_idx].0.clone();
                let hoisted = self.entries[dependency_idx].1.dependencies.clone();
                let mut included = false;

                for dependant_idx in 0..self.entries.len() {
                    if dependant_idx == dependency_idx || removed[dependant_idx] {
                        continue;
                    }

                    let dependant = &mut self.entries[dependant_idx].1;
                    if !dependant.dependencies.contains(&name) {
                        continue;
                    }

                    included = true;
                    for dependency in &hoisted {
                        push_unique(&mut dependant.dependencies, dependency.clone());
                    }
                }

                if included {
                    removed[dependency_idx] = true;
                    changed = true;
                    folded += 1;
                }
            }

            if !changed {
                break;
            }

            let mut flags = removed.into_iter();
            self.entries.retain(|_| !flags.next().unwrap_or(false));
            self.reindex();
        }

        folded
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, (name, _))| (name.clone(), idx))
            .collect();
    }

    /// Graph as recorded, without folding
    pub fn into_graph(self) -> DependencyGraph {
        DependencyGraph {
            entries: self.entries,
        }
    }

    pub fn build(mut self) -> DependencyGraph {
        self.fold_subsumed();
        self.into_graph()
    }
}

fn push_unique(dependencies: &mut Vec<String>, dependency: String) {
    if !dependencies.contains(&dependency) {
        dependencies.push(dependency);
    }
}
