use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::arch::{ArchClassifier, Architecture};
use super::blob::blob_name;
use crate::tools::FileLister;

/// Placeholder some blobs embed for a version or variant infix
pub const WILDCARD_PLACEHOLDER: &str = "%s";

/// Translate a library name's placeholder into a filesystem glob
pub fn to_glob(library: &str) -> String {
    library.replace(WILDCARD_PLACEHOLDER, "*")
}

/// Compile a `find -name` style glob (`*` and `?`) into an anchored regex
pub fn glob_regex(glob: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push('^');
    let mut literal = String::new();

    for ch in glob.chars() {
        match ch {
            '*' | '?' => {
                pattern.push_str(&regex::escape(&literal));
                literal.clear();
                pattern.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    pattern.push_str(&regex::escape(&literal));
    pattern.push('$');

    Regex::new(&pattern)
}

/// File names below the root, built once per run
#[derive(Debug, Default)]
pub struct FileIndex {
    by_name: HashMap<String, Vec<PathBuf>>,
    names: Vec<String>,
}

impl FileIndex {
    pub fn from_paths(mut paths: Vec<PathBuf>) -> Self {
        paths.sort();

        let mut by_name: HashMap<String, Vec<PathBuf>> = HashMap::with_capacity(paths.len());
        for path in paths {
            by_name.entry(blob_name(&path)).or_default().push(path);
        }

        let mut names: Vec<String> = by_name.keys().cloned().collect();
        names.sort();

        Self { by_name, names }
    }

    pub fn len(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Paths whose file name matches `glob`, case-sensitively
    pub fn matching(&self, glob: &str) -> Vec<PathBuf> {
        if !glob.contains(['*', '?']) {
            return self.by_name.get(glob).cloned().unwrap_or_default();
        }

        let pattern = match glob_regex(glob) {
            Ok(pattern) => pattern,
            Err(err) => {
                warn!("Invalid library pattern {}: {}", glob, err);
                return Vec::new();
            }
        };

        self.names
            .iter()
            .filter(|name| pattern.is_match(name))
            .flat_map(|name| self.by_name[name].iter().cloned())
            .collect()
    }
}

/// Maps library names to concrete files of a matching architecture
pub struct PathResolver {
    root: PathBuf,
    lister: Arc<dyn FileLister>,
    classifier: Arc<ArchClassifier>,
    index: OnceLock<FileIndex>,
}

impl PathResolver {
    pub fn new(root: PathBuf, lister: Arc<dyn FileLister>, classifier: Arc<ArchClassifier>) -> Self {
        Self {
            root,
            lister,
            classifier,
            index: OnceLock::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build the file index up front instead of on first resolution
    pub fn prepare(&self) {
        self.index();
    }

    fn index(&self) -> &FileIndex {
        self.index.get_or_init(|| {
            let index = FileIndex::from_paths(self.lister.list_files(&self.root));
            debug!("Indexed {} files under {}", index.len(), self.root.display());
            index
        })
    }

    /// All files named like `library` whose architecture equals `architecture`.
    ///
    /// An unresolvable library is not an error; it is logged and yields nothing.
    pub fn resolve(&self, library: &str, architecture: Architecture) -> Vec<PathBuf> {
        if !architecture.is_known() {
            return Vec::new();
        }

        let candidates = self.index().matching(&to_glob(library));
        if candidates.is_empty() {
            info!("missing: {}", library);
            return candidates;
        }

        let matching: Vec<PathBuf> = candidates
            .into_iter()
            .filter(|path| self.classifier.classify(path) == architecture)
            .collect();

        if matching.is_empty() {
            debug!("No {}-bit candidate for {}", architecture, library);
        }

        matching
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_becomes_glob() {
        assert_eq!(to_glob("libfoo%s.so"), "libfoo*.so");
        assert_eq!(to_glob("libfoo.so"), "libfoo.so");
    }

    #[test]
    fn glob_regex_is_anchored_and_escaped() {
        let pattern = glob_regex("libfoo*.so").unwrap();
        assert!(pattern.is_match("libfoo.so"));
        assert!(pattern.is_match("libfoo_v2.so"));
        assert!(!pattern.is_match("libfooXso"));
        assert!(!pattern.is_match("libfoo.so.1"));
        assert!(!pattern.is_match("LIBFOO.so"));

        let single = glob_regex("lib?.so").unwrap();
        assert!(single.is_match("liba.so"));
        assert!(!single.is_match("libab.so"));
    }

    #[test]
    fn index_matches_exact_and_wildcard_names() {
        let index = FileIndex::from_paths(vec![
            PathBuf::from("/r/lib64/libfoo.so"),
            PathBuf::from("/r/lib/libfoo.so"),
            PathBuf::from("/r/lib64/libfoo_v2.so"),
            PathBuf::from("/r/lib64/libbar.so"),
        ]);

        assert_eq!(
            index.matching("libfoo.so"),
            vec![PathBuf::from("/r/lib/libfoo.so"), PathBuf::from("/r/lib64/libfoo.so")]
        );
        assert_eq!(index.matching("libfoo*.so").len(), 3);
        assert!(index.matching("libmissing.so").is_empty());
        assert_eq!(index.len(), 4);
    }
}
