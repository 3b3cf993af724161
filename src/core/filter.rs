use std::collections::HashSet;

/// Decides whether a scanned string names a shared library worth tracking.
///
/// Built once from [`crate::Config`] and shared by every component.
#[derive(Debug, Clone)]
pub struct LibraryFilter {
    suffix: String,
    separators: Vec<char>,
    ignored: HashSet<String>,
}

impl LibraryFilter {
    pub fn new<I>(suffix: String, separators: Vec<char>, ignored: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            suffix,
            separators,
            ignored: ignored.into_iter().collect(),
        }
    }

    /// True iff `name` carries the library suffix, has no separator
    /// characters and is not on the ignore-list. Matching is case-sensitive.
    pub fn is_candidate_library(&self, name: &str) -> bool {
        if !name.ends_with(self.suffix.as_str()) {
            return false;
        }

        if name.contains(self.separators.as_slice()) {
            return false;
        }

        !self.is_ignored(name)
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }
}
