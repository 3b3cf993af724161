use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::tools::FileLister;

/// Recursive listing of regular files; symlinks are not followed or reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkDirLister;

impl WalkDirLister {
    pub fn new() -> Self {
        Self
    }
}

impl FileLister for WalkDirLister {
    fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        let entries: Vec<_> = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .collect();

        entries
            .par_iter()
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.path().to_path_buf())
            .collect()
    }
}
