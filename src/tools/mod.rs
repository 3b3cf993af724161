//! Capabilities the engine consumes: file enumeration, string extraction and
//! file-format description. Each has an in-process implementation and one that
//! shells out to the classic inspection utilities.

pub mod native;
pub mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub use native::{ElfHeaderDetector, NativeStrings};
pub use process::{FileCommand, StringsCommand, ToolRunner};

use crate::core::scanner::WalkDirLister;

/// Recursive enumeration of regular files below a root
pub trait FileLister: Send + Sync {
    fn list_files(&self, root: &Path) -> Vec<PathBuf>;
}

/// Printable-text tokens found in a file's bytes.
///
/// Implementations must not fail: an unreadable file yields no tokens.
pub trait StringScanner: Send + Sync {
    fn extract_strings(&self, path: &Path) -> Vec<String>;
}

/// Human-readable format description such as `ELF 64-bit LSB shared object`
pub trait ArchDetector: Send + Sync {
    fn describe(&self, path: &Path) -> String;
}

/// The set of collaborators a run is wired with
#[derive(Clone)]
pub struct Toolchain {
    pub lister: Arc<dyn FileLister>,
    pub strings: Arc<dyn StringScanner>,
    pub detector: Arc<dyn ArchDetector>,
}

impl Toolchain {
    /// Pure in-process implementations; no external programs required.
    pub fn native() -> Self {
        Self {
            lister: Arc::new(WalkDirLister::new()),
            strings: Arc::new(NativeStrings::new()),
            detector: Arc::new(ElfHeaderDetector::new()),
        }
    }

    /// `strings(1)` and `file(1)` with a bounded execution time per call
    pub fn external(timeout: Duration) -> std::io::Result<Self> {
        let runner = Arc::new(ToolRunner::new(timeout)?);
        Ok(Self::native()
            .with_strings(Arc::new(StringsCommand::new(runner.clone())))
            .with_detector(Arc::new(FileCommand::new(runner))))
    }

    pub fn with_strings(mut self, strings: Arc<dyn StringScanner>) -> Self {
        self.strings = strings;
        self
    }

    pub fn with_detector(mut self, detector: Arc<dyn ArchDetector>) -> Self {
        self.detector = detector;
        self
    }
}
