use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::filter::LibraryFilter;
use crate::error::{Error, Result};

const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// Libraries present on every target image; references to them carry no information.
const BASELINE_LIBRARIES: &[&str] = &[
    "libbase.so",
    "libc++.so",
    "libc.so",
    "libcutils.so",
    "libdl.so",
    "libhardware_legacy.so",
    "libhidlbase.so",
    "libhidltransport.so",
    "libhwbinder.so",
    "liblog.so",
    "libm.so",
    "libprotobuf-cpp-full.so",
    "libsqlite.so",
    "libutils.so",
    "libutilscallstack.so",
    "libxml2.so",
];

/// Extensions of files that are never native binaries.
const NON_BINARY_EXTENSIONS: &[&str] = &[
    ".acdb", ".alias", ".apk", ".b00", ".b01", ".b02", ".b03", ".b04", ".bin", ".cfg", ".cil",
    ".cng", ".conf", ".config", ".dar", ".dat", ".db", ".dep", ".dict", ".dlc", ".elf", ".ftcfg",
    ".fw", ".fw2", ".gz", ".ini", ".json", ".ko", ".mdt", ".pb", ".pem", ".png", ".policy",
    ".prog", ".prop", ".qcom", ".qwsp", ".rc", ".sh", ".sha256", ".sql", ".ttf", ".txt", ".uim",
    ".wav", ".xml",
];

const CONFIG_FILE_NAMES: &[&str] = &[".blobdeps.toml", "blobdeps.toml"];

/// Runtime configuration for a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Libraries assumed pre-installed on the target
    pub ignored_libraries: Vec<String>,

    /// Appended to `ignored_libraries` so a config file can extend the defaults
    pub extra_ignored_libraries: Vec<String>,

    /// File name endings that short-circuit architecture detection
    pub non_binary_extensions: Vec<String>,

    /// Suffix every shared library name carries
    pub library_suffix: String,

    /// Characters that mark a scanned string as a path or shell fragment
    pub separators: Vec<char>,

    /// Directory naming convention used by path-based classification
    pub arch_dirs: ArchDirs,

    /// Worker pool width, defaults to available parallelism
    pub jobs: Option<usize>,

    /// Upper bound for each external tool invocation
    pub tool_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchDirs {
    pub lib32: String,
    pub lib64: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignored_libraries: BASELINE_LIBRARIES.iter().map(|s| s.to_string()).collect(),
            extra_ignored_libraries: vec![],
            non_binary_extensions: NON_BINARY_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            library_suffix: ".so".to_string(),
            separators: vec![' ', '/', '<', '>'],
            arch_dirs: ArchDirs::default(),
            jobs: None,
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

impl Default for ArchDirs {
    fn default() -> Self {
        Self {
            lib32: "lib".to_string(),
            lib64: "lib64".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `.blobdeps.toml` or `blobdeps.toml` from the scan root, or fall back to defaults
    pub fn from_default_locations(root: &Path) -> Result<Self> {
        for name in CONFIG_FILE_NAMES {
            let path: PathBuf = root.join(name);
            if path.is_file() {
                tracing::debug!("Loading config from {}", path.display());
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Build the shared library filter; every component clones this one table.
    pub fn library_filter(&self) -> Arc<LibraryFilter> {
        let ignored = self
            .ignored_libraries
            .iter()
            .chain(self.extra_ignored_libraries.iter())
            .cloned();

        Arc::new(LibraryFilter::new(
            self.library_suffix.clone(),
            self.separators.clone(),
            ignored,
        ))
    }

    pub fn worker_count(&self) -> usize {
        match self.jobs {
            Some(jobs) if jobs > 0 => jobs,
            _ => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }

    pub fn tool_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tool_timeout_secs.max(1))
    }
}
