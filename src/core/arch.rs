use dashmap::DashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::config::{ArchDirs, Config};
use crate::tools::ArchDetector;

/// Target bit-width of a blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Architecture {
    #[serde(rename = "32")]
    Bits32,
    #[serde(rename = "64")]
    Bits64,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Architecture {
    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::Bits32 => "32",
            Architecture::Bits64 => "64",
            Architecture::Unknown => "unknown",
        }
    }

    pub fn from_bits(bits: &str) -> Self {
        match bits {
            "32" => Architecture::Bits32,
            "64" => Architecture::Bits64,
            _ => Architecture::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != Architecture::Unknown
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a blob's architecture is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchStrategy {
    /// Ask the [`ArchDetector`] for a format description
    #[default]
    Content,
    /// Infer from `lib` / `lib64` directory segments
    PathConvention,
}

fn descriptor_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"ELF (\d{2})-bit").ok())
        .as_ref()
}

/// Parse a format description of the shape `ELF NN-bit`
pub fn parse_descriptor(description: &str) -> Architecture {
    descriptor_pattern()
        .and_then(|pattern| pattern.captures(description))
        .and_then(|captures| captures.get(1))
        .map(|bits| Architecture::from_bits(bits.as_str()))
        .unwrap_or(Architecture::Unknown)
}

/// Maps file paths to architecture tags, memoized per path
pub struct ArchClassifier {
    strategy: ArchStrategy,
    detector: Arc<dyn ArchDetector>,
    non_binary_extensions: Vec<String>,
    arch_dirs: ArchDirs,
    cache: DashMap<PathBuf, Architecture>,
}

impl ArchClassifier {
    pub fn new(config: &Config, strategy: ArchStrategy, detector: Arc<dyn ArchDetector>) -> Self {
        Self {
            strategy,
            detector,
            non_binary_extensions: config.non_binary_extensions.clone(),
            arch_dirs: config.arch_dirs.clone(),
            cache: DashMap::new(),
        }
    }

    pub fn classify(&self, path: &Path) -> Architecture {
        if let Some(arch) = self.cache.get(path) {
            return *arch;
        }

        let arch = self.classify_uncached(path);
        self.cache.insert(path.to_path_buf(), arch);
        arch
    }

    fn classify_uncached(&self, path: &Path) -> Architecture {
        if self.is_non_binary(path) {
            return Architecture::Unknown;
        }

        match self.strategy {
            ArchStrategy::Content => parse_descriptor(&self.detector.describe(path)),
            ArchStrategy::PathConvention => self.from_path_segments(path),
        }
    }

    fn is_non_binary(&self, path: &Path) -> bool {
        let name = path.to_string_lossy();
        self.non_binary_extensions
            .iter()
            .any(|extension| name.ends_with(extension.as_str()))
    }

    /// The directory segment closest to the file decides.
    fn from_path_segments(&self, path: &Path) -> Architecture {
        let parent = path.parent().unwrap_or(path);
        for component in parent.components().rev() {
            let Component::Normal(segment) = component else {
                continue;
            };
            if segment == self.arch_dirs.lib32.as_str() {
                return Architecture::Bits32;
            }
            if segment == self.arch_dirs.lib64.as_str() {
                return Architecture::Bits64;
            }
        }
        Architecture::Unknown
    }
}
