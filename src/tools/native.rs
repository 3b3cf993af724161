use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use super::{ArchDetector, StringScanner};

const MIN_STRING_LEN: usize = 4;

const ELF_MAGIC_32: &[u8; 5] = b"\x7fELF\x01";
const ELF_MAGIC_64: &[u8; 5] = b"\x7fELF\x02";

/// In-process equivalent of `strings(1)` with its default minimum length
#[derive(Debug, Clone)]
pub struct NativeStrings {
    min_len: usize,
}

impl NativeStrings {
    pub fn new() -> Self {
        Self {
            min_len: MIN_STRING_LEN,
        }
    }

    pub fn with_min_len(min_len: usize) -> Self {
        Self {
            min_len: min_len.max(1),
        }
    }

    /// Split a byte buffer into runs of printable ASCII
    pub fn extract_from_bytes(&self, data: &[u8]) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut start = None;

        for (i, &byte) in data.iter().enumerate() {
            if is_printable(byte) {
                start.get_or_insert(i);
                continue;
            }
            if let Some(s) = start.take() {
                self.push_run(&data[s..i], &mut tokens);
            }
        }
        if let Some(s) = start {
            self.push_run(&data[s..], &mut tokens);
        }

        tokens
    }

    fn push_run(&self, run: &[u8], tokens: &mut Vec<String>) {
        if run.len() < self.min_len {
            return;
        }
        // Printable ASCII is always valid UTF-8
        let text = String::from_utf8_lossy(run);
        let text = text.trim_matches('\t');
        if !text.is_empty() {
            tokens.push(text.to_string());
        }
    }
}

impl Default for NativeStrings {
    fn default() -> Self {
        Self::new()
    }
}

fn is_printable(byte: u8) -> bool {
    byte == b'\t' || (0x20..=0x7e).contains(&byte)
}

impl StringScanner for NativeStrings {
    fn extract_strings(&self, path: &Path) -> Vec<String> {
        match std::fs::read(path) {
            Ok(data) => self.extract_from_bytes(&data),
            Err(err) => {
                debug!("Cannot read {}: {}", path.display(), err);
                Vec::new()
            }
        }
    }
}

/// Describes a file from its ELF identification bytes
#[derive(Debug, Default, Clone, Copy)]
pub struct ElfHeaderDetector;

impl ElfHeaderDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn describe_header(header: &[u8]) -> &'static str {
        if header.starts_with(ELF_MAGIC_32) {
            "ELF 32-bit"
        } else if header.starts_with(ELF_MAGIC_64) {
            "ELF 64-bit"
        } else {
            "data"
        }
    }
}

impl ArchDetector for ElfHeaderDetector {
    fn describe(&self, path: &Path) -> String {
        let mut header = [0u8; 5];
        let read = File::open(path).and_then(|mut file| file.read_exact(&mut header));

        match read {
            Ok(()) => Self::describe_header(&header).to_string(),
            Err(err) => {
                debug!("Cannot read header of {}: {}", path.display(), err);
                "data".to_string()
            }
        }
    }
}
