//! # blobdeps
//!
//! Shared-library dependency inventory for trees of prebuilt binary blobs.
//!
//! blobdeps walks a directory of executables and shared libraries, works out
//! each blob's architecture and the libraries it references (by scanning its
//! bytes for library names), and derives one of three views:
//!
//! - **Tree**: a graph of blob name to dependencies and architectures, with
//!   same-named 32/64-bit builds merged and dependency-only blobs folded
//!   into the blobs that need them
//! - **Usage**: how many blobs reference each library
//! - **Closure**: every library needed, transitively, by one starting binary
//!
//! Dependencies are inferred heuristically from embedded strings; blobs are
//! never linked, loaded or executed.

pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod tools;

pub use crate::config::Config;
pub use crate::core::{
    ArchStrategy, Architecture, BlobAnalyzer, Closure, DependencyGraph, LibraryFilter, Mode,
};
pub use crate::error::{Error, Result};
pub use crate::formatters::{CollectingReporter, JsonReporter, Record, Reporter};
pub use crate::tools::Toolchain;
