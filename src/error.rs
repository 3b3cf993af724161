use std::path::PathBuf;

/// Invocation-level failures.
///
/// Per-file problems (unreadable blobs, failing inspection tools, unresolved
/// libraries) never surface here; they degrade to empty results in place.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("seed file not found: {}", .0.display())]
    SeedNotFound(PathBuf),

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write report: {0}")]
    Output(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    Write(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
