use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{ArchDetector, StringScanner};

/// Runs inspection utilities with a bounded execution time.
///
/// Spawn errors, non-zero exits and timeouts all degrade to `None`.
pub struct ToolRunner {
    runtime: tokio::runtime::Runtime,
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(timeout: Duration) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("blobdeps-tools")
            .enable_all()
            .build()?;

        Ok(Self { runtime, timeout })
    }

    /// Run `program [args..] <path>` and return its stdout
    pub fn run(&self, program: &str, args: &[&str], path: &Path) -> Option<String> {
        debug!("Running {} {:?} {}", program, args, path.display());

        let mut command = Command::new(program);
        command
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = self
            .runtime
            .block_on(async { tokio::time::timeout(self.timeout, command.output()).await });

        match result {
            Ok(Ok(output)) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(Ok(output)) => {
                warn!(
                    "{} {} exited with {}: {}",
                    program,
                    path.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                None
            }
            Ok(Err(err)) => {
                warn!("Failed to run {} {}: {}", program, path.display(), err);
                None
            }
            Err(_) => {
                warn!(
                    "{} {} timed out after {:?}",
                    program,
                    path.display(),
                    self.timeout
                );
                None
            }
        }
    }
}

/// `strings <path>`
pub struct StringsCommand {
    runner: Arc<ToolRunner>,
}

impl StringsCommand {
    pub fn new(runner: Arc<ToolRunner>) -> Self {
        Self { runner }
    }
}

impl StringScanner for StringsCommand {
    fn extract_strings(&self, path: &Path) -> Vec<String> {
        self.runner
            .run("strings", &[], path)
            .map(|output| output.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// `file -b <path>`; brief mode keeps the path out of the description
pub struct FileCommand {
    runner: Arc<ToolRunner>,
}

impl FileCommand {
    pub fn new(runner: Arc<ToolRunner>) -> Self {
        Self { runner }
    }
}

impl ArchDetector for FileCommand {
    fn describe(&self, path: &Path) -> String {
        self.runner.run("file", &["-b"], path).unwrap_or_default()
    }
}
