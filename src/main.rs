use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use blobdeps::{ArchStrategy, BlobAnalyzer, Config, JsonReporter, Mode, Toolchain};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "blobdeps",
    version,
    author = "blobdeps developers",
    about = "Shared-library dependency inventory for prebuilt binary blobs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (TOML); defaults to blobdeps.toml in the scanned directory
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Worker pool width
    #[arg(short, long, value_name = "N", global = true)]
    jobs: Option<usize>,

    /// How blob architectures are determined
    #[arg(long, value_enum, default_value_t = ArchMode::Content, global = true)]
    arch_strategy: ArchMode,

    /// Use in-process inspection or the strings/file utilities
    #[arg(long, value_enum, default_value_t = ToolMode::Native, global = true)]
    tools: ToolMode,

    /// Timeout in seconds for each external tool call
    #[arg(long, value_name = "SECS", global = true)]
    timeout: Option<u64>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Consolidated dependency graph of every blob under DIR
    Tree {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
    /// Usage count of every referenced library, least used first
    Usage {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
    /// Libraries transitively required by SEED, resolved within DIR
    Closure {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
        /// Starting binary, relative to DIR
        #[arg(value_name = "SEED")]
        seed: PathBuf,
    },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum ArchMode {
    Content,
    Path,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum ToolMode {
    Native,
    External,
}

impl From<ArchMode> for ArchStrategy {
    fn from(mode: ArchMode) -> Self {
        match mode {
            ArchMode::Content => ArchStrategy::Content,
            ArchMode::Path => ArchStrategy::PathConvention,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    run(cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli, root: &Path) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_default_locations(root)?,
    };

    if let Some(jobs) = cli.jobs {
        config.jobs = Some(jobs);
    }
    if let Some(timeout) = cli.timeout {
        config.tool_timeout_secs = timeout;
    }

    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let (root, mode) = match &cli.command {
        Command::Tree { dir } => (dir.clone(), Mode::Tree),
        Command::Usage { dir } => (dir.clone(), Mode::Usage),
        Command::Closure { dir, seed } => (dir.clone(), Mode::Closure { seed: seed.clone() }),
    };

    let config = load_config(&cli, &root)?;

    let toolchain = match cli.tools {
        ToolMode::Native => Toolchain::native(),
        ToolMode::External => Toolchain::external(config.tool_timeout())
            .context("Failed to start the external tool runner")?,
    };

    let analyzer = BlobAnalyzer::new(&root, config, toolchain, cli.arch_strategy.into())
        .with_context(|| format!("Cannot scan {}", root.display()))?;

    let mut reporter = JsonReporter::stdout();
    analyzer.run(&mode, &mut reporter)?;

    Ok(())
}
