//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rqm_pack_core::logging::LogLevel;
use rqm_pack_core::{BuildRequest, PackageMode};

/// Package the Render Queue Manager extension into a versioned zip.
///
/// Without a subcommand, `build` is assumed.
#[derive(Debug, Parser)]
#[command(name = "rqm-pack", about, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub build: BuildArgs,

    /// Settings file (default: <root>/rqm-pack.toml when present).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level; RUST_LOG takes precedence.
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<CliLogLevel>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stage the distributables and write the archive.
    Build(BuildArgs),
    /// Resolve id and version without writing anything.
    Check(BuildArgs),
    /// Write a default settings file.
    InitConfig {
        /// Repository root.
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

/// Options shared by `build` and `check`.
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Repository root containing the manifest and `__init__.py`.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Override version (default: __version__ in __init__.py).
    #[arg(long = "version", value_name = "X.Y.Z")]
    pub version_override: Option<String>,

    /// Staging folder relative to the root (default: dist).
    #[arg(long, value_name = "DIR")]
    pub out: Option<String>,

    /// Package as a legacy add-on using the bl_info version tuple.
    #[arg(long)]
    pub legacy: bool,
}

impl BuildArgs {
    /// Turn the arguments into a request rooted at `root`.
    pub fn to_request(&self, root: PathBuf) -> BuildRequest {
        let mode = if self.legacy {
            PackageMode::LegacyAddon
        } else {
            PackageMode::Extension
        };

        let mut request = BuildRequest::new(root).with_mode(mode);
        if let Some(ref version) = self.version_override {
            request = request.with_version(version.clone());
        }
        if let Some(ref out) = self.out {
            request = request.with_out_folder(out.clone());
        }
        request
    }
}

/// Log level selection for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliLogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli: CliLogLevel) -> Self {
        match cli {
            CliLogLevel::Trace => LogLevel::Trace,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Error => LogLevel::Error,
        }
    }
}
