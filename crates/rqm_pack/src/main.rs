//! rqm-pack binary entry point
//!
//! Usage:
//!   rqm-pack [build] [--version X.Y.Z] [--out DIR] [--root DIR] [--legacy]
//!   rqm-pack check [--root DIR]
//!   rqm-pack init-config [--root DIR]

mod args;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rqm_pack_core::config::{ConfigManager, Settings};
use rqm_pack_core::logging::{init_tracing, LogLevel};
use rqm_pack_core::{inspect, package};

use args::{BuildArgs, Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = cli.log_level.map(LogLevel::from);

    match cli.command {
        Some(Command::Build(ref build)) => run_build(build, cli.config.as_deref(), log_level),
        None => run_build(&cli.build, cli.config.as_deref(), log_level),
        Some(Command::Check(ref build)) => run_check(build, cli.config.as_deref(), log_level),
        Some(Command::InitConfig { ref root }) => {
            init_tracing(log_level.unwrap_or_default());
            run_init_config(root, cli.config.as_deref())
        }
    }
}

/// Canonical root plus settings, with tracing initialised from them.
fn prepare(
    args: &BuildArgs,
    config: Option<&Path>,
    log_level: Option<LogLevel>,
) -> Result<(PathBuf, Settings)> {
    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("Repository root not found: {}", args.root.display()))?;

    let settings = ConfigManager::discover(&root, config)
        .context("Failed to load settings")?
        .into_settings();

    let mut level = log_level.unwrap_or(settings.logging.level);
    if log_level.is_none() && level == LogLevel::Info {
        // Console stays at warnings; the build log still records info.
        level = LogLevel::Warn;
    }
    init_tracing(level);
    tracing::debug!("rqm-pack v{} at {}", rqm_pack_core::version(), root.display());

    Ok((root, settings))
}

fn run_build(args: &BuildArgs, config: Option<&Path>, log_level: Option<LogLevel>) -> Result<()> {
    let (root, settings) = prepare(args, config, log_level)?;
    let report = package(args.to_request(root), settings)?;

    println!("{}", report.summary_line());
    Ok(())
}

fn run_check(args: &BuildArgs, config: Option<&Path>, log_level: Option<LogLevel>) -> Result<()> {
    let (root, settings) = prepare(args, config, log_level)?;
    let resolved = inspect(args.to_request(root), settings)?;

    println!("mode:      {}", resolved.mode);
    println!("id:        {}", resolved.folder_id);
    println!("version:   {}", resolved.version);
    if let Some(ref v) = resolved.manifest_version {
        println!("manifest:  {}", v);
    }
    if let Some(ref v) = resolved.init_version {
        println!("__init__:  {}", v);
    }
    println!("archive:   {}", resolved.archive_file_name());
    println!("sources:   agree");
    Ok(())
}

fn run_init_config(root: &Path, config: Option<&Path>) -> Result<()> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => root.join(ConfigManager::DEFAULT_FILE_NAME),
    };

    let mut manager = ConfigManager::new(&path);
    let created = manager
        .load_or_create()
        .with_context(|| format!("Failed to initialise {}", path.display()))?;

    if created {
        println!("Wrote {}", manager.path().display());
    } else {
        println!("{} already exists", manager.path().display());
    }
    Ok(())
}
