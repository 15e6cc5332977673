mod args;
mod cmd;
mod output;
mod root;

use anyhow::Context;
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use upsync_core::{
    config::{Config, Engine, WarnLevel},
    launcher::{self, Mode},
    runner::ActionOptions,
};

#[derive(Parser)]
#[command(
    name = "upsync",
    about = "Sync a forked submodule with its upstream remote",
    long_about = "Sync a forked submodule with its upstream remote.\n\n\
                  With no flags the runner starts in interactive mode. \
                  PowerShell-style switches (-Help, -DryRun, -Action <name>) are accepted too.",
    version
)]
struct Cli {
    /// Report what would change without touching the working tree
    #[arg(long)]
    dry_run: bool,

    /// Run a single named action (status, fetch, summary, preview, apply, select, conflicts, protect)
    #[arg(long, value_name = "NAME")]
    action: Option<String>,

    /// Repository root (default: auto-detect from .git)
    #[arg(long, env = "UPSYNC_ROOT")]
    root: Option<PathBuf>,

    /// Python interpreter to use instead of detecting python/python3
    #[arg(long, env = "UPSYNC_PYTHON")]
    python: Option<PathBuf>,

    /// Runner script (default: from .upsync.yaml, else sync_upstream.py)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Use the built-in runner instead of the Python script
    #[arg(long)]
    native: bool,

    /// Apply without asking for confirmation (native runner)
    #[arg(long)]
    yes: bool,

    /// File to take from upstream with `--action select` (repeatable)
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<String>,

    /// Output reports as JSON (native runner)
    #[arg(long, short = 'j')]
    json: bool,

    /// Write a default .upsync.yaml and exit
    #[arg(long)]
    init: bool,
}

fn main() {
    let cli = Cli::parse_from(args::normalize_args(std::env::args_os()));

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let root = root::resolve_root(cli.root.as_deref());

    match run(&cli, &root) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, root: &Path) -> anyhow::Result<i32> {
    if cli.init {
        cmd::init::run(root, cli.json)?;
        return Ok(0);
    }

    let config = Config::load(root).context("failed to load .upsync.yaml")?;
    for warning in config.validate() {
        match warning.level {
            WarnLevel::Error => tracing::error!("config: {}", warning.message),
            WarnLevel::Warning => tracing::warn!("config: {}", warning.message),
        }
    }

    if cli.dry_run && cli.action.is_some() {
        tracing::warn!("--dry-run given, ignoring --action");
    }
    let mode = Mode::from_flags(cli.dry_run, cli.action.clone());

    let engine = if cli.native {
        Engine::Native
    } else {
        config.engine
    };

    let code = match engine {
        Engine::Python => cmd::launch::run(
            root,
            &config,
            &mode,
            cli.python.as_deref(),
            cli.script.as_deref(),
        )?,
        Engine::Native => {
            let opts = ActionOptions {
                yes: cli.yes,
                files: cli.files.clone(),
            };
            cmd::native::run(root, config.clone(), &mode, &opts, cli.json)?
        }
    };

    output::print_next_steps(&launcher::next_steps(&config), cli.json);
    Ok(code)
}
