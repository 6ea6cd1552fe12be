mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, sync::TrackerArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "todo-sync",
    about = "Sync TODO.md task blocks with GitHub issues",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .git/)
    #[arg(long, global = true, env = "TODO_SYNC_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, update, close and reopen issues to match the TODO documents
    Sync {
        #[command(flatten)]
        tracker: TrackerArgs,

        /// Fetch issues and print the plan without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List the task blocks found in the TODO documents
    Tasks,

    /// Inspect the .todo-sync.yaml settings
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Sync { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_ansi(false)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Sync { tracker, dry_run } => cmd::sync::run(&root, tracker, dry_run, cli.json),
        Commands::Tasks => cmd::tasks::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
