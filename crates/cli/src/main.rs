use std::path::PathBuf;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use crashsift::commands::{analyze_command, list_tools_command};
use crashsift::load_config;
use crashsift::logging::init_logging;
use crashsift_core::config::AnalyzerConfig;

/// Crash summaries from core dumps.
///
/// This CLI is a thin wrapper around `crashsift-core`: it locates the binary that
/// produced a core file, runs gdb (falling back to dbx) against the pair and prints
/// the signal, failing function and stack trace.
#[derive(Parser, Debug)]
#[command(
    name = "crashsift",
    version,
    about = "Summarize a crash from its core dump",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Core file to analyze (`.Z` files are uncompressed and recompressed).
    ///
    /// A core file named `tools` must be given as `./tools` or after `--`.
    core: Option<String>,

    /// Config file (.json, .yaml or .yml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON instead of human-readable text.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Path to gdb (overrides config and CRASHSIFT_GDB).
    #[arg(long)]
    gdb: Option<PathBuf>,

    /// Path to dbx (overrides config and CRASHSIFT_DBX).
    #[arg(long)]
    dbx: Option<PathBuf>,

    /// Seconds to wait for each debugger before killing it; 0 waits forever.
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum number of stack frames to print.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the external tools crashsift launches and whether they are installed.
    Tools,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let config = build_config(&cli)?;

    match (&cli.command, &cli.core) {
        (Some(Command::Tools), _) => list_tools_command(&config, cli.json)?,
        (None, Some(core)) => analyze_command(core, &config, cli.json)?,
        (None, None) => Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "a core file is required")
            .exit(),
    }

    Ok(())
}

/// Config file, then environment, then command-line flags.
fn build_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(gdb) = &cli.gdb {
        config.tools.gdb = gdb.clone();
    }
    if let Some(dbx) = &cli.dbx {
        config.tools.dbx = dbx.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = Some(timeout);
    }
    if let Some(max_frames) = cli.max_frames {
        config.max_frames = max_frames;
    }
    Ok(config)
}
