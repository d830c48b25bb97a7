use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hbbatch::config::DEFAULT_CONFIG_FILE;
use hbbatch::logging::DEFAULT_LOG_DIR;

#[derive(Parser)]
#[command(name = "hbbatch")]
#[command(about = "Batch transcoder driving HandBrakeCLI", long_about = None)]
pub struct Cli {
    /// Config file (.json, or .toml)
    #[arg(long, short, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Directory for transcoding.log
    #[arg(long, value_name = "DIR", default_value = DEFAULT_LOG_DIR, global = true)]
    pub log_dir: PathBuf,

    /// Show debug messages on the console
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report GPU vendor and whether HandBrakeCLI and ffprobe are installed
    CheckTools,

    /// Show codec, resolution, bitrate, duration and size of a file
    Probe {
        /// Path to the video file
        file: PathBuf,
    },

    /// Show the HandBrakeCLI command for every file without running anything
    DryRun,
}

pub fn parse() -> Cli {
    Cli::parse()
}
