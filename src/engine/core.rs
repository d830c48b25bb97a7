mod error;
mod handbrake_cmd;
mod hw_config;
mod orchestrator;
mod progress;
mod scan;
mod types;

pub use error::TranscodeError;
pub use handbrake_cmd::{Launcher, SystemLauncher, TranscodeCommand, TranscodeProcess};
pub use hw_config::HwEncodingConfig;
pub use orchestrator::Orchestrator;
pub use progress::{
    OutputLines, ProgressMonitor, StatusLine, format_status, monitor, parse_progress_line,
};
pub use scan::{count_matching, output_path_for, plan_jobs, process, scan_streaming};
pub use types::{ProcessExit, ProgressEvent, TranscodeJob, TranscodeOutcome};
