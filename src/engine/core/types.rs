use std::borrow::Cow;
use std::path::PathBuf;

use crate::engine::validate::VerificationFailure;

/// One source file to transcode, created by the batch walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// 1-based position in the batch
    pub sequence_index: usize,
    pub total_jobs: usize,
}

impl TranscodeJob {
    pub fn new(
        input_path: PathBuf,
        output_path: PathBuf,
        sequence_index: usize,
        total_jobs: usize,
    ) -> Self {
        Self {
            input_path,
            output_path,
            sequence_index,
            total_jobs,
        }
    }

    /// Input file name for display
    pub fn file_name(&self) -> Cow<'_, str> {
        self.input_path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_else(|| self.input_path.to_string_lossy())
    }
}

/// Snapshot parsed from one HandBrake progress line.
///
/// Fields are kept verbatim as printed by the transcoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub percent: String,
    pub instantaneous_fps: String,
    pub average_fps: String,
    pub eta: String,
}

/// Result of a job whose encode exited successfully
#[derive(Debug)]
pub enum TranscodeOutcome {
    Verified,
    VerificationFailed(VerificationFailure),
}

impl TranscodeOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Exit status of a transcode process. `code` is `None` when killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ProcessExit {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl std::fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {}", code),
            None => f.write_str("terminated by signal"),
        }
    }
}
