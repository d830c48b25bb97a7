use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::types::ProcessExit;

/// Failures that abort the whole batch
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("{tool} is not installed or not on PATH")]
    ToolMissing { tool: String },

    #[error("Failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting for transcoder: {source}")]
    Wait {
        #[source]
        source: io::Error,
    },

    #[error("Transcoding failed ({exit}): {command}")]
    Encode { command: String, exit: ProcessExit },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TranscodeError {
    /// Map a spawn failure, treating a missing executable as `ToolMissing`
    pub fn launch(tool: &str, command: String, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::ToolMissing {
                tool: tool.to_string(),
            }
        } else {
            Self::Launch { command, source }
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
