// Media probing using ffprobe

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed for {}: {stderr}", .path.display())]
    Failed {
        tool: String,
        path: PathBuf,
        stderr: String,
    },

    #[error("Failed to parse probe output for {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No {field} in probe output for {}", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("No {kind} stream found in {}", .path.display())]
    MissingStream { path: PathBuf, kind: &'static str },

    #[error("Failed to read metadata of {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStream {
    pub codec_name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStream {
    pub codec_name: String,
}

/// Format and stream metadata of one media file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub path: PathBuf,
    pub video: Option<VideoStream>,
    pub audio: Option<AudioStream>,
    /// Container bitrate in bits per second, `None` when ffprobe reports N/A
    pub bitrate: Option<u64>,
    pub duration_seconds: f64,
    pub file_size_bytes: u64,
}

impl MediaDescriptor {
    /// First video stream; an error when the file has none
    pub fn video(&self) -> Result<&VideoStream, ProbeError> {
        self.video.as_ref().ok_or_else(|| ProbeError::MissingStream {
            path: self.path.clone(),
            kind: "video",
        })
    }

    /// First audio stream; an error when the file has none
    pub fn audio(&self) -> Result<&AudioStream, ProbeError> {
        self.audio.as_ref().ok_or_else(|| ProbeError::MissingStream {
            path: self.path.clone(),
            kind: "audio",
        })
    }

    pub fn resolution(&self) -> Option<String> {
        self.video
            .as_ref()
            .map(|v| format!("{}x{}", v.width, v.height))
    }
}

/// Source of media metadata
pub trait Prober {
    fn probe(&self, path: &Path) -> Result<MediaDescriptor, ProbeError>;
}

/// `Prober` backed by the ffprobe executable
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: String,
}

impl Ffprobe {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl Prober for Ffprobe {
    fn probe(&self, path: &Path) -> Result<MediaDescriptor, ProbeError> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .map_err(|source| ProbeError::Spawn {
                tool: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                tool: self.program.clone(),
                path: path.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let file_size_bytes = std::fs::metadata(path)
            .map_err(|source| ProbeError::Metadata {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        let json_str = String::from_utf8_lossy(&output.stdout);
        parse_ffprobe_output(path, &json_str, file_size_bytes)
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse ffprobe's `-print_format json -show_format -show_streams` output
pub fn parse_ffprobe_output(
    path: &Path,
    json: &str,
    file_size_bytes: u64,
) -> Result<MediaDescriptor, ProbeError> {
    let probe: FfprobeOutput = serde_json::from_str(json).map_err(|source| ProbeError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let missing = |field| ProbeError::MissingField {
        path: path.to_path_buf(),
        field,
    };

    let format = probe.format.ok_or_else(|| missing("format"))?;

    let duration_seconds = format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .ok_or_else(|| missing("duration"))?;

    // ffprobe prints "N/A" for streams it cannot measure
    let bitrate = format
        .bit_rate
        .as_deref()
        .and_then(|b| b.trim().parse::<u64>().ok());

    let first_of = |kind: &str| {
        probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
    };

    let video = match first_of("video") {
        Some(stream) => Some(VideoStream {
            codec_name: stream.codec_name.clone().unwrap_or_default(),
            width: stream.width.ok_or_else(|| missing("width"))?,
            height: stream.height.ok_or_else(|| missing("height"))?,
        }),
        None => None,
    };

    let audio = first_of("audio").map(|stream| AudioStream {
        codec_name: stream.codec_name.clone().unwrap_or_default(),
    });

    Ok(MediaDescriptor {
        path: path.to_path_buf(),
        video,
        audio,
        bitrate,
        duration_seconds,
        file_size_bytes,
    })
}
