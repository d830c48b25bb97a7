use anyhow::Result;
use hbbatch::config::EncodingConfig;
use hbbatch::engine::TranscodeCommand;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Input and output roots inside a throwaway directory
pub struct TestTree {
    pub dir: TempDir,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl TestTree {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir_all(&input)?;
        Ok(Self { dir, input, output })
    }

    /// Create a file under the input root, with parents
    pub fn add(&self, relative: &str) -> Result<PathBuf> {
        let path = self.input.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, b"source bytes")?;
        Ok(path)
    }

    pub fn config(&self, codec: &str) -> Result<EncodingConfig> {
        config_for(&self.input, &self.output, codec)
    }
}

pub fn config_for(input: &Path, output: &Path, codec: &str) -> Result<EncodingConfig> {
    let json = serde_json::json!({
        "input_directory": input,
        "output_directory": output,
        "file_extensions": [".mp4", ".mkv"],
        "video_codec": codec,
        "quality": 22,
        "audio_bitrate": 160
    });
    Ok(EncodingConfig::parse(
        Path::new("config.json"),
        &json.to_string(),
    )?)
}

/// Program and arguments joined with single spaces, no quoting
pub fn cmd_to_string(cmd: &TranscodeCommand) -> String {
    std::iter::once(&cmd.program)
        .chain(&cmd.args)
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Value following `flag` in a command
pub fn arg_after(cmd: &TranscodeCommand, flag: &str) -> Option<String> {
    cmd.args
        .iter()
        .position(|a| a == flag)
        .and_then(|i| cmd.args.get(i + 1))
        .map(|a| a.to_string_lossy().into_owned())
}

/// A HandBrake progress line as printed between carriage returns
pub fn progress_line(percent: &str, fps: &str, avg: &str, eta: &str) -> String {
    format!("Encoding: task 1 of 1, {percent} % ({fps} fps, avg {avg} fps, ETA {eta})")
}
