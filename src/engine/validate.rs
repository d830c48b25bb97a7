//! Post-transcode verification and before/after comparison.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

use super::probe::{MediaDescriptor, ProbeError, Prober};
use crate::stats::{human_readable_bitrate, human_readable_size};

/// Default allowed drift between input and output duration
pub const DEFAULT_DURATION_TOLERANCE: f64 = 1.0;

/// Why an output failed verification
#[derive(Debug, Error)]
pub enum VerificationFailure {
    #[error("Output file does not exist: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("Output file is empty: {}", .0.display())]
    EmptyOutput(PathBuf),

    #[error("Duration mismatch. Input: {input:.2}s, Output: {output:.2}s")]
    DurationMismatch { input: f64, output: f64 },

    #[error("Could not probe for verification: {0}")]
    Probe(#[from] ProbeError),
}

#[derive(Debug)]
pub enum Verification {
    Passed,
    Failed(VerificationFailure),
}

impl Verification {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Check that `output` exists, is non-empty and matches the input duration.
///
/// Checks short-circuit in that order; the probes only run once the file
/// checks pass.
pub fn verify(
    prober: &dyn Prober,
    input: &Path,
    output: &Path,
    tolerance_seconds: f64,
) -> Verification {
    info!("Verifying transcoding...");

    match check_output(prober, input, output, tolerance_seconds) {
        Ok(()) => {
            info!(
                "Verification passed: Output file exists, is non-empty, and has correct duration."
            );
            Verification::Passed
        }
        Err(failure) => {
            error!("Error: {}", failure);
            Verification::Failed(failure)
        }
    }
}

fn check_output(
    prober: &dyn Prober,
    input: &Path,
    output: &Path,
    tolerance_seconds: f64,
) -> Result<(), VerificationFailure> {
    let metadata = match std::fs::metadata(output) {
        Ok(m) => m,
        Err(_) => return Err(VerificationFailure::MissingOutput(output.to_path_buf())),
    };

    if metadata.len() == 0 {
        return Err(VerificationFailure::EmptyOutput(output.to_path_buf()));
    }

    let input_duration = prober.probe(input)?.duration_seconds;
    let output_duration = prober.probe(output)?.duration_seconds;

    if (input_duration - output_duration).abs() > tolerance_seconds {
        return Err(VerificationFailure::DurationMismatch {
            input: input_duration,
            output: output_duration,
        });
    }

    Ok(())
}

const LABEL_WIDTH: usize = 20;
const VALUE_WIDTH: usize = 30;
const RULE_WIDTH: usize = 80;

/// Side-by-side comparison of an input file and its transcode
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub rows: Vec<ComparisonRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub property: &'static str,
    pub input: String,
    pub output: String,
}

impl ComparisonReport {
    /// Build the report from two descriptors. Both need a video and an audio stream.
    pub fn from_descriptors(
        input: &MediaDescriptor,
        output: &MediaDescriptor,
    ) -> Result<Self, ProbeError> {
        let (in_video, out_video) = (input.video()?, output.video()?);
        let (in_audio, out_audio) = (input.audio()?, output.audio()?);

        let row = |property, input: String, output: String| ComparisonRow {
            property,
            input,
            output,
        };

        Ok(Self {
            rows: vec![
                row(
                    "Video Codec",
                    in_video.codec_name.clone(),
                    out_video.codec_name.clone(),
                ),
                row(
                    "Audio Codec",
                    in_audio.codec_name.clone(),
                    out_audio.codec_name.clone(),
                ),
                row(
                    "Resolution",
                    format!("{}x{}", in_video.width, in_video.height),
                    format!("{}x{}", out_video.width, out_video.height),
                ),
                row(
                    "Bitrate",
                    human_readable_bitrate(input.bitrate),
                    human_readable_bitrate(output.bitrate),
                ),
                row(
                    "Duration",
                    format!("{:.2}s", input.duration_seconds),
                    format!("{:.2}s", output.duration_seconds),
                ),
                row(
                    "File Size",
                    human_readable_size(input.file_size_bytes),
                    human_readable_size(output.file_size_bytes),
                ),
            ],
        })
    }

    /// Report lines: header, rule, one line per property
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(format_row("Property", "Input", "Output"));
        lines.push("-".repeat(RULE_WIDTH));
        for row in &self.rows {
            lines.push(format_row(row.property, &row.input, &row.output));
        }
        lines
    }
}

fn format_row(property: &str, input: &str, output: &str) -> String {
    format!(
        "{:<lw$} {:<vw$} {:<vw$}",
        property,
        input,
        output,
        lw = LABEL_WIDTH,
        vw = VALUE_WIDTH
    )
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Video Comparison:")?;
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Probe both files and log the comparison table at info level
pub fn compare(
    prober: &dyn Prober,
    input: &Path,
    output: &Path,
) -> Result<ComparisonReport, ProbeError> {
    let report =
        ComparisonReport::from_descriptors(&prober.probe(input)?, &prober.probe(output)?)?;

    info!("");
    info!("Video Comparison:");
    for line in report.lines() {
        info!("{}", line);
    }

    Ok(report)
}
