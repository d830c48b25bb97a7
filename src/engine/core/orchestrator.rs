//! Runs one transcode job end to end.
//!
//! Tool check, encoder selection, launch, progress, exit status, then
//! verification and comparison. Encode failures come back as
//! [`TranscodeError`] and stop the batch; verification failures come back as
//! [`TranscodeOutcome::VerificationFailed`] and do not.

use std::io::{Stdout, Write};
use tracing::{error, info, warn};

use super::error::TranscodeError;
use super::handbrake_cmd::{Launcher, TranscodeCommand};
use super::progress::{StatusLine, monitor};
use super::types::{TranscodeJob, TranscodeOutcome};
use crate::config::EncodingConfig;
use crate::engine::encoder::select_encoder;
use crate::engine::hardware::Capabilities;
use crate::engine::probe::Prober;
use crate::engine::validate::{self, Verification};

pub struct Orchestrator<'a, W: Write = Stdout> {
    config: &'a EncodingConfig,
    capabilities: Capabilities,
    launcher: &'a dyn Launcher,
    prober: &'a dyn Prober,
    status: StatusLine<W>,
}

impl<'a> Orchestrator<'a, Stdout> {
    pub fn new(
        config: &'a EncodingConfig,
        capabilities: Capabilities,
        launcher: &'a dyn Launcher,
        prober: &'a dyn Prober,
    ) -> Self {
        Self::with_status_line(config, capabilities, launcher, prober, StatusLine::stdout())
    }
}

impl<'a, W: Write> Orchestrator<'a, W> {
    pub fn with_status_line(
        config: &'a EncodingConfig,
        capabilities: Capabilities,
        launcher: &'a dyn Launcher,
        prober: &'a dyn Prober,
        status: StatusLine<W>,
    ) -> Self {
        Self {
            config,
            capabilities,
            launcher,
            prober,
            status,
        }
    }

    /// Command a job would run on this host
    pub fn command_for(&self, job: &TranscodeJob) -> TranscodeCommand {
        let encoder = select_encoder(&self.config.video_codec, self.capabilities.hardware);
        TranscodeCommand::new(job, self.config, encoder)
    }

    pub fn run(&mut self, job: &TranscodeJob) -> Result<TranscodeOutcome, TranscodeError> {
        if !self.capabilities.transcoder_available {
            error!(
                "{} is not installed or not in the system PATH.",
                self.config.transcoder
            );
            return Err(TranscodeError::ToolMissing {
                tool: self.config.transcoder.clone(),
            });
        }

        let command = self.command_for(job);
        info!("Transcoding: {}", job.input_path.display());
        info!("Command: {}", command);

        let mut process = self
            .launcher
            .launch(&command)
            .map_err(|e| TranscodeError::launch(&self.config.transcoder, command.to_string(), e))?;

        let mut events = monitor(process.output());
        for event in events.by_ref() {
            self.status.render(job, &event);
        }
        let read_error = events.take_error();
        self.status.finish();

        // an undrained pipe can block the child forever
        if read_error.is_some() {
            warn!("Stopping transcoder after its output became unreadable");
            if let Err(e) = process.kill() {
                warn!("Failed to stop transcoder: {}", e);
            }
        }

        let exit = process
            .wait()
            .map_err(|source| TranscodeError::Wait { source })?;

        if !exit.success() {
            error!("Error during transcoding: {}", exit);
            error!("Command that failed: {}", command);
            return Err(TranscodeError::Encode {
                command: command.to_string(),
                exit,
            });
        }

        info!("Transcoding complete: {}", job.file_name());

        match validate::verify(
            self.prober,
            &job.input_path,
            &job.output_path,
            self.config.duration_tolerance_seconds,
        ) {
            Verification::Passed => {
                if let Err(e) = validate::compare(self.prober, &job.input_path, &job.output_path) {
                    warn!("Could not compare {}: {}", job.file_name(), e);
                }
                Ok(TranscodeOutcome::Verified)
            }
            Verification::Failed(reason) => {
                error!("Transcoding verification failed. Please check the output file.");
                Ok(TranscodeOutcome::VerificationFailed(reason))
            }
        }
    }

    pub fn status_line(&self) -> &StatusLine<W> {
        &self.status
    }
}
