// HandBrakeCLI command construction and process launching

use std::ffi::OsString;
use std::fmt;
use std::io::{self, BufRead, BufReader, PipeReader};
use std::process::{Child, Command, Stdio};

use super::hw_config::HwEncodingConfig;
use super::types::{ProcessExit, TranscodeJob};
use crate::config::EncodingConfig;
use crate::engine::encoder::VideoEncoder;

/// A fully built transcoder invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl TranscodeCommand {
    /// `-i <in> -o <out> -e <encoder> -q <quality> -B <kbps> -t 100%`, plus
    /// vendor preset options when the encoder runs on a GPU
    pub fn new(job: &TranscodeJob, config: &EncodingConfig, encoder: VideoEncoder) -> Self {
        let mut args: Vec<OsString> = vec![
            "-i".into(),
            job.input_path.clone().into(),
            "-o".into(),
            job.output_path.clone().into(),
            "-e".into(),
            encoder.handbrake_name().into(),
            "-q".into(),
            config.quality.to_string().into(),
            "-B".into(),
            config.audio_bitrate.to_string().into(),
            "-t".into(),
            "100%".into(),
        ];

        if let Some(hw) = HwEncodingConfig::for_vendor(encoder.vendor()) {
            args.extend(hw.args().into_iter().map(OsString::from));
        }

        Self {
            program: config.transcoder.clone().into(),
            args,
        }
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for TranscodeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy().into_owned())
            .collect();

        match shlex::try_join(parts.iter().map(String::as_str)) {
            Ok(joined) => f.write_str(&joined),
            // shlex refuses NUL bytes; show the raw words instead
            Err(_) => f.write_str(&parts.join(" ")),
        }
    }
}

/// A running transcoder with stdout and stderr merged into one stream
pub trait TranscodeProcess {
    fn output(&mut self) -> &mut dyn BufRead;

    /// Block until the process exits
    fn wait(&mut self) -> io::Result<ProcessExit>;

    /// Stop the process; used when its output can no longer be read
    fn kill(&mut self) -> io::Result<()>;
}

/// Starts transcoder processes
pub trait Launcher {
    fn launch(&self, command: &TranscodeCommand) -> io::Result<Box<dyn TranscodeProcess>>;
}

/// Launches real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

struct ChildProcess {
    child: Child,
    output: BufReader<PipeReader>,
}

impl TranscodeProcess for ChildProcess {
    fn output(&mut self) -> &mut dyn BufRead {
        &mut self.output
    }

    fn wait(&mut self) -> io::Result<ProcessExit> {
        self.child.wait().map(ProcessExit::from)
    }

    fn kill(&mut self) -> io::Result<()> {
        self.child.kill()
    }
}

impl Launcher for SystemLauncher {
    fn launch(&self, command: &TranscodeCommand) -> io::Result<Box<dyn TranscodeProcess>> {
        let (reader, writer) = io::pipe()?;

        let mut cmd = command.to_command();
        cmd.stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);

        let child = cmd.spawn()?;
        // The Command still owns the write ends; the reader only sees EOF once they close
        drop(cmd);

        Ok(Box::new(ChildProcess {
            child,
            output: BufReader::new(reader),
        }))
    }
}
