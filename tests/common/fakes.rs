// In-process stand-ins for HandBrakeCLI and ffprobe

use hbbatch::engine::probe::{AudioStream, MediaDescriptor, ProbeError, Prober, VideoStream};
use hbbatch::engine::{Launcher, ProcessExit, TranscodeCommand, TranscodeProcess};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::helpers::arg_after;

/// What a fake transcode does for one input file
#[derive(Debug, Clone)]
pub struct Behavior {
    /// Raw merged output, `\r` separated like HandBrake's
    pub output: String,
    pub exit_code: i32,
    /// Bytes written to the `-o` path before exiting; `None` writes nothing
    pub writes: Option<Vec<u8>>,
    /// Reading past `output` fails instead of reaching end of stream
    pub read_error: bool,
}

impl Behavior {
    pub fn succeed() -> Self {
        Self {
            output: format!(
                "[12:00:00] hb_init: starting libhb thread\n{}\r{}\r\nEncode done!\n",
                super::helpers::progress_line("50.00", "120.00", "118.50", "00h00m10s"),
                super::helpers::progress_line("99.90", "121.00", "119.00", "00h00m00s"),
            ),
            exit_code: 0,
            writes: Some(b"encoded bytes".to_vec()),
            read_error: false,
        }
    }

    pub fn fail(exit_code: i32) -> Self {
        Self {
            output: "Encode failed (error 3)\n".to_string(),
            exit_code,
            writes: None,
            read_error: false,
        }
    }

    /// Output breaks after the first progress line; the child would never exit on its own
    pub fn unreadable_output() -> Self {
        Self {
            output: format!(
                "{}\r",
                super::helpers::progress_line("10.00", "90.00", "88.00", "00h01m00s")
            ),
            read_error: true,
            ..Self::succeed()
        }
    }

    pub fn empty_output() -> Self {
        Self {
            writes: Some(Vec::new()),
            ..Self::succeed()
        }
    }
}

/// Launcher that replays scripted behavior keyed on the input file name
pub struct FakeLauncher {
    default: Behavior,
    by_name: HashMap<String, Behavior>,
    pub launched: RefCell<Vec<TranscodeCommand>>,
    kills: Rc<Cell<usize>>,
    missing: bool,
}

impl FakeLauncher {
    pub fn new(default: Behavior) -> Self {
        Self {
            default,
            by_name: HashMap::new(),
            launched: RefCell::new(Vec::new()),
            kills: Rc::new(Cell::new(0)),
            missing: false,
        }
    }

    /// A launcher whose executable does not exist
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::new(Behavior::succeed())
        }
    }

    pub fn with(mut self, file_name: &str, behavior: Behavior) -> Self {
        self.by_name.insert(file_name.to_string(), behavior);
        self
    }

    pub fn launch_count(&self) -> usize {
        self.launched.borrow().len()
    }

    pub fn kill_count(&self) -> usize {
        self.kills.get()
    }
}

struct BrokenPipe;

impl Read for BrokenPipe {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("pipe broke"))
    }
}

struct FakeProcess {
    output: Box<dyn BufRead>,
    exit: ProcessExit,
    /// Set when the scripted process never exits without being killed
    hangs: bool,
    kills: Rc<Cell<usize>>,
}

impl TranscodeProcess for FakeProcess {
    fn output(&mut self) -> &mut dyn BufRead {
        &mut *self.output
    }

    fn wait(&mut self) -> io::Result<ProcessExit> {
        if self.hangs {
            panic!("waited on a transcoder that was never stopped");
        }
        Ok(self.exit)
    }

    fn kill(&mut self) -> io::Result<()> {
        self.kills.set(self.kills.get() + 1);
        self.hangs = false;
        self.exit = ProcessExit { code: None };
        Ok(())
    }
}

impl Launcher for FakeLauncher {
    fn launch(&self, command: &TranscodeCommand) -> io::Result<Box<dyn TranscodeProcess>> {
        if self.missing {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        self.launched.borrow_mut().push(command.clone());

        let input = arg_after(command, "-i").unwrap_or_default();
        let name = Path::new(&input)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let behavior = self.by_name.get(&name).unwrap_or(&self.default);

        if let (Some(bytes), Some(out)) = (&behavior.writes, arg_after(command, "-o")) {
            std::fs::write(out, bytes)?;
        }

        let text = Cursor::new(behavior.output.clone().into_bytes());
        let output: Box<dyn BufRead> = if behavior.read_error {
            Box::new(BufReader::new(text.chain(BrokenPipe)))
        } else {
            Box::new(text)
        };

        Ok(Box::new(FakeProcess {
            output,
            exit: ProcessExit::from_code(behavior.exit_code),
            hangs: behavior.read_error,
            kills: Rc::clone(&self.kills),
        }))
    }
}

/// Prober answering from a duration table; unknown paths get the default
pub struct FakeProber {
    default_duration: f64,
    durations: HashMap<PathBuf, f64>,
}

impl FakeProber {
    pub fn new(default_duration: f64) -> Self {
        Self {
            default_duration,
            durations: HashMap::new(),
        }
    }

    pub fn with_duration(mut self, path: impl Into<PathBuf>, seconds: f64) -> Self {
        self.durations.insert(path.into(), seconds);
        self
    }
}

impl Prober for FakeProber {
    fn probe(&self, path: &Path) -> Result<MediaDescriptor, ProbeError> {
        let file_size_bytes = std::fs::metadata(path)
            .map_err(|source| ProbeError::Metadata {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        Ok(MediaDescriptor {
            path: path.to_path_buf(),
            video: Some(VideoStream {
                codec_name: "h264".to_string(),
                width: 1920,
                height: 1080,
            }),
            audio: Some(AudioStream {
                codec_name: "aac".to_string(),
            }),
            bitrate: Some(4_000_000),
            duration_seconds: self
                .durations
                .get(path)
                .copied()
                .unwrap_or(self.default_duration),
            file_size_bytes,
        })
    }
}
