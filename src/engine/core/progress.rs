//! Live progress extraction from HandBrakeCLI output.
//!
//! HandBrake redraws its progress line with bare carriage returns, so the
//! merged output stream is split on both `\r` and `\n`. Splitting, parsing
//! and display are separate steps: [`OutputLines`] yields raw lines,
//! [`ProgressMonitor`] logs each one and yields the [`ProgressEvent`]s, and
//! [`StatusLine`] draws them.

use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use regex::Regex;
use std::io::{self, BufRead, Stdout, Write};
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::types::{ProgressEvent, TranscodeJob};

static PROGRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Encoding: task \d+ of \d+, (\d+\.\d+) %.*?(\d+\.\d+) fps, avg (\d+\.\d+) fps, ETA (\d+h\d+m\d+s)",
    )
    .expect("Invalid regex")
});

/// Parse one output line; `None` when it is not a progress line
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let caps = PROGRESS_RE.captures(line)?;
    Some(ProgressEvent {
        percent: caps[1].to_string(),
        instantaneous_fps: caps[2].to_string(),
        average_fps: caps[3].to_string(),
        eta: caps[4].to_string(),
    })
}

/// Lines of a byte stream split on `\r` or `\n`, empty pieces skipped
pub struct OutputLines<R> {
    reader: R,
    pending: Vec<u8>,
    done: bool,
}

impl<R: BufRead> OutputLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            done: false,
        }
    }

    fn take_pending(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        line
    }
}

impl<R: BufRead> Iterator for OutputLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            if available.is_empty() {
                self.done = true;
                break;
            }

            match available.iter().position(|&b| b == b'\r' || b == b'\n') {
                Some(pos) => {
                    self.pending.extend_from_slice(&available[..pos]);
                    self.reader.consume(pos + 1);
                    if !self.pending.is_empty() {
                        return Some(Ok(self.take_pending()));
                    }
                }
                None => {
                    let len = available.len();
                    self.pending.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }

        // trailing text without a terminator
        if self.pending.is_empty() {
            None
        } else {
            Some(Ok(self.take_pending()))
        }
    }
}

/// Consumes output lines, logs every one at debug level and yields progress events.
///
/// Finite and not restartable: it ends when the stream closes or a read fails.
/// A failed read is kept for [`ProgressMonitor::take_error`].
pub struct ProgressMonitor<I> {
    lines: I,
    error: Option<io::Error>,
}

impl<I> ProgressMonitor<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I) -> Self {
        Self { lines, error: None }
    }

    /// The read error that ended the stream early, if any
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

impl<I> Iterator for ProgressMonitor<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = ProgressEvent;

    fn next(&mut self) -> Option<ProgressEvent> {
        for line in self.lines.by_ref() {
            match line {
                Ok(line) => {
                    debug!("{}", line);
                    if let Some(event) = parse_progress_line(&line) {
                        return Some(event);
                    }
                }
                Err(e) => {
                    warn!("Error reading transcoder output: {}", e);
                    self.error = Some(e);
                    return None;
                }
            }
        }
        None
    }
}

/// Monitor a transcoder's merged output stream
pub fn monitor<R: BufRead>(reader: R) -> ProgressMonitor<OutputLines<R>> {
    ProgressMonitor::new(OutputLines::new(reader))
}

/// Text of the interactive status line for one event
pub fn format_status(job: &TranscodeJob, event: &ProgressEvent) -> String {
    format!(
        "[{}/{}] {} - Progress: {}% | FPS: {} | ETA: {}",
        job.sequence_index,
        job.total_jobs,
        job.file_name(),
        event.percent,
        event.instantaneous_fps,
        event.eta
    )
}

/// Single overwritable console line.
///
/// Terminal write errors are ignored; the status line is cosmetic.
pub struct StatusLine<W: Write = Stdout> {
    out: W,
    drawn: bool,
}

impl StatusLine<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StatusLine<W> {
    pub fn new(out: W) -> Self {
        Self { out, drawn: false }
    }

    pub fn render(&mut self, job: &TranscodeJob, event: &ProgressEvent) {
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(format_status(job, event))
        )
        .ok();
        self.out.flush().ok();
        self.drawn = true;
    }

    /// End the line if anything was drawn
    pub fn finish(&mut self) {
        if self.drawn {
            writeln!(self.out).ok();
            self.out.flush().ok();
            self.drawn = false;
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}
