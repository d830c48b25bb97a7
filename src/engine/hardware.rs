//! GPU vendor detection and external tool presence checks

use std::fmt;
use std::io;
use std::process::{Command, Stdio};
use tracing::{debug, error, info};

/// Hardware acceleration available on this host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum HardwareCapability {
    #[default]
    None,
    Nvidia,
    Intel,
    Amd,
}

impl HardwareCapability {
    pub fn is_accelerated(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "cpu",
            Self::Nvidia => "nvidia",
            Self::Intel => "intel",
            Self::Amd => "amd",
        }
    }
}

impl fmt::Display for HardwareCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a vendor diagnostic tool signals that its hardware is usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessCheck {
    ExitStatus,
    StdoutContains(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct DiagnosticTool {
    pub vendor: HardwareCapability,
    pub program: &'static str,
    pub check: SuccessCheck,
}

/// Diagnostic tools in detection priority order
pub const DIAGNOSTIC_TOOLS: [DiagnosticTool; 3] = [
    DiagnosticTool {
        vendor: HardwareCapability::Nvidia,
        program: "nvidia-smi",
        check: SuccessCheck::ExitStatus,
    },
    DiagnosticTool {
        vendor: HardwareCapability::Intel,
        program: "vainfo",
        check: SuccessCheck::StdoutContains("Intel"),
    },
    DiagnosticTool {
        vendor: HardwareCapability::Amd,
        program: "rocm-smi",
        check: SuccessCheck::ExitStatus,
    },
];

/// What a diagnostic tool reported when it ran
#[derive(Debug, Clone, Default)]
pub struct DiagnosticOutput {
    pub success: bool,
    pub stdout: String,
}

impl DiagnosticTool {
    fn accepts(&self, output: &DiagnosticOutput) -> bool {
        match self.check {
            SuccessCheck::ExitStatus => output.success,
            SuccessCheck::StdoutContains(needle) => output.stdout.contains(needle),
        }
    }
}

/// Run a diagnostic tool. `Ok(None)` means the tool is not installed.
fn run_diagnostic(program: &str) -> io::Result<Option<DiagnosticOutput>> {
    match Command::new(program)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
    {
        Ok(output) => Ok(Some(DiagnosticOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        })),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Detect the host's hardware acceleration vendor.
///
/// Never fails: detection errors are logged and reported as `None`.
pub fn detect() -> HardwareCapability {
    detect_with(run_diagnostic)
}

/// Detection over an injectable tool runner.
///
/// Tools are tried in [`DIAGNOSTIC_TOOLS`] order and the first one that is
/// installed and reports success wins. The first invocation error stops
/// detection and yields `None`.
pub fn detect_with<F>(mut run: F) -> HardwareCapability
where
    F: FnMut(&str) -> io::Result<Option<DiagnosticOutput>>,
{
    for tool in DIAGNOSTIC_TOOLS {
        match run(tool.program) {
            Ok(Some(output)) if tool.accepts(&output) => {
                debug!("{} reported {} hardware", tool.program, tool.vendor);
                return tool.vendor;
            }
            Ok(Some(_)) => debug!("{} ran but did not report usable hardware", tool.program),
            Ok(None) => debug!("{} not installed", tool.program),
            Err(e) => {
                error!("Error detecting GPU: {}", e);
                return HardwareCapability::None;
            }
        }
    }

    HardwareCapability::None
}

/// Check whether an external tool can be executed.
///
/// Only a missing executable counts as unavailable; any other spawn or exit
/// failure still means the tool is there.
pub fn tool_available(name: &str) -> bool {
    match Command::new(name)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(_) => true,
        Err(e) => e.kind() != io::ErrorKind::NotFound,
    }
}

/// Host capabilities, detected once per run and shared by every job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub hardware: HardwareCapability,
    pub transcoder_available: bool,
}

impl Capabilities {
    pub fn new(hardware: HardwareCapability, transcoder_available: bool) -> Self {
        Self {
            hardware,
            transcoder_available,
        }
    }

    /// Probe the host for GPU support and the given transcoder executable
    pub fn detect(transcoder: &str) -> Self {
        Self::with_hardware(detect(), transcoder)
    }

    /// Reuse an earlier hardware detection, only checking the transcoder
    pub fn with_hardware(hardware: HardwareCapability, transcoder: &str) -> Self {
        let transcoder_available = tool_available(transcoder);
        if !transcoder_available {
            info!("{} was not found on this host", transcoder);
        }
        Self::new(hardware, transcoder_available)
    }
}
