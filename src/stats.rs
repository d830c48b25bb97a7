// Batch counters and human-readable formatting

use std::fmt;

/// Counters for one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Matching files found in the pre-pass
    pub total_jobs: usize,

    /// Jobs whose output passed verification
    pub verified: usize,

    /// Jobs that encoded but failed verification
    pub verification_failed: usize,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.verified + self.verification_failed
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s): {} verified, {} failed verification",
            self.total_jobs, self.verified, self.verification_failed
        )
    }
}

/// Format a byte count on a base-1024 scale, e.g. `1.50 KB`
pub fn human_readable_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} PB", size)
}

/// Format a bitrate on a base-1000 scale, e.g. `1.50 Mbps`; `N/A` when unknown
pub fn human_readable_bitrate(bits_per_second: Option<u64>) -> String {
    const UNITS: [&str; 4] = ["bps", "Kbps", "Mbps", "Gbps"];

    let Some(bits) = bits_per_second else {
        return "N/A".to_string();
    };

    let mut rate = bits as f64;
    for unit in UNITS {
        if rate < 1000.0 {
            return format!("{:.2} {}", rate, unit);
        }
        rate /= 1000.0;
    }
    format!("{:.2} Tbps", rate)
}
