//! Hardware encoder options.
//!
//! HandBrake exposes vendor tuning through `--encoder-preset`,
//! `--encoder-profile` and `--encoder-level`.

use crate::engine::hardware::HardwareCapability;

/// Preset, profile and level for a hardware encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HwEncodingConfig {
    pub preset: &'static str,
    pub profile: &'static str,
    pub level: &'static str,
}

impl HwEncodingConfig {
    /// Options for a vendor's encoders, `None` for software encoding
    pub fn for_vendor(vendor: HardwareCapability) -> Option<Self> {
        let (preset, profile) = match vendor {
            HardwareCapability::None => return None,
            HardwareCapability::Nvidia => ("slow", "high"),
            HardwareCapability::Intel => ("balanced", "main"),
            HardwareCapability::Amd => ("slow", "main"),
        };

        Some(Self {
            preset,
            profile,
            level: "auto",
        })
    }

    pub fn args(&self) -> [&'static str; 6] {
        [
            "--encoder-preset",
            self.preset,
            "--encoder-profile",
            self.profile,
            "--encoder-level",
            self.level,
        ]
    }
}
