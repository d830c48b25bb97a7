//! Mapping from a requested codec and detected hardware to a HandBrake encoder

use std::fmt;
use tracing::warn;

use super::hardware::HardwareCapability;

/// Encoders this tool is willing to hand to HandBrakeCLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VideoEncoder {
    #[default]
    X264, // Software H.264
    X265, // Software H.265

    NvencH264,
    NvencH265,
    NvencAv1,

    QsvH264,
    QsvH265,

    VceH264,
    VceH265,
}

impl VideoEncoder {
    pub const ALL: [VideoEncoder; 9] = [
        Self::X264,
        Self::X265,
        Self::NvencH264,
        Self::NvencH265,
        Self::NvencAv1,
        Self::QsvH264,
        Self::QsvH265,
        Self::VceH264,
        Self::VceH265,
    ];

    /// Name passed to HandBrakeCLI's `-e`
    pub fn handbrake_name(&self) -> &'static str {
        match self {
            Self::X264 => "x264",
            Self::X265 => "x265",
            Self::NvencH264 => "nvenc_h264",
            Self::NvencH265 => "nvenc_h265",
            Self::NvencAv1 => "nvenc_av1",
            Self::QsvH264 => "qsv_h264",
            Self::QsvH265 => "qsv_h265",
            Self::VceH264 => "vce_h264",
            Self::VceH265 => "vce_h265",
        }
    }

    pub fn from_handbrake_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|encoder| encoder.handbrake_name() == name)
    }

    /// Vendor whose hardware runs this encoder, `None` for software encoders
    pub fn vendor(&self) -> HardwareCapability {
        match self {
            Self::X264 | Self::X265 => HardwareCapability::None,
            Self::NvencH264 | Self::NvencH265 | Self::NvencAv1 => HardwareCapability::Nvidia,
            Self::QsvH264 | Self::QsvH265 => HardwareCapability::Intel,
            Self::VceH264 | Self::VceH265 => HardwareCapability::Amd,
        }
    }

    pub fn is_hardware(&self) -> bool {
        self.vendor().is_accelerated()
    }
}

impl fmt::Display for VideoEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.handbrake_name())
    }
}

/// Hardware encoder for a codec request on a given vendor, if the vendor has one
pub fn hardware_encoder(requested: &str, capability: HardwareCapability) -> Option<&'static str> {
    match capability {
        HardwareCapability::None => None,
        HardwareCapability::Nvidia => match requested {
            "h264" | "x264" => Some("nvenc_h264"),
            "hevc" | "x265" => Some("nvenc_h265"),
            "av1" => Some("nvenc_av1"),
            _ => None,
        },
        HardwareCapability::Intel => match requested {
            "h264" | "x264" => Some("qsv_h264"),
            "hevc" | "x265" => Some("qsv_h265"),
            "av1" => Some("qsv_av1"),
            _ => None,
        },
        HardwareCapability::Amd => match requested {
            "h264" | "x264" => Some("vce_h264"),
            "hevc" | "x265" => Some("vce_h265"),
            _ => None,
        },
    }
}

/// Resolve a codec request against the hardware table.
///
/// Requests without a hardware mapping come back unchanged.
pub fn resolve(requested: &str, capability: HardwareCapability) -> String {
    hardware_encoder(requested, capability)
        .map(str::to_string)
        .unwrap_or_else(|| requested.to_string())
}

/// Check a resolved name against the supported set, falling back to x264
pub fn validate(resolved: &str) -> VideoEncoder {
    VideoEncoder::from_handbrake_name(resolved).unwrap_or_else(|| {
        warn!(
            "Unsupported encoder: {}. Falling back to {}.",
            resolved,
            VideoEncoder::default()
        );
        VideoEncoder::default()
    })
}

/// Pick the encoder for a job: resolve, then validate
pub fn select_encoder(requested: &str, capability: HardwareCapability) -> VideoEncoder {
    validate(&resolve(requested, capability))
}
