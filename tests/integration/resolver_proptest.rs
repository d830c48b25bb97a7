// Property tests for encoder resolution and size formatting

use hbbatch::engine::encoder::{VideoEncoder, hardware_encoder, resolve, select_encoder, validate};
use hbbatch::engine::hardware::HardwareCapability;
use hbbatch::stats::{human_readable_bitrate, human_readable_size};
use proptest::prelude::*;

const TABLE_KEYS: [&str; 5] = ["h264", "x264", "hevc", "x265", "av1"];

fn capability() -> impl Strategy<Value = HardwareCapability> {
    prop_oneof![
        Just(HardwareCapability::None),
        Just(HardwareCapability::Nvidia),
        Just(HardwareCapability::Intel),
        Just(HardwareCapability::Amd),
    ]
}

/// Leading number of a formatted value, e.g. 1.50 from "1.50 KB"
fn magnitude(formatted: &str) -> f64 {
    formatted
        .split(' ')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(f64::NAN)
}

proptest! {
    #[test]
    fn prop_unmapped_requests_resolve_unchanged(
        codec in "[a-z0-9_]{1,12}",
        cap in capability(),
    ) {
        prop_assume!(!TABLE_KEYS.contains(&codec.as_str()));
        prop_assert_eq!(resolve(&codec, cap), codec);
    }

    #[test]
    fn prop_software_host_never_maps(codec in "[a-z0-9_]{0,12}") {
        prop_assert_eq!(resolve(&codec, HardwareCapability::None), codec);
    }

    #[test]
    fn prop_off_allowlist_names_fall_back_to_x264(name in "[a-z0-9_]{0,16}") {
        prop_assume!(VideoEncoder::from_handbrake_name(&name).is_none());
        prop_assert_eq!(validate(&name), VideoEncoder::X264);
    }

    #[test]
    fn prop_selection_always_in_allowlist(
        codec in prop_oneof![
            Just("h264".to_string()),
            Just("hevc".to_string()),
            Just("av1".to_string()),
            "[a-z0-9]{1,8}",
        ],
        cap in capability(),
    ) {
        let encoder = select_encoder(&codec, cap);
        prop_assert!(VideoEncoder::ALL.contains(&encoder));
        // a hardware encoder only ever comes from the host's own vendor
        if encoder.is_hardware() {
            prop_assert_eq!(encoder.vendor(), cap);
            prop_assert_eq!(hardware_encoder(&codec, cap), Some(encoder.handbrake_name()));
        }
    }

    #[test]
    fn prop_size_scaling_is_monotonic(a in 0u64..(1u64 << 50), b in 0u64..(1u64 << 50)) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let units = ["B", "KB", "MB", "GB", "TB", "PB"];
        let unit_rank = |s: &str| units.iter().position(|u| s.ends_with(&format!(" {u}")));

        let (fs, fl) = (human_readable_size(small), human_readable_size(large));
        let (rs, rl) = (unit_rank(&fs), unit_rank(&fl));
        prop_assert!(rs <= rl, "{} vs {}", fs, fl);
        if rs == rl {
            prop_assert!(magnitude(&fs) <= magnitude(&fl), "{} vs {}", fs, fl);
        }
    }

    #[test]
    fn prop_bitrate_has_two_decimals(bits in any::<u64>()) {
        let formatted = human_readable_bitrate(Some(bits));
        let number = formatted.split(' ').next().unwrap_or_default();
        let decimals = number.split('.').nth(1).map(str::len);
        prop_assert_eq!(decimals, Some(2));
    }
}
