//! Property tests for the light classifier and door state machine.

use proptest::prelude::*;

use coop_door::{classify, DoorActuator, DoorPosition, Frame, Prediction, ServoProfile};

fn luma(rgb: [u8; 3]) -> f32 {
    let [r, g, b] = rgb.map(|c| c as u32);
    ((r * 4899 + g * 9617 + b * 1868 + (1 << 13)) >> 14) as f32
}

fn arb_rgb() -> impl Strategy<Value = [u8; 3]> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| [r, g, b])
}

proptest! {
    /// Darker gray frames are never less confidently night.
    #[test]
    fn night_confidence_grows_as_brightness_falls(
        a in 0u8..80,
        b in 0u8..80,
    ) {
        let (darker, lighter) = if a <= b { (a, b) } else { (b, a) };
        let dark = classify(&Frame::filled(6, 6, [darker; 3]), 80.0);
        let light = classify(&Frame::filled(6, 6, [lighter; 3]), 80.0);

        prop_assert_eq!(dark.prediction, Prediction::Night);
        prop_assert_eq!(light.prediction, Prediction::Night);
        prop_assert!(dark.confidence >= light.confidence);
        if darker < lighter {
            prop_assert!(dark.confidence > light.confidence);
        }
    }

    /// Uniform frames land in the region their brightness and colour ratios pick.
    #[test]
    fn uniform_frames_follow_decision_regions(
        rgb in arb_rgb(),
        threshold in 1.0f32..=255.0,
    ) {
        let [r, g, b] = rgb.map(|c| c as u32);
        // Exactly on the warm boundary float rounding may go either way.
        prop_assume!(5 * r != 6 * b);

        let result = classify(&Frame::filled(5, 5, rgb), threshold);
        let brightness = luma(rgb);
        prop_assert_eq!(result.metrics.brightness, brightness);

        let sum = (r + g + b) as f32;
        if sum > 0.0 {
            prop_assert!((result.metrics.red_ratio - r as f32 / sum).abs() < 1e-5);
            prop_assert!((result.metrics.blue_ratio - b as f32 / sum).abs() < 1e-5);
        }

        let expected = if brightness < threshold {
            Prediction::Night
        } else if 5 * r > 6 * b {
            Prediction::GoldenHour
        } else {
            Prediction::Day
        };
        prop_assert_eq!(result.prediction, expected);
    }

    /// Confidence and ratios stay within [0, 1] for any frame and threshold.
    #[test]
    fn outputs_are_bounded(
        pixels in proptest::collection::vec(arb_rgb(), 1..64),
        threshold in 0.5f32..=255.0,
    ) {
        let width = pixels.len() as u32;
        let data: Vec<u8> = pixels.iter().flatten().copied().collect();
        let frame = Frame::from_rgb(data, width, 1).expect("valid frame");
        let result = classify(&frame, threshold);

        prop_assert!((0.0..=1.0).contains(&result.confidence));
        prop_assert!((0.0..=1.0).contains(&result.metrics.red_ratio));
        prop_assert!((0.0..=1.0).contains(&result.metrics.blue_ratio));
        prop_assert!((0.0..=255.0).contains(&result.metrics.brightness));
    }

    /// Any command sequence leaves the door at the last command, with one
    /// drive write per command.
    #[test]
    fn door_tracks_last_command(commands in proptest::collection::vec(any::<bool>(), 0..32)) {
        let (actuator, recorder) = DoorActuator::with_mock(ServoProfile::default());
        for &open in &commands {
            if open {
                actuator.open_door().expect("open");
            } else {
                actuator.close_door().expect("close");
            }
        }
        let expected = match commands.last() {
            Some(true) => DoorPosition::Open,
            _ => DoorPosition::Closed,
        };
        prop_assert_eq!(actuator.position(), expected);
        prop_assert_eq!(recorder.duties().len(), commands.len());
    }
}

#[test]
fn extreme_frames_are_clamped() {
    for rgb in [[0, 0, 0], [255, 255, 255], [255, 0, 0], [0, 0, 255]] {
        let result = classify(&Frame::filled(10, 10, rgb), 80.0);
        assert!((0.0..=1.0).contains(&result.confidence), "{rgb:?}");
    }
}
