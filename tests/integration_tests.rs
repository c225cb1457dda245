//! Integration tests for the motion beat engine

use stratum_motion::alignment::{motion_envelope, Envelope};
use stratum_motion::analysis::{analyze_clip, AudioTrack, ClipFlag, ClipInput};
use stratum_motion::features::beats::detect_events;
use stratum_motion::io::parse_bvh;
use stratum_motion::rig::UpAxis;
use stratum_motion::{
    extract_motion_beats, load_bvh, AlignmentConfig, BeatParams, JointPositions, MotionStream, OffsetMethod,
    RigIndices,
};
use std::path::PathBuf;

fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}

/// Audio envelope that leads the motion envelope by `shift` seconds, sampled at 100 Hz.
fn leading_audio(motion: &Envelope, duration: f64, shift: f64) -> Envelope {
    let n = ((duration - shift) * 100.0) as usize;
    let values = (0..n).map(|i| motion.interp(i as f64 / 100.0 + shift)).collect();
    Envelope::uniform(values, 100.0).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHANNELS_PER_FRAME: usize = 30;

    #[test]
    fn test_load_walk_cycle() {
        let skeleton = load_bvh(fixture_path("walk_cycle.bvh")).expect("Failed to load walk_cycle.bvh");

        assert_eq!(skeleton.n_frames(), 250);
        assert_eq!(skeleton.len(), 12, "9 joints plus 3 end sites");
        assert!((skeleton.fps() - 25.0).abs() < 1e-9);
        assert!((skeleton.frame_times()[249] - 249.0 * 0.04).abs() < 1e-9);
        assert_eq!(skeleton.find("LeftFoot"), Some(3));
        assert_eq!(skeleton.find("RightFoot_End"), Some(8));
        assert_eq!(skeleton.root().map(|j| j.name.as_str()), Some("Hips"));
    }

    #[test]
    fn test_auto_rig_on_fixture() {
        let clip = ClipInput::from_bvh_file(fixture_path("walk_cycle.bvh"), UpAxis::Y).unwrap();
        assert_eq!(clip.name.as_deref(), Some("walk_cycle"));
        assert_eq!(clip.rig, RigIndices::new(Some(0), Some(3), Some(7)));
    }

    #[test]
    fn test_forward_kinematics_matches_channels() {
        let text = std::fs::read_to_string(fixture_path("walk_cycle.bvh")).unwrap();
        let (hierarchy, motion) = parse_bvh(&text).unwrap();
        assert_eq!(hierarchy.channel_count(), CHANNELS_PER_FRAME);

        let skeleton = load_bvh(fixture_path("walk_cycle.bvh")).unwrap();
        let positions = skeleton.positions();

        for frame in [0, 17, 80, 133, 249] {
            let row = &motion.values[frame * CHANNELS_PER_FRAME..(frame + 1) * CHANNELS_PER_FRAME];
            let root = positions.get(frame, 0);
            for axis in 0..3 {
                assert!((root[axis] - row[axis]).abs() < 1e-9, "root axis {} at frame {}", axis, frame);
            }

            // Two 0.45 segments below a hip rotated about X
            for (foot, thigh_channel, side_x) in [(3, 7, 0.1), (7, 16, -0.1)] {
                let theta = row[thigh_channel].to_radians();
                let p = positions.get(frame, foot);
                assert!((p[0] - (row[0] + side_x)).abs() < 1e-6);
                assert!(
                    (p[1] - (row[1] - 0.9 * theta.cos())).abs() < 1e-6,
                    "foot {} height at frame {}: {}",
                    foot,
                    frame,
                    p[1]
                );
            }
        }
    }

    #[test]
    fn test_analyze_walk_cycle() {
        let clip = ClipInput::from_bvh_file(fixture_path("walk_cycle.bvh"), UpAxis::Y).unwrap();

        for params in [BeatParams::base(), BeatParams::extended()] {
            let result = analyze_clip(&clip, &params, &AlignmentConfig::default()).expect("Analysis should succeed");

            assert_eq!(result.beats.score.len(), 250);
            assert!(result.beats.score.iter().all(|&v| (0.0..=1.0).contains(&v)));
            assert!(!result.beats.events.is_empty(), "a walk has beats");
            assert!(result.beats.events.windows(2).all(|w| w[0] < w[1]));
            assert!(result.beats.events.iter().all(|&e| e < 250));
            assert!(result.metadata.flags.is_empty(), "flags: {:?}", result.metadata.flags);
            assert!(result.metadata.processing_time_ms >= 0.0);
            assert_eq!(result.metadata.extended, params.is_extended());
            assert!(result.alignment.is_none());
        }
    }

    #[test]
    fn test_audio_alignment_round_trip() {
        let clip = ClipInput::from_bvh_file(fixture_path("walk_cycle.bvh"), UpAxis::Y).unwrap();
        let params = BeatParams::extended();
        let motion_only = analyze_clip(&clip, &params, &AlignmentConfig::default()).unwrap();

        let shift = 0.25;
        let menv = motion_envelope(&clip.stream);
        let onsets = leading_audio(&menv, clip.stream.duration(), shift);

        // Audio beats at the motion events, on the audio clock
        let inner: Vec<usize> = motion_only
            .beats
            .events
            .iter()
            .copied()
            .filter(|&e| e >= 2 && e + 2 < 250)
            .collect();
        assert!(!inner.is_empty());
        let beat_times: Vec<f64> = inner.iter().map(|&e| e as f64 / 25.0 - shift).collect();

        for method in [OffsetMethod::GridSearch, OffsetMethod::CrossCorrelation] {
            let config = AlignmentConfig {
                max_offset_s: 0.5,
                method,
                ..AlignmentConfig::default()
            };
            let input = clip.clone().with_audio(AudioTrack {
                onsets: Some(onsets.clone()),
                beat_times: beat_times.clone(),
                offset_s: None,
            });
            let result = analyze_clip(&input, &params, &config).unwrap();
            let alignment = result.alignment.as_ref().expect("audio was attached");

            assert!(alignment.offset.is_measured());
            assert!(!alignment.offset_overridden);
            assert!(
                (alignment.offset.offset_s - shift).abs() < 0.015,
                "{:?}: offset {}",
                method,
                alignment.offset.offset_s
            );
            assert_eq!(alignment.beat_frames, inner, "{:?}", method);
            assert_eq!(alignment.labels.len(), 250);
            for &frame in &inner {
                assert_eq!(alignment.labels[frame], 1);
            }
            assert!(!result.has_flag(ClipFlag::AlignmentUnmeasured));
        }
    }

    #[test]
    fn test_result_json_output() {
        let clip = ClipInput::from_bvh_file(fixture_path("walk_cycle.bvh"), UpAxis::Y).unwrap();
        let result = analyze_clip(&clip, &BeatParams::base(), &AlignmentConfig::default()).unwrap();

        let json = result.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["n_frames"], 250);
        assert_eq!(value["metadata"]["name"], "walk_cycle");
        assert_eq!(
            value["beats"]["events"].as_array().map(|a| a.len()),
            Some(result.beats.events.len())
        );
    }

    #[test]
    fn test_single_spike_score() {
        let mut score = vec![0.0; 1000];
        score[100] = 1.0;
        for params in [BeatParams::base(), BeatParams::extended()] {
            assert_eq!(detect_events(&score, 30.0, &params, None).events, vec![100]);
        }
    }

    #[test]
    fn test_gait_foot_contacts_repeat_every_step() {
        let n = 60;
        let step = |t: usize| {
            let phase = t % 15;
            let lift = if phase < 8 {
                (std::f64::consts::PI * phase as f64 / 8.0).sin() * 0.15
            } else {
                0.0
            };
            let x = (t / 15) as f64 * 0.4 + if phase < 8 { 0.4 * phase as f64 / 8.0 } else { 0.4 };
            (x, lift)
        };

        let pelvis: Vec<[f64; 3]> = (0..n)
            .map(|t| [t as f64 * 0.027, 0.95 + 0.02 * (t as f64 * 0.42).cos(), 0.0])
            .collect();
        let left: Vec<[f64; 3]> = (0..n)
            .map(|t| {
                let (x, y) = step(t);
                [x, y, 0.1]
            })
            .collect();
        let right: Vec<[f64; 3]> = (0..n)
            .map(|t| {
                let (x, y) = step(t + 7);
                [x, y, -0.1]
            })
            .collect();
        let hand = |side: f64| -> Vec<[f64; 3]> {
            (0..n)
                .map(|t| [t as f64 * 0.027 + 0.1 * (t as f64 * 0.42).sin(), 1.1, side])
                .collect()
        };
        let positions =
            JointPositions::from_trajectories(&[pelvis, left, right, hand(0.3), hand(-0.3)]).unwrap();
        let stream = MotionStream::uniform(positions, 30.0).unwrap();

        let params = BeatParams {
            smooth_win: 1,
            ..BeatParams::base()
        };
        let rig = RigIndices::new(Some(0), Some(1), Some(2));
        let beats = extract_motion_beats(&stream, &[], &rig, &params).unwrap();

        let cue = &beats.cues.left_foot;
        assert_eq!(cue.len(), n);
        let peak_in = |lo: usize, hi: usize| (lo..hi).max_by(|&a, &b| cue[a].total_cmp(&cue[b])).unwrap();
        let peaks: Vec<usize> = (0..4).map(|k| peak_in(k * 15 + 2, k * 15 + 15)).collect();
        for pair in peaks.windows(2) {
            assert_eq!(pair[1] - pair[0], 15, "contacts should repeat every step: {:?}", peaks);
        }
        assert!(beats.cues.right_foot.iter().any(|&v| v > 0.0));
        assert!(!beats.events.is_empty());
    }
}
