//! Example: Analyze a single BVH file
//!
//! Usage:
//!   cargo run --release --example analyze_bvh -- [--extended] [--up AXIS] [--json]
//!       [--beats FILE] [--offset SECONDS] <file.bvh>
//!
//! `--beats` reads a JSON array of audio beat times (seconds) and maps them
//! onto motion frames using the supplied `--offset` (default 0).

use stratum_motion::analysis::{analyze_clip, AudioTrack, ClipInput};
use stratum_motion::rig::UpAxis;
use stratum_motion::{AlignmentConfig, BeatParams};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut extended = false;
    let mut json = false;
    let mut up = UpAxis::Auto;
    let mut beats_path: Option<String> = None;
    let mut offset: Option<f64> = None;
    let mut path: Option<String> = None;

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--extended" => extended = true,
            "--json" => json = true,
            "--up" => {
                up = args.first().ok_or("--up requires a value")?.parse()?;
                args.remove(0);
            }
            "--beats" => {
                beats_path = Some(args.first().ok_or("--beats requires a file")?.clone());
                args.remove(0);
            }
            "--offset" => {
                offset = Some(args.first().ok_or("--offset requires a value")?.parse::<f64>()?);
                args.remove(0);
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_bvh [--extended] [--up x|y|z|auto] [--json] [--beats FILE] [--offset S] <file.bvh>\n\
                     \n\
                     --extended   Five-cue extended algorithm (default: base)\n\
                     --up AXIS    Up axis of the capture (default: auto)\n\
                     --json       Emit the full result as JSON\n\
                     --beats FILE JSON array of audio beat times in seconds\n\
                     --offset S   Audio-to-motion offset in seconds (default: 0)\n"
                );
                return Ok(());
            }
            _ => path = Some(a),
        }
    }

    let path = match path {
        Some(p) => p,
        None => {
            eprintln!("ERROR: Provide a BVH file path. Use --help for usage.");
            std::process::exit(2);
        }
    };

    let mut clip = ClipInput::from_bvh_file(&path, up)?;
    if let Some(beats_path) = beats_path {
        let beat_times: Vec<f64> = serde_json::from_str(&std::fs::read_to_string(beats_path)?)?;
        clip = clip.with_audio(AudioTrack {
            onsets: None,
            beat_times,
            offset_s: Some(offset.unwrap_or(0.0)),
        });
    }

    let params = if extended {
        BeatParams::extended()
    } else {
        BeatParams::base()
    };
    let result = analyze_clip(&clip, &params, &AlignmentConfig::default())?;

    if json {
        println!("{}", result.to_json()?);
        return Ok(());
    }

    println!("Analysis Results: {}", path);
    println!(
        "  Frames: {} at {:.2} fps ({:.2} s), {} joints",
        result.metadata.n_frames, result.metadata.fps, result.metadata.duration_seconds, result.metadata.n_joints
    );
    println!(
        "  Rig: pelvis={:?} left foot={:?} right foot={:?}",
        result.rig.pelvis, result.rig.left_foot, result.rig.right_foot
    );
    println!("  Beats: {}", result.beats.events.len());
    if let Some(bpm) = result.motion_tempo_bpm() {
        println!("  Motion tempo: {:.1} BPM", bpm);
    }
    let times: Vec<String> = result.event_times().iter().map(|t| format!("{:.3}", t)).collect();
    println!("  Beat times: [{}]", times.join(", "));
    if let Some(alignment) = &result.alignment {
        println!(
            "  Audio beats on motion frames: {:?} (offset {:.3} s)",
            alignment.beat_frames, alignment.offset.offset_s
        );
    }
    if !result.metadata.flags.is_empty() {
        println!("  Flags: {:?}", result.metadata.flags);
    }
    println!("  Processing time: {:.2} ms", result.metadata.processing_time_ms);

    Ok(())
}
