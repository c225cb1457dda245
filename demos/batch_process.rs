//! Example: Analyze multiple BVH files in parallel
//!
//! Usage:
//!   cargo run --release --example batch_process -- [--jobs N] [--json] [--extended] [--up AXIS] <file1.bvh> ...
//!
//! Notes:
//! - Parallelism is across files. Each clip is still analysed single-threaded.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.

use stratum_motion::analysis::batch::{analyze_bvh_files, default_jobs};
use stratum_motion::rig::UpAxis;
use stratum_motion::{AlignmentConfig, BeatParams};
use std::env;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut json = false;
    let mut extended = false;
    let mut up = UpAxis::Auto;
    let mut jobs: Option<usize> = None;
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--extended" => extended = true,
            "--up" => {
                up = args.first().ok_or("--up requires a value")?.parse()?;
                args.remove(0);
            }
            "--jobs" => {
                let v = args.first().ok_or("--jobs requires a value")?.parse::<usize>()?;
                args.remove(0);
                jobs = Some(v.max(1));
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: batch_process [--jobs N] [--json] [--extended] [--up AXIS] <file1.bvh> ...\n\
                     \n\
                     --jobs N     Parallel workers (default: CPU-1)\n\
                     --json       Emit one JSON object per line (JSONL)\n\
                     --extended   Five-cue extended algorithm\n\
                     --up AXIS    Up axis of the captures (default: auto)\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.is_empty() {
        eprintln!("ERROR: Provide at least one BVH file path. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} files, jobs={}", paths.len(), jobs);

    let params = if extended {
        BeatParams::extended()
    } else {
        BeatParams::base()
    };
    let config = AlignmentConfig::default();

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    let results = pool.install(|| analyze_bvh_files(&paths, up, &params, &config));

    let mut ok = 0;
    for (idx, (path, result)) in paths.iter().zip(results.iter()).enumerate() {
        match result {
            Ok(res) => {
                ok += 1;
                if json {
                    let line = serde_json::json!({
                        "file": path,
                        "n_frames": res.metadata.n_frames,
                        "fps": res.metadata.fps,
                        "events": res.beats.events,
                        "event_times": res.event_times(),
                        "tempo_bpm": res.motion_tempo_bpm(),
                        "flags": res.metadata.flags,
                        "processing_time_ms": res.metadata.processing_time_ms,
                    });
                    println!("{}", line);
                } else {
                    println!(
                        "[{}/{}] {}: beats={} tempo={} time={:.2}ms",
                        idx + 1,
                        paths.len(),
                        path,
                        res.beats.events.len(),
                        res.motion_tempo_bpm()
                            .map(|b| format!("{:.1}BPM", b))
                            .unwrap_or_else(|| "-".to_string()),
                        res.metadata.processing_time_ms
                    );
                }
            }
            Err(e) => {
                if json {
                    println!("{}", serde_json::json!({ "file": path, "error": e.to_string() }));
                } else {
                    println!("[{}/{}] {}: ERROR: {}", idx + 1, paths.len(), path, e);
                }
            }
        }
    }

    eprintln!(
        "Done: ok={}/{} wall={:.0}ms",
        ok,
        paths.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}
