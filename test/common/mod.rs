//! In-process stand-in for a native performance library.
//!
//! Deterministic: the result depends only on the beatmap bytes and the
//! scoring arguments, so the path and byte-buffer entry points agree whenever
//! they see the same file.

#![allow(dead_code, clippy::too_many_arguments)]

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::ffi::{c_char, CStr};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use ppbind::{
    CalculatePerformanceResult, EntryPoints, GameMode, Mods, OptionU32, PerformanceLibrary,
};

/// Total native calls made through [`entry_points`].
pub static CALLS: AtomicUsize = AtomicUsize::new(0);

pub fn calls() -> usize {
    CALLS.load(Ordering::SeqCst)
}

pub fn entry_points() -> EntryPoints {
    EntryPoints {
        calculate_score: stub_calculate_score,
        calculate_score_bytes: stub_calculate_score_bytes,
    }
}

pub fn library() -> PerformanceLibrary {
    // Safety: both stubs follow the native contract.
    unsafe { PerformanceLibrary::from_entry_points(entry_points()) }
}

pub const SAMPLE_BEATMAP: &str = "osu file format v14

[General]
AudioFilename: audio.mp3
Mode: 0

[Difficulty]
HPDrainRate:5
CircleSize:4
OverallDifficulty:8
ApproachRate:9

[HitObjects]
256,192,1000,1,0,0:0:0:0:
128,96,1500,1,0,0:0:0:0:
384,288,2000,1,0,0:0:0:0:
";

fn score(
    data: &[u8],
    mode: u32,
    mods: u32,
    max_combo: u32,
    accuracy: f64,
    miss_count: u32,
    passed_objects: Option<u32>,
    lazer: bool,
) -> CalculatePerformanceResult {
    let checksum = data
        .iter()
        .fold(0u32, |acc, &b| acc.wrapping_mul(31).wrapping_add(b as u32));
    let mut stars = (checksum % 700) as f64 / 100.0 + 1.0 + mode as f64 * 0.5;
    stars += mods.count_ones() as f64 * 0.25;
    if let Some(n) = passed_objects {
        stars *= n as f64 / (n as f64 + 1.0);
    }

    let mut pp = stars * stars * 10.0 * (accuracy / 100.0) + max_combo as f64 * 0.01;
    pp -= miss_count as f64 * 2.0;
    if lazer {
        pp += 1.0;
    }

    CalculatePerformanceResult { pp, stars }
}

fn failed() -> CalculatePerformanceResult {
    CalculatePerformanceResult {
        pp: f64::NAN,
        stars: f64::NAN,
    }
}

unsafe extern "C" fn stub_calculate_score(
    beatmap_path: *const c_char,
    mode: u32,
    mods: *const c_char,
    max_combo: u32,
    accuracy: f64,
    miss_count: u32,
    passed_objects: OptionU32,
    lazer: bool,
) -> CalculatePerformanceResult {
    CALLS.fetch_add(1, Ordering::SeqCst);

    let Ok(path) = CStr::from_ptr(beatmap_path).to_str() else {
        return failed();
    };
    let Ok(data) = std::fs::read(path) else {
        return failed();
    };
    let Ok(game_mode) = GameMode::try_from(mode) else {
        return failed();
    };
    let mods = CStr::from_ptr(mods)
        .to_str()
        .ok()
        .and_then(|text| Mods::parse(text, game_mode).ok())
        .and_then(|mods| mods.legacy_bits())
        .unwrap_or(0);

    score(
        &data,
        mode,
        mods,
        max_combo,
        accuracy,
        miss_count,
        passed_objects.into_option(),
        lazer,
    )
}

unsafe extern "C" fn stub_calculate_score_bytes(
    beatmap_bytes: *const u8,
    len: u32,
    mode: u32,
    mods: u32,
    max_combo: u32,
    accuracy: f64,
    miss_count: u32,
    passed_objects: OptionU32,
    lazer: bool,
) -> CalculatePerformanceResult {
    CALLS.fetch_add(1, Ordering::SeqCst);

    let data = std::slice::from_raw_parts(beatmap_bytes, len as usize);
    score(
        data,
        mode,
        mods,
        max_combo,
        accuracy,
        miss_count,
        passed_objects.into_option(),
        lazer,
    )
}

// ============================================================================
// Real shared objects
// ============================================================================

/// `native_stub` built as a shared object exporting both entry points.
pub fn native_stub() -> &'static Path {
    static STUB: OnceLock<PathBuf> = OnceLock::new();
    STUB.get_or_init(|| build_native_stub("full", None))
}

/// `native_stub` built without `calculate_score_bytes`.
pub fn native_stub_path_only() -> &'static Path {
    static STUB: OnceLock<PathBuf> = OnceLock::new();
    STUB.get_or_init(|| build_native_stub("path-only", Some("path-only")))
}

fn build_native_stub(name: &str, feature: Option<&str>) -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("test/native_stub/Cargo.toml");
    let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join(format!("native_stub-{}", name));

    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["build", "--quiet", "--offline", "--manifest-path"])
        .arg(&manifest)
        .arg("--target-dir")
        .arg(&target_dir);
    if let Some(feature) = feature {
        cmd.args(["--features", feature]);
    }

    let status = cmd.status().expect("Failed to run cargo");
    assert!(status.success(), "Failed to build native_stub ({})", name);

    target_dir
        .join("debug")
        .join(format!("{}native_stub{}", DLL_PREFIX, DLL_SUFFIX))
}
