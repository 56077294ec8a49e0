//! Shared object exporting the performance library entry points.
//!
//! The result depends only on the beatmap bytes and the scoring arguments, so
//! the path and byte-buffer entry points agree on the same file. Text mods are
//! read as a decimal bitmask; anything else counts as no mods.

#![allow(clippy::missing_safety_doc, clippy::too_many_arguments)]

use std::ffi::{c_char, CStr};

#[repr(C)]
pub struct CalculatePerformanceResult {
    pub pp: f64,
    pub stars: f64,
}

#[repr(C)]
pub struct OptionU32 {
    pub value: u32,
    pub is_some: u8,
}

fn score(
    data: &[u8],
    mode: u32,
    mods: u32,
    max_combo: u32,
    accuracy: f64,
    miss_count: u32,
    passed_objects: OptionU32,
    lazer: bool,
) -> CalculatePerformanceResult {
    let checksum = data
        .iter()
        .fold(0u32, |acc, &b| acc.wrapping_mul(31).wrapping_add(b as u32));
    let mut stars = (checksum % 700) as f64 / 100.0 + 1.0 + mode as f64 * 0.5;
    stars += mods.count_ones() as f64 * 0.25;
    if passed_objects.is_some == 1 {
        let n = passed_objects.value as f64;
        stars *= n / (n + 1.0);
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

#[no_mangle]
pub unsafe extern "C" fn calculate_score(
    beatmap_path: *const c_char,
    mode: u32,
    mods: *const c_char,
    max_combo: u32,
    accuracy: f64,
    miss_count: u32,
    passed_objects: OptionU32,
    lazer: bool,
) -> CalculatePerformanceResult {
    let Ok(path) = CStr::from_ptr(beatmap_path).to_str() else {
        return failed();
    };
    let Ok(data) = std::fs::read(path) else {
        return failed();
    };
    let mods = CStr::from_ptr(mods)
        .to_str()
        .ok()
        .and_then(|text| text.trim().parse::<u32>().ok())
        .unwrap_or(0);

    score(
        &data,
        mode,
        mods,
        max_combo,
        accuracy,
        miss_count,
        passed_objects,
        lazer,
    )
}

#[cfg(not(feature = "path-only"))]
#[no_mangle]
pub unsafe extern "C" fn calculate_score_bytes(
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
    let data = if len == 0 {
        &[][..]
    } else {
        std::slice::from_raw_parts(beatmap_bytes, len as usize)
    };

    score(
        data,
        mode,
        mods,
        max_combo,
        accuracy,
        miss_count,
        passed_objects,
        lazer,
    )
}
