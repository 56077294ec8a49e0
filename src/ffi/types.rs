//! FFI Type System
//!
//! `#[repr(C)]` layouts shared with the native calculation library, plus the
//! typed arguments that get lowered into them.

use std::fmt;
use std::mem::{align_of, offset_of, size_of};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Result of a performance calculation, returned by value from both entry points.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CalculatePerformanceResult {
    /// Performance points
    pub pp: f64,
    /// Star rating
    pub stars: f64,
}

impl fmt::Display for CalculatePerformanceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}pp ({:.2}*)", self.pp, self.stars)
    }
}

/// Nullable `u32` as the native side encodes it.
///
/// Only `is_some == 1` means present. Any other tag byte is absent, and the
/// value slot is not trusted in that case since foreign code may leave garbage
/// there.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionU32 {
    value: u32,
    is_some: u8,
}

impl OptionU32 {
    const SOME: u8 = 1;

    /// A present value.
    pub const fn some(value: u32) -> Self {
        Self {
            value,
            is_some: Self::SOME,
        }
    }

    /// The absent encoding, with a zeroed value slot.
    pub const fn none() -> Self {
        Self {
            value: 0,
            is_some: 0,
        }
    }

    /// Build from raw fields, e.g. as received from foreign code.
    pub const fn from_raw(value: u32, is_some: u8) -> Self {
        Self { value, is_some }
    }

    /// Raw `(value, tag)` fields, without interpretation.
    pub const fn into_raw(self) -> (u32, u8) {
        (self.value, self.is_some)
    }

    pub const fn is_some(&self) -> bool {
        self.is_some == Self::SOME
    }

    pub const fn is_none(&self) -> bool {
        !self.is_some()
    }

    /// Decode, checking the tag before looking at the value.
    pub const fn into_option(self) -> Option<u32> {
        if self.is_some() {
            Some(self.value)
        } else {
            None
        }
    }
}

impl From<Option<u32>> for OptionU32 {
    fn from(value: Option<u32>) -> Self {
        match value {
            Some(v) => Self::some(v),
            None => Self::none(),
        }
    }
}

impl From<OptionU32> for Option<u32> {
    fn from(value: OptionU32) -> Self {
        value.into_option()
    }
}

/// Decoded equality: two absent encodings compare equal whatever their value slots hold.
impl PartialEq for OptionU32 {
    fn eq(&self, other: &Self) -> bool {
        self.into_option() == other.into_option()
    }
}

impl Eq for OptionU32 {}

// Layout has to agree bit for bit with the native side.
const _: () = {
    assert!(size_of::<CalculatePerformanceResult>() == 16);
    assert!(align_of::<CalculatePerformanceResult>() == 8);
    assert!(offset_of!(CalculatePerformanceResult, pp) == 0);
    assert!(offset_of!(CalculatePerformanceResult, stars) == 8);

    assert!(size_of::<OptionU32>() == 8);
    assert!(align_of::<OptionU32>() == 4);
    assert!(offset_of!(OptionU32, value) == 0);
    assert!(offset_of!(OptionU32, is_some) == 4);
};

/// Ruleset selector, passed to the native library as a `u32`.
///
/// The native side aborts the process on any other value, so raw integers are
/// only accepted through [`TryFrom<u32>`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Osu = 0,
    Taiko = 1,
    #[serde(alias = "fruits")]
    Catch = 2,
    Mania = 3,
}

impl GameMode {
    /// Wire value.
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for GameMode {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GameMode::Osu),
            1 => Ok(GameMode::Taiko),
            2 => Ok(GameMode::Catch),
            3 => Ok(GameMode::Mania),
            other => Err(other),
        }
    }
}

/// Case-insensitive: `osu` (`std`, `standard`), `taiko`, `catch` (`fruits`,
/// `ctb`), `mania`, or `0`-`3`.
impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u32>() {
            return GameMode::try_from(n).map_err(|n| format!("unknown game mode: {}", n));
        }
        match s.to_lowercase().as_str() {
            "osu" | "std" | "standard" => Ok(GameMode::Osu),
            "taiko" => Ok(GameMode::Taiko),
            "catch" | "fruits" | "ctb" => Ok(GameMode::Catch),
            "mania" => Ok(GameMode::Mania),
            _ => Err(format!("unknown game mode: {}", s)),
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Osu => write!(f, "osu"),
            GameMode::Taiko => write!(f, "taiko"),
            GameMode::Catch => write!(f, "catch"),
            GameMode::Mania => write!(f, "mania"),
        }
    }
}

/// Scoring arguments shared by both entry points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreParams {
    pub mode: GameMode,
    pub max_combo: u32,
    /// Percentage, 0.0 to 100.0. Not validated here.
    pub accuracy: f64,
    pub miss_count: u32,
    /// Stop scoring after this many hit objects; `None` scores the whole map.
    pub passed_objects: Option<u32>,
    /// Lazer rather than stable scoring.
    pub lazer: bool,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            mode: GameMode::Osu,
            max_combo: 0,
            accuracy: 100.0,
            miss_count: 0,
            passed_objects: None,
            lazer: false,
        }
    }
}

impl ScoreParams {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_combo(mut self, max_combo: u32) -> Self {
        self.max_combo = max_combo;
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_misses(mut self, miss_count: u32) -> Self {
        self.miss_count = miss_count;
        self
    }

    pub fn with_passed_objects(mut self, passed_objects: Option<u32>) -> Self {
        self.passed_objects = passed_objects;
        self
    }

    pub fn with_lazer(mut self, lazer: bool) -> Self {
        self.lazer = lazer;
        self
    }
}

/// Where the beatmap comes from, paired with the mod encoding its entry point takes.
///
/// `calculate_score` reads mods as text, `calculate_score_bytes` as a legacy
/// bitmask; the variants keep the two apart.
#[derive(Debug, Clone, Copy)]
pub enum BeatmapInput<'a> {
    /// A `.osu` file on disk.
    Path {
        path: &'a std::path::Path,
        mods: &'a str,
    },
    /// A `.osu` file already in memory.
    Bytes { data: &'a [u8], mods: u32 },
}
