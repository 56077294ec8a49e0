//! ppbind - Calling-convention adapter for native performance libraries
//!
//! Loads a shared library exporting `calculate_score` and
//! `calculate_score_bytes` (performance points and star rating for a beatmap)
//! and calls it with the exact argument layout it expects. No scoring happens
//! in this crate; beatmap parsing, difficulty and the pp formula all live in
//! the native library.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use ppbind::{GameMode, PerformanceLibrary, ScoreParams};
//!
//! let library = PerformanceLibrary::load("librosu_ffi.so")?;
//! let params = ScoreParams::new(GameMode::Osu)
//!     .with_combo(1000)
//!     .with_accuracy(98.5)
//!     .with_misses(2);
//!
//! let result = library.calculate_score(Path::new("map.osu"), "HDDT", &params)?;
//! println!("{} pp, {} stars", result.pp, result.stars);
//!
//! // Same map from memory; this entry point takes mods as a legacy bitmask.
//! let bytes = std::fs::read("map.osu")?;
//! let result = library.calculate_score_bytes(&bytes, 8 | 64, &params)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  Host code       │  ScoreParams + BeatmapInput
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  ffi::marshal    │  CString path/mods, u32 len, OptionU32
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  Native library  │  calculate_score / calculate_score_bytes
//! └──────────────────┘
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod ffi;
pub mod mods;

// Re-export commonly used types
pub use config::{ConfigError, PpbindConfig};
pub use ffi::global::init_lib;
pub use ffi::{
    check_status, BeatmapInput, BindingError, BindingResult, CalculatePerformanceResult,
    CallPolicy, EntryPoints, GameMode, OptionU32, PerformanceLibrary, ScoreParams,
};
pub use mods::{Mods, ModsError};
