//! FFI Module for ppbind
//!
//! Calling-convention adapter for native performance libraries that export
//! `calculate_score` and `calculate_score_bytes`.
//!
//! # Architecture
//!
//! ```text
//! Host code
//!       │
//!       ▼
//! PerformanceLibrary::calculate_score / calculate_score_bytes
//!       │
//!       ▼
//! Marshaling (CString path + mods, u32 length, OptionU32)
//!       │
//!       ▼
//! Bound entry points (libloading)
//!       │
//!       ▼
//! Native call → CalculatePerformanceResult { pp, stars }
//! ```
//!
//! # Example
//!
//! ```ignore
//! let library = PerformanceLibrary::load("/path/to/librosu_ffi.so")?;
//! let params = ScoreParams::new(GameMode::Osu).with_combo(1000).with_accuracy(99.0);
//! let result = library.calculate_score(Path::new("map.osu"), "HDDT", &params)?;
//! println!("{result}");
//! ```

mod error;
pub mod global;
mod loader;
pub mod marshal;
mod types;

pub use error::{check_status, BindingError, BindingResult};
pub use loader::{
    CalculateScoreBytesFn, CalculateScoreFn, CallPolicy, EntryPoints, PerformanceLibrary,
};
pub use types::{BeatmapInput, CalculatePerformanceResult, GameMode, OptionU32, ScoreParams};
