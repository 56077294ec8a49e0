//! Dynamic Library Loader
//!
//! Safe wrapper around libloading that binds the two calculation entry points
//! of a native performance library.

use std::ffi::c_char;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::error::{BindingError, BindingResult};
use super::marshal;
use super::types::{BeatmapInput, CalculatePerformanceResult, OptionU32, ScoreParams};

/// Native signature of `calculate_score`.
pub type CalculateScoreFn = unsafe extern "C" fn(
    beatmap_path: *const c_char,
    mode: u32,
    mods: *const c_char,
    max_combo: u32,
    accuracy: f64,
    miss_count: u32,
    passed_objects: OptionU32,
    lazer: bool,
) -> CalculatePerformanceResult;

/// Native signature of `calculate_score_bytes`.
pub type CalculateScoreBytesFn = unsafe extern "C" fn(
    beatmap_bytes: *const u8,
    len: u32,
    mode: u32,
    mods: u32,
    max_combo: u32,
    accuracy: f64,
    miss_count: u32,
    passed_objects: OptionU32,
    lazer: bool,
) -> CalculatePerformanceResult;

/// Symbol names, NUL-terminated for `Library::get`.
const CALCULATE_SCORE: &[u8] = b"calculate_score\0";
const CALCULATE_SCORE_BYTES: &[u8] = b"calculate_score_bytes\0";

/// The bound function table.
#[derive(Debug, Clone, Copy)]
pub struct EntryPoints {
    pub calculate_score: CalculateScoreFn,
    pub calculate_score_bytes: CalculateScoreBytesFn,
}

impl EntryPoints {
    /// Resolve both entry points from a loaded library.
    ///
    /// # Safety
    ///
    /// The library's exports must have exactly the signatures above. The
    /// returned pointers are only valid while `library` stays loaded.
    unsafe fn resolve(library: &Library, path: &Path) -> BindingResult<Self> {
        let calculate_score: Symbol<CalculateScoreFn> = library
            .get(CALCULATE_SCORE)
            .map_err(|source| symbol_error("calculate_score", path, source))?;
        let calculate_score_bytes: Symbol<CalculateScoreBytesFn> = library
            .get(CALCULATE_SCORE_BYTES)
            .map_err(|source| symbol_error("calculate_score_bytes", path, source))?;

        Ok(Self {
            calculate_score: *calculate_score,
            calculate_score_bytes: *calculate_score_bytes,
        })
    }
}

fn symbol_error(symbol: &'static str, path: &Path, source: libloading::Error) -> BindingError {
    BindingError::SymbolNotFound {
        symbol,
        path: path.to_path_buf(),
        source,
    }
}

/// How calls into the native library are scheduled.
///
/// Whether the native library is reentrant is outside this crate's control.
/// `Concurrent` assumes it is; `Serialized` runs one native call at a time
/// per handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallPolicy {
    #[default]
    Concurrent,
    Serialized,
}

/// A loaded native performance library.
///
/// Load once, call many times. The handle is `Send + Sync`; share it behind an
/// `Arc` across threads. Calls block the calling thread until the native side
/// returns and cannot be cancelled.
#[derive(Debug)]
pub struct PerformanceLibrary {
    path: Option<PathBuf>,
    entry_points: EntryPoints,
    policy: CallPolicy,
    call_lock: Mutex<()>,
    // Must outlive `entry_points`; fields drop in declaration order.
    _library: Option<Library>,
}

impl PerformanceLibrary {
    /// Load a shared library and bind both calculation entry points.
    ///
    /// Fails immediately if the file cannot be loaded or either symbol is
    /// missing.
    pub fn load(path: impl AsRef<Path>) -> BindingResult<Self> {
        let path = path.as_ref().to_path_buf();

        // Safety: loading runs the library's initializers. We trust the path
        // the caller handed us to be a performance library built for this ABI.
        let library = unsafe { Library::new(&path) }.map_err(|source| {
            BindingError::LibraryLoad {
                path: path.clone(),
                source,
            }
        })?;

        // Safety: the pointers are stored next to `library`, which is dropped
        // after them.
        let entry_points = unsafe { EntryPoints::resolve(&library, &path)? };

        info!(path = %path.display(), "loaded native performance library");

        Ok(Self {
            path: Some(path),
            entry_points,
            policy: CallPolicy::default(),
            call_lock: Mutex::new(()),
            _library: Some(library),
        })
    }

    /// Wrap entry points that are already in the process, e.g. a statically
    /// linked implementation.
    ///
    /// # Safety
    ///
    /// Both functions must follow the native calculation contract and stay
    /// valid for the lifetime of the handle.
    pub unsafe fn from_entry_points(entry_points: EntryPoints) -> Self {
        Self {
            path: None,
            entry_points,
            policy: CallPolicy::default(),
            call_lock: Mutex::new(()),
            _library: None,
        }
    }

    /// Set the call scheduling policy.
    pub fn with_policy(mut self, policy: CallPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Path the library was loaded from, `None` for in-process entry points.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn policy(&self) -> CallPolicy {
        self.policy
    }

    pub fn entry_points(&self) -> EntryPoints {
        self.entry_points
    }

    /// Calculate from a beatmap file on disk, with mods given as text.
    pub fn calculate_score(
        &self,
        beatmap_path: &Path,
        mods: &str,
        params: &ScoreParams,
    ) -> BindingResult<CalculatePerformanceResult> {
        let c_path = marshal::path_to_cstring(beatmap_path)?;
        let c_mods = marshal::mods_to_cstring(mods)?;

        debug!(
            path = %beatmap_path.display(),
            mode = %params.mode,
            mods,
            "calculate_score"
        );

        let _guard = self.guard();
        // Safety: both C strings outlive the call and the function pointer is
        // bound to a live library.
        let result = unsafe {
            (self.entry_points.calculate_score)(
                c_path.as_ptr(),
                params.mode.as_u32(),
                c_mods.as_ptr(),
                params.max_combo,
                params.accuracy,
                params.miss_count,
                OptionU32::from(params.passed_objects),
                params.lazer,
            )
        };

        Ok(result)
    }

    /// Calculate from an in-memory beatmap file, with mods as a legacy bitmask.
    pub fn calculate_score_bytes(
        &self,
        beatmap: &[u8],
        mods: u32,
        params: &ScoreParams,
    ) -> BindingResult<CalculatePerformanceResult> {
        let len = marshal::buffer_len(beatmap)?;

        debug!(len, mode = %params.mode, mods, "calculate_score_bytes");

        let _guard = self.guard();
        // Safety: `beatmap` is borrowed for the whole call and `len` is its
        // exact length.
        let result = unsafe {
            (self.entry_points.calculate_score_bytes)(
                beatmap.as_ptr(),
                len,
                params.mode.as_u32(),
                mods,
                params.max_combo,
                params.accuracy,
                params.miss_count,
                OptionU32::from(params.passed_objects),
                params.lazer,
            )
        };

        Ok(result)
    }

    /// Dispatch to whichever entry point matches the input.
    pub fn calculate(
        &self,
        input: &BeatmapInput<'_>,
        params: &ScoreParams,
    ) -> BindingResult<CalculatePerformanceResult> {
        match *input {
            BeatmapInput::Path { path, mods } => self.calculate_score(path, mods, params),
            BeatmapInput::Bytes { data, mods } => self.calculate_score_bytes(data, mods, params),
        }
    }

    fn guard(&self) -> Option<MutexGuard<'_, ()>> {
        match self.policy {
            CallPolicy::Concurrent => None,
            CallPolicy::Serialized => Some(self.call_lock.lock()),
        }
    }
}
