//! Process-wide library slot
//!
//! For hosts that want `init_lib` once and call free functions afterwards.
//! The slot holds an `Arc<PerformanceLibrary>`; a later `init_lib` replaces it
//! (last load wins) while calls already in flight keep the handle they started
//! with. Callers are still expected to finish initialization before the first
//! calculation: which handle a call racing a reload ends up using is not
//! specified.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::error::{BindingError, BindingResult};
use super::loader::PerformanceLibrary;
use super::types::{CalculatePerformanceResult, ScoreParams};

static LIBRARY: RwLock<Option<Arc<PerformanceLibrary>>> = RwLock::new(None);

/// Load the library at `path` and make it the process-wide binding.
pub fn init_lib(path: impl AsRef<Path>) -> BindingResult<Arc<PerformanceLibrary>> {
    let library = PerformanceLibrary::load(path)?;
    Ok(install(library))
}

/// Make an already built handle the process-wide binding.
pub fn install(library: PerformanceLibrary) -> Arc<PerformanceLibrary> {
    let library = Arc::new(library);
    let previous = LIBRARY.write().replace(Arc::clone(&library));
    if let Some(previous) = previous {
        info!(
            previous = ?previous.path(),
            current = ?library.path(),
            "replaced process-wide performance library"
        );
    }
    library
}

/// Clear the process-wide binding, returning the handle it held.
pub fn reset() -> Option<Arc<PerformanceLibrary>> {
    LIBRARY.write().take()
}

pub fn is_initialized() -> bool {
    LIBRARY.read().is_some()
}

/// The current process-wide handle.
pub fn current() -> BindingResult<Arc<PerformanceLibrary>> {
    LIBRARY
        .read()
        .as_ref()
        .map(Arc::clone)
        .ok_or(BindingError::NotInitialized)
}

/// [`PerformanceLibrary::calculate_score`] on the process-wide handle.
pub fn calculate_score(
    beatmap_path: &Path,
    mods: &str,
    params: &ScoreParams,
) -> BindingResult<CalculatePerformanceResult> {
    current()?.calculate_score(beatmap_path, mods, params)
}

/// [`PerformanceLibrary::calculate_score_bytes`] on the process-wide handle.
pub fn calculate_score_bytes(
    beatmap: &[u8],
    mods: u32,
    params: &ScoreParams,
) -> BindingResult<CalculatePerformanceResult> {
    current()?.calculate_score_bytes(beatmap, mods, params)
}
