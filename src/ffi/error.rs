//! FFI error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised at the binding boundary.
///
/// Native-side failures (bad beatmap, invalid arguments the native library
/// rejects) never show up here: the value-returning entry points abort the
/// process instead.
#[derive(Debug, Error)]
pub enum BindingError {
    /// The shared library could not be opened
    #[error("failed to load library '{}': {source}", path.display())]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// The library is missing one of the calculation entry points
    #[error("symbol '{symbol}' not found in '{}': {source}", path.display())]
    SymbolNotFound {
        symbol: &'static str,
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// A process-wide call was made before `init_lib`
    #[error("native library not initialized, call init_lib first")]
    NotInitialized,

    /// The beatmap path cannot be passed as a C string
    #[error("invalid beatmap path '{}': {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: &'static str },

    /// The mods text cannot be passed as a C string
    #[error("invalid mods string {mods:?}: contains an interior NUL byte")]
    InvalidMods { mods: String },

    /// The byte buffer's length does not fit the `u32` length argument
    #[error("beatmap buffer of {len} bytes exceeds the u32 length limit")]
    BufferTooLarge { len: usize },

    /// A status-returning native function reported failure
    #[error("function returned error: {returned} (expected {expected})")]
    Status { returned: i64, expected: i64 },
}

/// Result type for binding operations.
pub type BindingResult<T> = Result<T, BindingError>;

/// Compare a native status code against the success code.
///
/// For auxiliary entry points that report a status instead of returning a
/// value. The error carries the literal code that came back.
pub fn check_status<C>(returned: C, success: C) -> BindingResult<()>
where
    C: Into<i64> + PartialEq + Copy,
{
    if returned == success {
        Ok(())
    } else {
        Err(BindingError::Status {
            returned: returned.into(),
            expected: success.into(),
        })
    }
}
