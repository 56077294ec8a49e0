//! Host value → native argument conversion
//!
//! Everything here runs before the native call; a failure means no call is made.

use std::ffi::CString;
use std::path::Path;

use super::error::{BindingError, BindingResult};

/// Encode a beatmap path as a NUL-terminated byte string.
///
/// Unix paths are passed as their raw OS bytes. Elsewhere the native side
/// expects UTF-8, so non-UTF-8 paths are rejected.
pub fn path_to_cstring(path: &Path) -> BindingResult<CString> {
    if path.as_os_str().is_empty() {
        return Err(invalid_path(path, "path is empty"));
    }

    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };

    #[cfg(not(unix))]
    let bytes = path
        .to_str()
        .ok_or_else(|| invalid_path(path, "path is not valid UTF-8"))?
        .as_bytes()
        .to_vec();

    CString::new(bytes).map_err(|_| invalid_path(path, "path contains an interior NUL byte"))
}

/// Encode the textual mods argument of `calculate_score`.
pub fn mods_to_cstring(mods: &str) -> BindingResult<CString> {
    CString::new(mods).map_err(|_| BindingError::InvalidMods {
        mods: mods.to_string(),
    })
}

/// Length argument for `calculate_score_bytes`, never truncated.
pub fn buffer_len(data: &[u8]) -> BindingResult<u32> {
    u32::try_from(data.len()).map_err(|_| BindingError::BufferTooLarge { len: data.len() })
}

fn invalid_path(path: &Path, reason: &'static str) -> BindingError {
    BindingError::InvalidPath {
        path: path.to_path_buf(),
        reason,
    }
}
