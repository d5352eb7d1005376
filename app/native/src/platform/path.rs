//! Shell-like path expansion for user-supplied paths.

use std::path::PathBuf;

/// Expands a leading `~` to the home directory.
///
/// Surrounding whitespace is trimmed; an empty input yields an empty path.
/// Absolute and relative paths are otherwise returned unchanged.
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return PathBuf::new();
    }

    PathBuf::from(shellexpand::tilde(path).as_ref())
}
