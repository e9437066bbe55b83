//! Platform-specific helpers.

/// Returns `true` when running on Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns the Git executable name for the current platform.
///
/// - `"git.exe"` on Windows
/// - `"git"` on Unix-like systems
///
/// The executable still has to be on `PATH`; see [`command_exists`].
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() {
        "git.exe"
    } else {
        "git"
    }
}

/// Checks whether `cmd` resolves to an executable on `PATH`.
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}
