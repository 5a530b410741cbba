#![expect(
    clippy::unwrap_used,
    reason = "Test utilities use .unwrap() for brevity"
)]

//! Shared test utilities for `microspec-gui` unit tests.
//!
//! Only compiled during testing (`#[cfg(test)]`).

use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes tests that point the config directory somewhere else.
static APPDATA_LOCK: Mutex<()> = Mutex::new(());

/// Create a temporary test directory, removed when dropped.
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// RAII guard that points `APPDATA` (and with it the config directory) at a
/// temporary directory and restores the original value when dropped.
///
/// # Safety Considerations
///
/// `std::env::set_var` and `std::env::remove_var` are unsafe because another
/// thread may read the environment concurrently. The guard holds
/// `APPDATA_LOCK` for its whole lifetime, so only one test at a time touches
/// the variable, and it restores the previous value even when the test panics.
pub struct AppdataGuard {
    original: Option<String>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[expect(
    unsafe_code,
    reason = "Test-only code that modifies environment variables while holding APPDATA_LOCK"
)]
impl AppdataGuard {
    /// Set `APPDATA` to `temp_dir` until the guard is dropped.
    pub fn new(temp_dir: &TempDir) -> Self {
        // A test that panicked while holding the lock still restored APPDATA
        let lock = APPDATA_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let original = std::env::var("APPDATA").ok();
        // SAFETY: APPDATA_LOCK is held, no other test reads or writes APPDATA
        unsafe {
            std::env::set_var("APPDATA", temp_dir.path());
        }
        Self {
            original,
            _lock: lock,
        }
    }
}

#[expect(
    unsafe_code,
    reason = "Test-only code that restores environment variables while holding APPDATA_LOCK"
)]
impl Drop for AppdataGuard {
    fn drop(&mut self) {
        // SAFETY: the lock is released only after this runs
        if let Some(ref original) = self.original {
            unsafe {
                std::env::set_var("APPDATA", original);
            }
        } else {
            unsafe {
                std::env::remove_var("APPDATA");
            }
        }
    }
}

/// A frame of `len` pixels reading `base` counts, with `peak` counts at the
/// 1-based `peak_pixel`.
pub fn frame_with_peak(len: usize, base: u16, peak_pixel: usize, peak: u16) -> Vec<u16> {
    let mut pixels = vec![base; len];
    *pixels.get_mut(peak_pixel - 1).unwrap() = peak;
    pixels
}
