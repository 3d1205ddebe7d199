use std::fs;
use std::io;
use std::path::Path;

/// Free bytes available to unprivileged users on the filesystem holding `path`.
///
/// Walks up to the nearest existing ancestor so a cache root that has not been
/// created yet still reports its future filesystem. Returns `None` when the
/// platform cannot answer.
#[must_use]
pub fn free_disk_bytes(path: &Path) -> Option<u64> {
    let existing = path.ancestors().find(|p| !p.as_os_str().is_empty() && p.exists())?;
    statvfs_free(existing)
}

#[cfg(unix)]
#[allow(clippy::useless_conversion)]
fn statvfs_free(path: &Path) -> Option<u64> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes()).ok()?;
    let mut stat = std::mem::MaybeUninit::<libc::statvfs>::uninit();
    // SAFETY: c_path is NUL-terminated and stat points at storage for exactly one statvfs.
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }
    // SAFETY: statvfs returned 0, so the struct is fully initialized.
    let stat = unsafe { stat.assume_init() };
    Some(u64::from(stat.f_bavail).saturating_mul(u64::from(stat.f_frsize)))
}

#[cfg(not(unix))]
fn statvfs_free(_path: &Path) -> Option<u64> {
    None
}

/// Create `dir` and its parents if missing.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)
}
