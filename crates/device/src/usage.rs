//! Filesystem capacity queries.

use std::path::Path;

/// Free and total bytes for the filesystem containing `path`, in that
/// order. Free space is what an unprivileged writer can actually use
/// (`f_bavail`, not `f_bfree`).
#[cfg(unix)]
pub(crate) fn disk_usage(path: &Path) -> std::io::Result<(u64, u64)> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "path contains NUL byte")
    })?;

    let mut stat = MaybeUninit::<libc::statvfs>::uninit();
    let result = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if result != 0 {
        return Err(std::io::Error::last_os_error());
    }

    let stat = unsafe { stat.assume_init() };
    let block = stat.f_frsize as u64;
    let total = stat.f_blocks as u64 * block;
    let free = stat.f_bavail as u64 * block;
    Ok((free, total))
}

/// Windows capacities arrive with the mount table; this is only reached
/// when a CIM row was missing its numbers.
#[cfg(not(unix))]
pub(crate) fn disk_usage(_path: &Path) -> std::io::Result<(u64, u64)> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "filesystem statistics unavailable",
    ))
}
