//! File permissions
//!
//! Permission checks with access(2) semantics: each answer reflects what a
//! real open, readdir or unlink by this process would be allowed to do,
//! rather than a reinterpretation of the mode bits.

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

fn access(path: &Path, mode: libc::c_int) -> io::Result<()> {
    let cpath = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::from_raw_os_error(libc::EINVAL))?;
    // SAFETY: access reads the path string and touches nothing else.
    let rc = unsafe { libc::access(cpath.as_ptr(), mode) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Whether anything exists at the path.
pub fn exists(path: &Path) -> bool {
    access(path, libc::F_OK).is_ok()
}

/// Read access, enough to open a file for download.
pub fn is_readable(path: &Path) -> bool {
    access(path, libc::R_OK).is_ok()
}

/// Write access on a file or directory.
pub fn is_writable(path: &Path) -> bool {
    access(path, libc::W_OK).is_ok()
}

/// Write access, keeping the OS error for reporting.
pub fn check_writable(path: &Path) -> io::Result<()> {
    access(path, libc::W_OK)
}

/// Read plus execute on a directory, required to list and enter it.
pub fn is_traversable(path: &Path) -> bool {
    access(path, libc::R_OK | libc::X_OK).is_ok()
}

/// Read, write and execute on a directory, required to empty and remove it.
pub fn is_removable_dir(path: &Path) -> bool {
    access(path, libc::R_OK | libc::X_OK | libc::W_OK).is_ok()
}

/// Read plus write on a file, required to delete it.
pub fn is_removable_file(path: &Path) -> bool {
    access(path, libc::R_OK | libc::W_OK).is_ok()
}
