//! Host virtual-memory queries and controls.

use std::fs::OpenOptions;
use std::io::{self, Write};

use crate::error::{ProbeError, Result};

/// Writing ASCII `3` here asks the kernel to drop both the page cache and
/// reclaimable slab objects.
pub const DROP_CACHES_PATH: &str = "/proc/sys/vm/drop_caches";

/// The system page size in bytes. Queried once per run and threaded
/// through every conversion rather than stashed in a global.
pub fn page_size() -> Result<u64> {
    let ret = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if ret < 0 {
        return Err(ProbeError::PageSize(io::Error::last_os_error()));
    }
    Ok(ret as u64)
}

/// Flush dirty pages to disk, then drop page cache and slab.
///
/// Needs root: the drop_caches write fails with EACCES otherwise.
pub fn drop_page_cache() -> Result<()> {
    unsafe { libc::sync() };
    let mut file = OpenOptions::new()
        .write(true)
        .open(DROP_CACHES_PATH)
        .map_err(|e| ProbeError::open(DROP_CACHES_PATH, e))?;
    file.write_all(b"3")
        .map_err(|e| ProbeError::write(DROP_CACHES_PATH, e))
}
