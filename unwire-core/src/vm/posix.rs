//! Portable unix backend.
//!
//! There is no zero-on-unwire attribute outside the Mach VM, so the behavior
//! call only validates the range with `madvise(MADV_NORMAL)`. Mapping, wiring
//! and unmapping are the ordinary calls; a full run ends unmodified here.

use std::fs::File;

use log::trace;

use super::{
    PageRange, VirtualMemory, VmError, copy_from_mapping, host_page_size, mlock_range,
    mmap_shared_read_only,
};

/// The calling process's own address space.
pub struct PosixVm {
    page_size: usize,
}

impl PosixVm {
    pub fn new() -> Self {
        Self {
            page_size: host_page_size(),
        }
    }
}

impl Default for PosixVm {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualMemory for PosixVm {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn map_shared_read_only(&self, file: &File, len: usize) -> Result<PageRange, VmError> {
        mmap_shared_read_only(file, len)
    }

    fn set_zero_wired_pages(&self, range: PageRange) -> Result<(), VmError> {
        trace!("madvise({:#018x}, {:#x}, MADV_NORMAL)", range.base(), range.len());
        // SAFETY: MADV_NORMAL is advisory and leaves page contents alone.
        let rc = unsafe {
            libc::madvise(
                range.base() as *mut libc::c_void,
                range.len(),
                libc::MADV_NORMAL,
            )
        };
        if rc != 0 {
            return Err(VmError::last_os_error());
        }
        Ok(())
    }

    fn wire(&self, range: PageRange) -> Result<(), VmError> {
        trace!("mlock({:#018x}, {:#x})", range.base(), range.len());
        mlock_range(range)
    }

    fn deallocate(&self, range: PageRange) -> Result<(), VmError> {
        trace!("munmap({:#018x}, {:#x})", range.base(), range.len());
        // SAFETY: the range came from our own mmap and no Rust reference into
        // it outlives this call.
        let rc = unsafe { libc::munmap(range.base() as *mut libc::c_void, range.len()) };
        if rc != 0 {
            return Err(VmError::last_os_error());
        }
        Ok(())
    }

    fn read(&self, range: PageRange, buf: &mut [u8]) -> Result<usize, VmError> {
        // SAFETY: callers only pass ranges this backend mapped and has not
        // yet deallocated.
        Ok(unsafe { copy_from_mapping(range, buf) })
    }
}
