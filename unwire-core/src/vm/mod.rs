//! Memory-manager capability.
//!
//! Every stage talks to the platform through [`VirtualMemory`]. Exactly one
//! concrete backend is compiled per target and exported as [`NativeVm`]:
//! - Apple targets: [`MachVm`], the real `vm_behavior_set` / `mlock` /
//!   `vm_deallocate` path.
//! - Other unix targets: [`PosixVm`], where the zero-on-unwire attribute does
//!   not exist and a full run ends unmodified.

use std::fs::File;
use std::io;

use thiserror::Error;
use unwire_abi::{FALLBACK_PAGE_SIZE, KernReturn};

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod mach;
#[cfg(all(unix, not(any(target_os = "macos", target_os = "ios"))))]
mod posix;

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub use mach::MachVm;
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub type NativeVm = MachVm;

#[cfg(all(unix, not(any(target_os = "macos", target_os = "ios"))))]
pub use posix::PosixVm;
#[cfg(all(unix, not(any(target_os = "macos", target_os = "ios"))))]
pub type NativeVm = PosixVm;

/// A contiguous span of a task's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRange {
    base: usize,
    len: usize,
}

impl PageRange {
    pub const fn new(base: usize, len: usize) -> Self {
        Self { base, len }
    }

    /// First address of the range.
    pub const fn base(&self) -> usize {
        self.base
    }

    /// Length of the range in bytes.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last address, or `None` if the range wraps.
    pub const fn end(&self) -> Option<usize> {
        self.base.checked_add(self.len)
    }
}

/// Errors reported by a memory-manager backend.
#[derive(Debug, Error)]
pub enum VmError {
    /// A Mach call returned something other than `KERN_SUCCESS`.
    #[error("{0}")]
    Kern(KernReturn),
    /// A BSD-layer call failed with `errno`.
    #[error(transparent)]
    Os(#[from] io::Error),
    /// The requested file offset is not inside the file.
    #[error("file is {len} bytes long; offset 0 is past end of file")]
    PastEndOfFile { len: u64 },
}

impl VmError {
    /// Capture `errno` from the call that just failed.
    pub fn last_os_error() -> Self {
        VmError::Os(io::Error::last_os_error())
    }
}

impl From<KernReturn> for VmError {
    fn from(kr: KernReturn) -> Self {
        VmError::Kern(kr)
    }
}

/// The four memory-manager primitives the trigger sequence needs, plus a
/// read-back used for the pre-trigger snapshot.
///
/// Implementations must forward each call straight to the platform. In
/// particular [`set_zero_wired_pages`](Self::set_zero_wired_pages) takes no
/// protection argument and must not consult the region's protection or the
/// backing object's copy strategy before handing the request on.
pub trait VirtualMemory {
    /// Size of one platform page.
    fn page_size(&self) -> usize;

    /// Map `len` bytes of `file` from offset 0, read-only and shared.
    fn map_shared_read_only(&self, file: &File, len: usize) -> Result<PageRange, VmError>;

    /// Mark every entry in `range` to zero its pages when they are unwired.
    fn set_zero_wired_pages(&self, range: PageRange) -> Result<(), VmError>;

    /// Wire the pages of `range` with the unprivileged lock primitive.
    fn wire(&self, range: PageRange) -> Result<(), VmError>;

    /// Remove `range` from the address space.
    fn deallocate(&self, range: PageRange) -> Result<(), VmError>;

    /// Copy up to `buf.len()` bytes from the start of `range` into `buf`.
    fn read(&self, range: PageRange, buf: &mut [u8]) -> Result<usize, VmError>;
}

/// Page size reported by the host, falling back to 4 KiB.
pub fn host_page_size() -> usize {
    // SAFETY: sysconf has no memory-safety preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        FALLBACK_PAGE_SIZE
    }
}

/// Copy the head of a live mapping into `buf`.
///
/// # Safety
/// `range` must describe a readable mapping in this process that stays
/// mapped for the duration of the call.
#[cfg(unix)]
unsafe fn copy_from_mapping(range: PageRange, buf: &mut [u8]) -> usize {
    let n = buf.len().min(range.len());
    // SAFETY: the caller guarantees `range` is mapped and readable, and `n`
    // never exceeds either side.
    unsafe {
        std::ptr::copy_nonoverlapping(range.base() as *const u8, buf.as_mut_ptr(), n);
    }
    n
}

/// `mmap(NULL, len, PROT_READ, MAP_FILE | MAP_SHARED, fd, 0)`.
#[cfg(unix)]
fn mmap_shared_read_only(file: &File, len: usize) -> Result<PageRange, VmError> {
    use std::os::fd::AsRawFd;

    // SAFETY: a fresh mapping at a kernel-chosen address cannot alias any
    // existing Rust object.
    let addr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            len,
            libc::PROT_READ,
            libc::MAP_FILE | libc::MAP_SHARED,
            file.as_raw_fd(),
            unwire_abi::MAP_OFFSET as libc::off_t,
        )
    };
    if addr == libc::MAP_FAILED {
        return Err(VmError::last_os_error());
    }
    Ok(PageRange::new(addr as usize, len))
}

/// `mlock(base, len)`.
#[cfg(unix)]
fn mlock_range(range: PageRange) -> Result<(), VmError> {
    // SAFETY: mlock only changes residency accounting for the range.
    let rc = unsafe { libc::mlock(range.base() as *const libc::c_void, range.len()) };
    if rc != 0 {
        return Err(VmError::last_os_error());
    }
    Ok(())
}
