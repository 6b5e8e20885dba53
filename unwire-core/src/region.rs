//! Mapping the target page.
//!
//! [`map_first_page`] opens the target read-only and maps exactly one page
//! of it from offset 0 with shared, file-backed semantics. The descriptor is
//! closed as soon as the mapping exists; the mapping keeps the vnode alive.
//!
//! The returned [`MappedRegion`] is a drop guard. If a run is abandoned before
//! the trigger, dropping it deallocates the range best-effort. The trigger
//! takes the range out with [`MappedRegion::consume`] so the deliberate
//! release is never doubled.

use std::fs::File;
use std::path::Path;

use log::{debug, warn};

use crate::error::ExploitError;
use crate::vm::{PageRange, VirtualMemory, VmError};

/// One read-only, shared page of the target file, owned by the caller until
/// the trigger consumes it.
pub struct MappedRegion<'vm, V: VirtualMemory + ?Sized> {
    vm: &'vm V,
    range: PageRange,
    file_len: u64,
    released: bool,
}

impl<'vm, V: VirtualMemory + ?Sized> MappedRegion<'vm, V> {
    /// The memory manager that owns this mapping.
    pub fn vm(&self) -> &'vm V {
        self.vm
    }

    pub fn range(&self) -> PageRange {
        self.range
    }

    /// Base address of the mapping.
    pub fn base(&self) -> usize {
        self.range.base()
    }

    /// Length of the mapping; always one platform page.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Size of the backing file when it was mapped.
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Copy up to `len` leading bytes out of the mapping.
    pub fn read_prefix(&self, len: usize) -> Result<Vec<u8>, VmError> {
        let mut buf = vec![0u8; len.min(self.len())];
        let n = self.vm.read(self.range, &mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Take the range out of the guard without deallocating it.
    ///
    /// After this the caller is responsible for the range.
    pub fn consume(mut self) -> PageRange {
        self.released = true;
        self.range
    }
}

impl<V: VirtualMemory + ?Sized> Drop for MappedRegion<'_, V> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        debug!("releasing abandoned mapping at {:#018x}", self.range.base());
        if let Err(err) = self.vm.deallocate(self.range) {
            warn!(
                "could not release mapping at {:#018x}: {}",
                self.range.base(),
                err
            );
        }
    }
}

/// Map the first page of `path` read-only and shared.
///
/// Fails with [`ExploitError::Mapping`] if the file cannot be opened for
/// reading, is empty (offset 0 would lie past end of file), or the map call
/// itself fails. The file is never opened for writing and its metadata is
/// not touched.
pub fn map_first_page<'vm, V: VirtualMemory + ?Sized>(
    vm: &'vm V,
    path: &Path,
) -> Result<MappedRegion<'vm, V>, ExploitError> {
    let mapping_error = |source: VmError| ExploitError::Mapping {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|err| mapping_error(err.into()))?;
    let file_len = file
        .metadata()
        .map_err(|err| mapping_error(err.into()))?
        .len();
    if file_len == 0 {
        return Err(mapping_error(VmError::PastEndOfFile { len: file_len }));
    }

    let range = vm
        .map_shared_read_only(&file, vm.page_size())
        .map_err(mapping_error)?;
    drop(file);

    debug!(
        "mapped {} ({} bytes) at {:#018x}, {:#x} bytes",
        path.display(),
        file_len,
        range.base(),
        range.len()
    );

    Ok(MappedRegion {
        vm,
        range,
        file_len,
        released: false,
    })
}
