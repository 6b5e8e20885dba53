//! Mach backend.
//!
//! `vm_behavior_set` and `vm_deallocate` are the MIG wrappers from
//! libsystem_kernel. Wiring goes through `mlock`, which wraps
//! `mach_vm_wire_kernel` and needs no host privilege port.

use std::fs::File;

use log::trace;
use unwire_abi::{KernReturn, MachPort, RawBehavior, RawKernReturn, VmAddress, VmBehavior, VmSize};

use super::{
    PageRange, VirtualMemory, VmError, copy_from_mapping, host_page_size, mlock_range,
    mmap_shared_read_only,
};

unsafe extern "C" {
    static mach_task_self_: MachPort;

    fn vm_behavior_set(
        target_task: MachPort,
        address: VmAddress,
        size: VmSize,
        new_behavior: RawBehavior,
    ) -> RawKernReturn;

    fn vm_deallocate(target_task: MachPort, address: VmAddress, size: VmSize) -> RawKernReturn;
}

/// The calling task's own map.
pub struct MachVm {
    task: MachPort,
    page_size: usize,
}

impl MachVm {
    pub fn new() -> Self {
        // SAFETY: mach_task_self_ is initialised by libSystem before main and
        // never written afterwards.
        let task = unsafe { mach_task_self_ };
        Self {
            task,
            page_size: host_page_size(),
        }
    }
}

impl Default for MachVm {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualMemory for MachVm {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn map_shared_read_only(&self, file: &File, len: usize) -> Result<PageRange, VmError> {
        mmap_shared_read_only(file, len)
    }

    fn set_zero_wired_pages(&self, range: PageRange) -> Result<(), VmError> {
        let behavior = VmBehavior::ZeroWiredPages;
        trace!(
            "vm_behavior_set({:#x}, {:#018x}, {:#x}, {})",
            self.task,
            range.base(),
            range.len(),
            behavior
        );
        // SAFETY: vm_behavior_set only edits map-entry metadata; it never
        // touches memory this process can observe through a reference.
        let kr = unsafe {
            vm_behavior_set(
                self.task,
                range.base(),
                range.len(),
                behavior.as_raw(),
            )
        };
        Ok(KernReturn::from_raw(kr).into_result()?)
    }

    fn wire(&self, range: PageRange) -> Result<(), VmError> {
        trace!("mlock({:#018x}, {:#x})", range.base(), range.len());
        mlock_range(range)
    }

    fn deallocate(&self, range: PageRange) -> Result<(), VmError> {
        trace!(
            "vm_deallocate({:#x}, {:#018x}, {:#x})",
            self.task,
            range.base(),
            range.len()
        );
        // SAFETY: the range came from our own mmap and no Rust reference into
        // it outlives this call.
        let kr = unsafe { vm_deallocate(self.task, range.base(), range.len()) };
        Ok(KernReturn::from_raw(kr).into_result()?)
    }

    fn read(&self, range: PageRange, buf: &mut [u8]) -> Result<usize, VmError> {
        // SAFETY: callers only pass ranges this backend mapped and has not
        // yet deallocated.
        Ok(unsafe { copy_from_mapping(range, buf) })
    }
}
