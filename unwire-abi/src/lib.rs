//! Platform memory-manager ABI consumed by the unwire tooling.
//!
//! This crate holds the raw scalar types, behavior codes and kernel return
//! codes that must match the platform interface bit for bit. Nothing here
//! performs a call; the backends in `unwire-core` do that.

#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod behavior;
pub mod kern;

pub use behavior::VmBehavior;
pub use kern::KernReturn;

// =============================================================================
// Raw ABI scalars
// =============================================================================

/// Send right to a task's control port (`mach_port_t`).
pub type MachPort = u32;

/// Address within a task's virtual address space (`vm_address_t`).
pub type VmAddress = usize;

/// Size of a virtual address range in bytes (`vm_size_t`).
pub type VmSize = usize;

/// Raw kernel return value (`kern_return_t`).
pub type RawKernReturn = i32;

/// Raw behavior selector passed to `vm_behavior_set` (`vm_behavior_t`).
pub type RawBehavior = i32;

// =============================================================================
// Run constants
// =============================================================================

/// File offset of the single page that gets mapped.
pub const MAP_OFFSET: i64 = 0;

/// Number of leading bytes snapshotted before the trigger and compared after it.
pub const COMPARE_PREFIX_LEN: usize = 128;

/// Page size assumed when the host refuses to report one.
pub const FALLBACK_PAGE_SIZE: usize = 4096;
