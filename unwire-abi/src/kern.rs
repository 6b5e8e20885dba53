//! Kernel return codes (`kern_return_t`).
//!
//! Mirrors the low end of the platform's `kern_return.h` table, which covers
//! every value `vm_behavior_set` and `vm_deallocate` hand back.

use core::fmt;

use crate::RawKernReturn;

pub const KERN_SUCCESS: RawKernReturn = 0;
pub const KERN_INVALID_ADDRESS: RawKernReturn = 1;
pub const KERN_PROTECTION_FAILURE: RawKernReturn = 2;
pub const KERN_NO_SPACE: RawKernReturn = 3;
pub const KERN_INVALID_ARGUMENT: RawKernReturn = 4;
pub const KERN_FAILURE: RawKernReturn = 5;
pub const KERN_RESOURCE_SHORTAGE: RawKernReturn = 6;
pub const KERN_NOT_RECEIVER: RawKernReturn = 7;
pub const KERN_NO_ACCESS: RawKernReturn = 8;
pub const KERN_MEMORY_FAILURE: RawKernReturn = 9;
pub const KERN_MEMORY_ERROR: RawKernReturn = 10;
pub const KERN_ALREADY_IN_SET: RawKernReturn = 11;
pub const KERN_NOT_IN_SET: RawKernReturn = 12;
pub const KERN_NAME_EXISTS: RawKernReturn = 13;
pub const KERN_ABORTED: RawKernReturn = 14;
pub const KERN_INVALID_NAME: RawKernReturn = 15;
pub const KERN_INVALID_TASK: RawKernReturn = 16;
pub const KERN_INVALID_RIGHT: RawKernReturn = 17;
pub const KERN_INVALID_VALUE: RawKernReturn = 18;

/// A kernel return value.
///
/// `KernReturn::SUCCESS` is the only non-error value; use [`into_result`]
/// to turn a raw return into a `Result`.
///
/// [`into_result`]: KernReturn::into_result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct KernReturn(RawKernReturn);

impl KernReturn {
    pub const SUCCESS: KernReturn = KernReturn(KERN_SUCCESS);
    pub const INVALID_ADDRESS: KernReturn = KernReturn(KERN_INVALID_ADDRESS);
    pub const PROTECTION_FAILURE: KernReturn = KernReturn(KERN_PROTECTION_FAILURE);
    pub const NO_SPACE: KernReturn = KernReturn(KERN_NO_SPACE);
    pub const INVALID_ARGUMENT: KernReturn = KernReturn(KERN_INVALID_ARGUMENT);
    pub const FAILURE: KernReturn = KernReturn(KERN_FAILURE);
    pub const RESOURCE_SHORTAGE: KernReturn = KernReturn(KERN_RESOURCE_SHORTAGE);
    pub const NO_ACCESS: KernReturn = KernReturn(KERN_NO_ACCESS);

    /// Wrap a raw return value.
    pub const fn from_raw(raw: RawKernReturn) -> Self {
        KernReturn(raw)
    }

    /// The raw value as returned across the ABI.
    pub const fn as_raw(self) -> RawKernReturn {
        self.0
    }

    pub const fn is_success(self) -> bool {
        self.0 == KERN_SUCCESS
    }

    /// `Ok(())` for `KERN_SUCCESS`, otherwise `Err(self)`.
    #[inline]
    pub const fn into_result(self) -> Result<(), KernReturn> {
        if self.is_success() { Ok(()) } else { Err(self) }
    }

    /// Human-readable description, worded like the platform's error-string table.
    pub const fn description(self) -> &'static str {
        match self.0 {
            KERN_SUCCESS => "(os/kern) successful",
            KERN_INVALID_ADDRESS => "(os/kern) invalid address",
            KERN_PROTECTION_FAILURE => "(os/kern) protection failure",
            KERN_NO_SPACE => "(os/kern) no space available",
            KERN_INVALID_ARGUMENT => "(os/kern) invalid argument",
            KERN_FAILURE => "(os/kern) failure",
            KERN_RESOURCE_SHORTAGE => "(os/kern) resource shortage",
            KERN_NOT_RECEIVER => "(os/kern) not receiver",
            KERN_NO_ACCESS => "(os/kern) no access",
            KERN_MEMORY_FAILURE => "(os/kern) memory failure",
            KERN_MEMORY_ERROR => "(os/kern) memory error",
            KERN_ALREADY_IN_SET => "(os/kern) already in set",
            KERN_NOT_IN_SET => "(os/kern) not in set",
            KERN_NAME_EXISTS => "(os/kern) name exists",
            KERN_ABORTED => "(os/kern) aborted",
            KERN_INVALID_NAME => "(os/kern) invalid name",
            KERN_INVALID_TASK => "(os/kern) invalid task",
            KERN_INVALID_RIGHT => "(os/kern) invalid right",
            KERN_INVALID_VALUE => "(os/kern) invalid value",
            _ => "unknown error code",
        }
    }
}

impl From<RawKernReturn> for KernReturn {
    fn from(raw: RawKernReturn) -> Self {
        KernReturn(raw)
    }
}

impl fmt::Display for KernReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#x})", self.description(), self.0)
    }
}

impl core::error::Error for KernReturn {}
