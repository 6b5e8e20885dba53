//! Virtual-memory behavior selectors for `vm_behavior_set`.

use core::fmt;

use crate::RawBehavior;

pub const VM_BEHAVIOR_DEFAULT: RawBehavior = 0;
pub const VM_BEHAVIOR_RANDOM: RawBehavior = 1;
pub const VM_BEHAVIOR_SEQUENTIAL: RawBehavior = 2;
pub const VM_BEHAVIOR_RSEQNTL: RawBehavior = 3;
pub const VM_BEHAVIOR_WILLNEED: RawBehavior = 4;
pub const VM_BEHAVIOR_DONTNEED: RawBehavior = 5;
pub const VM_BEHAVIOR_FREE: RawBehavior = 6;
/// Zero the physical page when the entry is unwired.
///
/// Sets `zero_wired_pages` on every map entry in the range. The kernel
/// accepts it on any entry the task owns, whatever its protection.
pub const VM_BEHAVIOR_ZERO_WIRED_PAGES: RawBehavior = 7;
pub const VM_BEHAVIOR_REUSABLE: RawBehavior = 8;
pub const VM_BEHAVIOR_REUSE: RawBehavior = 9;
pub const VM_BEHAVIOR_CAN_REUSE: RawBehavior = 10;
pub const VM_BEHAVIOR_PAGEOUT: RawBehavior = 11;

/// Typed form of the behavior selectors above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum VmBehavior {
    Default = VM_BEHAVIOR_DEFAULT,
    Random = VM_BEHAVIOR_RANDOM,
    Sequential = VM_BEHAVIOR_SEQUENTIAL,
    ReverseSequential = VM_BEHAVIOR_RSEQNTL,
    WillNeed = VM_BEHAVIOR_WILLNEED,
    DontNeed = VM_BEHAVIOR_DONTNEED,
    Free = VM_BEHAVIOR_FREE,
    ZeroWiredPages = VM_BEHAVIOR_ZERO_WIRED_PAGES,
    Reusable = VM_BEHAVIOR_REUSABLE,
    Reuse = VM_BEHAVIOR_REUSE,
    CanReuse = VM_BEHAVIOR_CAN_REUSE,
    Pageout = VM_BEHAVIOR_PAGEOUT,
}

impl VmBehavior {
    /// The raw selector passed across the ABI.
    pub const fn as_raw(self) -> RawBehavior {
        self as RawBehavior
    }

    /// The platform header's name for this selector.
    pub const fn name(self) -> &'static str {
        match self {
            VmBehavior::Default => "VM_BEHAVIOR_DEFAULT",
            VmBehavior::Random => "VM_BEHAVIOR_RANDOM",
            VmBehavior::Sequential => "VM_BEHAVIOR_SEQUENTIAL",
            VmBehavior::ReverseSequential => "VM_BEHAVIOR_RSEQNTL",
            VmBehavior::WillNeed => "VM_BEHAVIOR_WILLNEED",
            VmBehavior::DontNeed => "VM_BEHAVIOR_DONTNEED",
            VmBehavior::Free => "VM_BEHAVIOR_FREE",
            VmBehavior::ZeroWiredPages => "VM_BEHAVIOR_ZERO_WIRED_PAGES",
            VmBehavior::Reusable => "VM_BEHAVIOR_REUSABLE",
            VmBehavior::Reuse => "VM_BEHAVIOR_REUSE",
            VmBehavior::CanReuse => "VM_BEHAVIOR_CAN_REUSE",
            VmBehavior::Pageout => "VM_BEHAVIOR_PAGEOUT",
        }
    }
}

impl fmt::Display for VmBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_wired_pages_is_seven() {
        assert_eq!(VmBehavior::ZeroWiredPages.as_raw(), 7);
    }

    #[test]
    fn discriminants_match_header_values() {
        assert_eq!(VmBehavior::Default.as_raw(), VM_BEHAVIOR_DEFAULT);
        assert_eq!(VmBehavior::ReverseSequential.as_raw(), VM_BEHAVIOR_RSEQNTL);
        assert_eq!(VmBehavior::Pageout.as_raw(), VM_BEHAVIOR_PAGEOUT);
    }

    #[test]
    fn display_uses_header_name() {
        use std::string::ToString;
        assert_eq!(
            VmBehavior::ZeroWiredPages.to_string(),
            "VM_BEHAVIOR_ZERO_WIRED_PAGES"
        );
    }
}
