//! Marking the region zero-on-unwire.

use log::debug;

use crate::error::ExploitError;
use crate::region::MappedRegion;
use crate::vm::VirtualMemory;

/// Apply `VM_BEHAVIOR_ZERO_WIRED_PAGES` to the whole region.
///
/// The region is read-only and the request goes through unchanged: the
/// behavior call has no protection argument, so there is nothing to check
/// it against. Only a bad address range makes it fail.
pub fn mark_zero_on_unwire<V: VirtualMemory + ?Sized>(
    region: &MappedRegion<'_, V>,
) -> Result<(), ExploitError> {
    region
        .vm()
        .set_zero_wired_pages(region.range())
        .map_err(ExploitError::BehaviorSet)?;
    debug!("zero-wired-pages set on {:#018x}", region.base());
    Ok(())
}
