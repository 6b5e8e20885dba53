//! Wiring the region.
//!
//! A read-only page can be wired for read access; writes would still fault.
//! The memory manager refuses to wire pages of symmetric copy-on-write
//! objects and converts them to delay-copy first, so only delay-copy
//! objects (plain files through the vnode pager) reach the trigger with
//! their real page wired.

use log::debug;

use crate::error::ExploitError;
use crate::region::MappedRegion;
use crate::vm::VirtualMemory;

/// Wire the region's page with the unprivileged lock primitive.
pub fn wire_region<V: VirtualMemory + ?Sized>(
    region: &MappedRegion<'_, V>,
) -> Result<(), ExploitError> {
    region
        .vm()
        .wire(region.range())
        .map_err(ExploitError::Lock)?;
    debug!("wired {:#x} bytes at {:#018x}", region.len(), region.base());
    Ok(())
}
