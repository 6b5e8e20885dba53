//! Releasing the wired region.
//!
//! Deleting a map entry with a non-zero wire count unwires it first. The
//! unwire path looks the page up with no access intent and, if the entry
//! carries `zero_wired_pages`, zeroes the physical page before clearing the
//! flag. Neither the entry's protection nor the object's copy strategy is
//! consulted on the way, so the zero lands in the file's cached page.

use log::debug;

use crate::error::ExploitError;
use crate::region::MappedRegion;
use crate::vm::VirtualMemory;

/// Deallocate the region while it is still wired.
///
/// Consumes the guard: whether the call succeeds or not, the range is no
/// longer tracked and will not be released again on drop.
pub fn release_wired<V: VirtualMemory + ?Sized>(
    region: MappedRegion<'_, V>,
) -> Result<(), ExploitError> {
    let vm = region.vm();
    let range = region.consume();
    vm.deallocate(range).map_err(ExploitError::Deallocation)?;
    debug!("deallocated {:#x} bytes at {:#018x}", range.len(), range.base());
    Ok(())
}
