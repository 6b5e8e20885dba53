//! Zero-on-unwire trigger sequence for a read-only file page.
//!
//! An unprivileged task maps one page of a read-only file, marks the map
//! entry `VM_BEHAVIOR_ZERO_WIRED_PAGES`, wires it with `mlock`, then
//! deallocates it while wired. On an affected Mach VM the unwire path zeroes
//! the physical page without checking the entry's protection or the object's
//! copy strategy, and the zeros show up in the file.
//!
//! The crate is split by stage:
//! - [`region`]: map the first page, owning guard
//! - [`behavior`]: set the zero-on-unwire attribute
//! - [`lock`]: wire the page
//! - [`trigger`]: deallocate while wired
//! - [`verify`]: reopen and compare against the snapshot
//! - [`orchestrator`]: run the stages in order, tracking [`ExploitState`]
//!
//! All platform access goes through [`vm::VirtualMemory`].

pub mod behavior;
pub mod error;
pub mod lock;
pub mod orchestrator;
pub mod region;
pub mod state;
pub mod target;
pub mod trigger;
pub mod verify;
pub mod vm;

pub use error::ExploitError;
pub use orchestrator::{Orchestrator, RunConfig, RunFailure, RunReport};
pub use region::MappedRegion;
pub use state::{ExploitState, Stage};
pub use target::{Snapshot, TargetFile};
pub use verify::{Comparison, Verdict};
pub use vm::{NativeVm, PageRange, VirtualMemory, VmError};
