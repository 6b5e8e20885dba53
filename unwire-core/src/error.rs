//! Stage errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::state::Stage;
use crate::vm::VmError;

/// Why a stage failed. One variant per stage.
///
/// None of these are retried: each reflects a deterministic precondition
/// (file presence, address validity, wiring limits) rather than a transient
/// condition. A trigger that ran but left the file alone is not an error;
/// it is reported as [`Verdict::Unmodified`](crate::Verdict::Unmodified).
#[derive(Debug, Error)]
pub enum ExploitError {
    #[error("mapping {} failed", path.display())]
    Mapping {
        path: PathBuf,
        #[source]
        source: VmError,
    },

    #[error("setting zero-wired-pages behavior failed")]
    BehaviorSet(#[source] VmError),

    #[error("wiring region failed")]
    Lock(#[source] VmError),

    #[error("deallocating wired region failed")]
    Deallocation(#[source] VmError),

    #[error("re-reading {} failed", path.display())]
    Verification {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ExploitError {
    /// The stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            ExploitError::Mapping { .. } => Stage::Map,
            ExploitError::BehaviorSet(_) => Stage::SetBehavior,
            ExploitError::Lock(_) => Stage::Lock,
            ExploitError::Deallocation(_) => Stage::Trigger,
            ExploitError::Verification { .. } => Stage::Verify,
        }
    }
}
