//! Run state machine.
//!
//! ```text
//! Unmapped -> Mapped -> BehaviorSet -> Locked -> Triggered -> Verified
//!     \          \           \            \           \
//!      `----------`-----------`------------`-----------`--> Failed(stage)
//! ```
//!
//! Each non-terminal state has exactly one forward successor and one way to
//! fail: the stage it is waiting on. `Verified` and `Failed` are terminal.
//!
//! The ordering lives here and only here. The memory manager itself accepts
//! the behavior, wire and deallocate calls in any order.

use core::fmt;

use thiserror::Error;

/// One step of the trigger sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Map,
    SetBehavior,
    Lock,
    Trigger,
    Verify,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Map,
        Stage::SetBehavior,
        Stage::Lock,
        Stage::Trigger,
        Stage::Verify,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Stage::Map => "map",
            Stage::SetBehavior => "set-behavior",
            Stage::Lock => "lock",
            Stage::Trigger => "trigger",
            Stage::Verify => "verify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExploitState {
    Unmapped,
    Mapped,
    BehaviorSet,
    Locked,
    Triggered,
    Verified,
    Failed(Stage),
}

/// A transition the state machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal transition {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: ExploitState,
    pub to: ExploitState,
}

impl ExploitState {
    /// The stage this state is waiting on, or `None` once terminal.
    pub const fn pending_stage(self) -> Option<Stage> {
        match self {
            ExploitState::Unmapped => Some(Stage::Map),
            ExploitState::Mapped => Some(Stage::SetBehavior),
            ExploitState::BehaviorSet => Some(Stage::Lock),
            ExploitState::Locked => Some(Stage::Trigger),
            ExploitState::Triggered => Some(Stage::Verify),
            ExploitState::Verified | ExploitState::Failed(_) => None,
        }
    }

    /// The state reached when the pending stage succeeds.
    pub const fn successor(self) -> Option<ExploitState> {
        match self {
            ExploitState::Unmapped => Some(ExploitState::Mapped),
            ExploitState::Mapped => Some(ExploitState::BehaviorSet),
            ExploitState::BehaviorSet => Some(ExploitState::Locked),
            ExploitState::Locked => Some(ExploitState::Triggered),
            ExploitState::Triggered => Some(ExploitState::Verified),
            ExploitState::Verified | ExploitState::Failed(_) => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ExploitState::Verified | ExploitState::Failed(_))
    }

    /// Move to `to` if the machine allows it.
    ///
    /// Legal moves are the single successor, or `Failed(stage)` where `stage`
    /// is the one currently pending.
    pub fn transition(self, to: ExploitState) -> Result<ExploitState, TransitionError> {
        let legal = match to {
            ExploitState::Failed(stage) => self.pending_stage() == Some(stage),
            _ => self.successor() == Some(to),
        };
        if legal {
            Ok(to)
        } else {
            Err(TransitionError { from: self, to })
        }
    }
}
