//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use unwire_abi::COMPARE_PREFIX_LEN;

/// Zero the first page of a read-only file through VM_BEHAVIOR_ZERO_WIRED_PAGES.
///
/// Exits 0 if the file was modified, 1 if the trigger ran but the file is
/// unchanged, 2 if any stage failed.
#[derive(Debug, Parser)]
#[command(name = "unwire", version)]
pub struct Args {
    /// File to target. A scratch file is created when omitted.
    pub target: Option<PathBuf>,

    /// Bytes snapshotted before the trigger and compared after it.
    #[arg(long, value_name = "BYTES", default_value_t = COMPARE_PREFIX_LEN)]
    pub compare_len: usize,

    /// Directory for the scratch file.
    #[arg(long, value_name = "DIR", env = "UNWIRE_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Leave the scratch file in place afterwards.
    #[arg(long)]
    pub keep_scratch: bool,

    /// More output; repeat for trace.
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
