mod cli;
mod logging;
mod scratch;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use unwire_core::{NativeVm, Orchestrator, RunConfig, RunFailure, RunReport, Verdict};

use crate::cli::Args;
use crate::logging::Logger;
use crate::scratch::ScratchFile;

static LOGGER: Logger = Logger;

const EXIT_MODIFIED: u8 = 0;
const EXIT_UNMODIFIED: u8 = 1;
const EXIT_FAILED: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(args.log_level());
    }

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(EXIT_FAILED)
        }
    }
}

fn run(args: &Args) -> Result<u8> {
    // Outlives the run so the file is cleaned up on every path.
    let scratch;
    let path = match &args.target {
        Some(target) => target.as_path(),
        None => {
            info!("no target given, using a scratch file");
            scratch = ScratchFile::create(args.scratch_dir.as_deref(), args.keep_scratch)?;
            scratch.path()
        }
    };

    let vm = NativeVm::new();
    let config = RunConfig {
        compare_len: args.compare_len,
    };

    let result = Orchestrator::new(&vm, config).run(path);
    match &result {
        Ok(report) => println!(
            "{}: {} ({} of {} bytes zeroed, page {:#018x})",
            report.target.path().display(),
            report.verdict(),
            report.comparison.zeroed,
            report.comparison.compared,
            report.region.base()
        ),
        Err(failure) => println!("{}: {} stage failed", path.display(), failure.stage),
    }
    let code = exit_code(&result);
    if let Err(failure) = result {
        error!("{:#}", anyhow::Error::new(failure));
    }

    Ok(code)
}

fn exit_code(result: &Result<RunReport, RunFailure>) -> u8 {
    match result {
        Ok(report) => match report.verdict() {
            Verdict::Modified => EXIT_MODIFIED,
            Verdict::Unmodified => EXIT_UNMODIFIED,
        },
        Err(_) => EXIT_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use unwire_core::{
        Comparison, ExploitError, ExploitState, PageRange, Snapshot, Stage, TargetFile, VmError,
    };

    fn report(verdict: Verdict, zeroed: usize) -> RunReport {
        RunReport {
            target: TargetFile::new("/tmp/AAAAs.txt", 0x8000, Snapshot::new(vec![b'A'; 128])),
            region: PageRange::new(0x1_0000_0000, 0x4000),
            comparison: Comparison {
                verdict,
                zeroed,
                compared: 128,
            },
            trail: vec![ExploitState::Verified],
        }
    }

    #[test]
    fn modified_exits_zero() {
        assert_eq!(exit_code(&Ok(report(Verdict::Modified, 128))), 0);
    }

    #[test]
    fn unmodified_exits_one() {
        assert_eq!(exit_code(&Ok(report(Verdict::Unmodified, 0))), 1);
    }

    #[test]
    fn stage_failure_exits_two() {
        let failure = RunFailure {
            stage: Stage::Map,
            error: ExploitError::Mapping {
                path: "/nonexistent".into(),
                source: VmError::Os(io::Error::from(io::ErrorKind::NotFound)),
            },
            trail: vec![ExploitState::Unmapped, ExploitState::Failed(Stage::Map)],
        };
        assert_eq!(exit_code(&Err(failure)), 2);
    }
}
