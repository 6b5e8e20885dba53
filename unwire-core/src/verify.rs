//! Checking the backing file after the trigger.
//!
//! The target is reopened through a new descriptor that has nothing to do
//! with the (now gone) mapping and its prefix is compared with the snapshot.
//! This never writes and can be repeated; two calls after one trigger give
//! the same answer.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};

use log::debug;

use crate::error::ExploitError;
use crate::target::TargetFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// At least one snapshot byte that was non-zero now reads as zero.
    Modified,
    /// The trigger ran but the prefix is as it was.
    Unmodified,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Modified => "modified",
            Verdict::Unmodified => "unmodified",
        })
    }
}

/// Outcome of comparing the current prefix against the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub verdict: Verdict,
    /// Bytes that went from non-zero to zero.
    pub zeroed: usize,
    /// Bytes present in both the snapshot and the current read.
    pub compared: usize,
}

/// Compare two byte prefixes position by position.
pub fn compare(snapshot: &[u8], current: &[u8]) -> Comparison {
    let compared = snapshot.len().min(current.len());
    let zeroed = snapshot
        .iter()
        .zip(current)
        .filter(|&(&before, &after)| before != 0 && after == 0)
        .count();
    let verdict = if zeroed > 0 {
        Verdict::Modified
    } else {
        Verdict::Unmodified
    };
    Comparison {
        verdict,
        zeroed,
        compared,
    }
}

/// Reopen the target read-only and compare its prefix with the snapshot.
///
/// Fails with [`ExploitError::Verification`] only if the file cannot be
/// opened or yields no bytes at all.
pub fn verify(target: &TargetFile) -> Result<Comparison, ExploitError> {
    let verification_error = |source: io::Error| ExploitError::Verification {
        path: target.path().to_path_buf(),
        source,
    };

    let snapshot = target.snapshot().as_bytes();
    let file = File::open(target.path()).map_err(verification_error)?;
    let mut current = Vec::with_capacity(snapshot.len());
    file.take(snapshot.len() as u64)
        .read_to_end(&mut current)
        .map_err(verification_error)?;
    if current.is_empty() {
        return Err(verification_error(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no bytes to compare",
        )));
    }

    let comparison = compare(snapshot, &current);
    debug!(
        "compared {} bytes of {}: {} zeroed",
        comparison.compared,
        target.path().display(),
        comparison.zeroed
    );
    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Snapshot;
    use std::io::Write;

    #[test]
    fn identical_prefix_is_unmodified() {
        let c = compare(b"AAAA", b"AAAA");
        assert_eq!(c.verdict, Verdict::Unmodified);
        assert_eq!(c.zeroed, 0);
        assert_eq!(c.compared, 4);
    }

    #[test]
    fn zeroed_bytes_are_counted() {
        let c = compare(b"AAAA", b"A\0\0A");
        assert_eq!(c.verdict, Verdict::Modified);
        assert_eq!(c.zeroed, 2);
    }

    #[test]
    fn bytes_that_were_already_zero_do_not_count() {
        let c = compare(b"A\0A\0", b"A\0A\0");
        assert_eq!(c.verdict, Verdict::Unmodified);
    }

    #[test]
    fn verdict_display() {
        assert_eq!(Verdict::Modified.to_string(), "modified");
        assert_eq!(Verdict::Unmodified.to_string(), "unmodified");
    }

    #[test]
    fn other_changes_are_not_zeroing() {
        let c = compare(b"AAAA", b"BBBB");
        assert_eq!(c.verdict, Verdict::Unmodified);
    }

    #[test]
    fn shorter_current_prefix_compares_overlap_only() {
        let c = compare(b"AAAA", b"\0A");
        assert_eq!(c.compared, 2);
        assert_eq!(c.zeroed, 1);
        assert_eq!(c.verdict, Verdict::Modified);
    }

    #[test]
    fn verify_reads_file_prefix() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 8]).unwrap();
        file.write_all(b"AAAAAAAA").unwrap();
        file.flush().unwrap();

        let target = TargetFile::new(file.path(), 16, Snapshot::new(vec![b'A'; 12]));
        let c = verify(&target).unwrap();
        assert_eq!(c.compared, 12);
        assert_eq!(c.zeroed, 8);
        assert_eq!(c.verdict, Verdict::Modified);
    }

    #[test]
    fn verify_is_repeatable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\0\0AA").unwrap();
        file.flush().unwrap();

        let target = TargetFile::new(file.path(), 4, Snapshot::new(b"AAAA".to_vec()));
        assert_eq!(verify(&target).unwrap(), verify(&target).unwrap());
    }

    #[test]
    fn missing_file_is_a_verification_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = TargetFile::new(
            dir.path().join("gone"),
            4,
            Snapshot::new(b"AAAA".to_vec()),
        );
        let err = verify(&target).unwrap_err();
        assert!(matches!(err, ExploitError::Verification { .. }));
    }

    #[test]
    fn empty_file_is_a_verification_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let target = TargetFile::new(file.path(), 0, Snapshot::new(b"AAAA".to_vec()));
        let err = verify(&target).unwrap_err();
        match err {
            ExploitError::Verification { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof)
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
