//! The file under test and its pre-trigger snapshot.

use std::path::{Path, PathBuf};

use crate::region::MappedRegion;
use crate::vm::{VirtualMemory, VmError};

/// Leading bytes of the target as seen through the mapping before any
/// metadata was changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Vec<u8>);

impl Snapshot {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Path, size and baseline of the target. Immutable once captured.
#[derive(Debug, Clone)]
pub struct TargetFile {
    path: PathBuf,
    len: u64,
    snapshot: Snapshot,
}

impl TargetFile {
    pub fn new(path: impl Into<PathBuf>, len: u64, snapshot: Snapshot) -> Self {
        Self {
            path: path.into(),
            len,
            snapshot,
        }
    }

    /// Snapshot up to `prefix_len` bytes through a freshly mapped region.
    ///
    /// Must run before the region's behavior is changed.
    pub fn capture<V: VirtualMemory + ?Sized>(
        path: &Path,
        region: &MappedRegion<'_, V>,
        prefix_len: usize,
    ) -> Result<Self, VmError> {
        let bytes = region.read_prefix(prefix_len)?;
        Ok(Self::new(path, region.file_len(), Snapshot::new(bytes)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File size in bytes at mapping time.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}
