//! Scratch target used when no file is given.
//!
//! The file is 0x8000 bytes of `A`, mode 0o444. Dropping the guard makes it
//! writable again and unlinks it, unless the caller asked to keep it.

use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};

pub const SCRATCH_FILE_NAME: &str = "test_file.txt";
pub const SCRATCH_LEN: usize = 0x8000;
pub const SCRATCH_FILL: u8 = b'A';

const READ_ONLY_MODE: u32 = 0o444;
const CLEANUP_MODE: u32 = 0o644;

pub struct ScratchFile {
    path: PathBuf,
    keep: bool,
}

impl ScratchFile {
    /// Create the scratch file in `dir`, or the current directory.
    pub fn create(dir: Option<&Path>, keep: bool) -> Result<Self> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().context("cannot determine current directory")?,
        };
        let dir = fs::canonicalize(&dir)
            .with_context(|| format!("cannot resolve {}", dir.display()))?;
        let path = dir.join(SCRATCH_FILE_NAME);

        info!("creating scratch file {}", path.display());
        fs::write(&path, vec![SCRATCH_FILL; SCRATCH_LEN])
            .with_context(|| format!("cannot write {}", path.display()))?;
        // From here on the guard owns the file, so a failed chmod still cleans up.
        let scratch = Self { path, keep };
        fs::set_permissions(&scratch.path, Permissions::from_mode(READ_ONLY_MODE))
            .with_context(|| format!("cannot make {} read-only", scratch.path.display()))?;
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.keep {
            info!("keeping scratch file {}", self.path.display());
            return;
        }
        if let Err(err) = fs::set_permissions(&self.path, Permissions::from_mode(CLEANUP_MODE)) {
            warn!("cannot restore mode on {}: {}", self.path.display(), err);
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("removed scratch file {}", self.path.display()),
            Err(err) => warn!("cannot remove {}: {}", self.path.display(), err),
        }
    }
}
