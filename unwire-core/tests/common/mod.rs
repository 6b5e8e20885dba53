//! In-memory model of an affected memory manager.
//!
//! `SimulatedVm` keeps one entry per mapping with the two bits of state the
//! defect depends on: the entry's `zero_wired_pages` flag and its wire count.
//! Deleting a wired entry unwires it; if the flag was already set when the
//! page got wired, the page is zeroed with no protection or copy-strategy
//! check. For a delay-copy object that page is the file's cached page, so
//! the zeros are written through to the file on disk.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::{FileExt, MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

use unwire_abi::KernReturn;
use unwire_core::{PageRange, VirtualMemory, VmError};

/// Page size of the simulated platform.
pub const SIM_PAGE: usize = 0x4000;

/// Scenario A target size and fill.
pub const TARGET_LEN: usize = 0x8000;
pub const TARGET_FILL: u8 = 0x41;

const FIRST_BASE: usize = 0x1_0000_0000;

/// How the object behind a mapping resolves copy-on-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStrategy {
    /// Vnode-pager objects: the wired page is the file's page.
    Delay,
    /// Symmetric objects: the wire path refuses them.
    SymmetricRefused,
    /// Symmetric objects converted to delay-copy on wire, leaving the file
    /// behind a private copy.
    SymmetricConverted,
}

struct Entry {
    page: Vec<u8>,
    zero_wired_pages: bool,
    wired: u32,
    wired_while_flagged: bool,
    private_copy: bool,
}

pub struct SimulatedVm {
    backing: Option<File>,
    copy: CopyStrategy,
    patched: bool,
    behavior_error: Option<KernReturn>,
    next_base: Cell<usize>,
    entries: RefCell<BTreeMap<usize, Entry>>,
    calls: RefCell<Vec<&'static str>>,
}

impl SimulatedVm {
    /// A vulnerable memory manager whose file pages are written through to
    /// `backing`, a writable handle to the target.
    pub fn new(backing: File) -> Self {
        Self::with_backing(Some(backing))
    }

    /// A memory manager with no file behind it, for runs that never map.
    pub fn unbacked() -> Self {
        Self::with_backing(None)
    }

    fn with_backing(backing: Option<File>) -> Self {
        Self {
            backing,
            copy: CopyStrategy::Delay,
            patched: false,
            behavior_error: None,
            next_base: Cell::new(FIRST_BASE),
            entries: RefCell::new(BTreeMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_copy_strategy(mut self, copy: CopyStrategy) -> Self {
        self.copy = copy;
        self
    }

    /// The unwire path no longer zeroes pages.
    pub fn patched(mut self) -> Self {
        self.patched = true;
        self
    }

    /// Make `set_zero_wired_pages` fail with `kr`.
    pub fn failing_behavior(mut self, kr: KernReturn) -> Self {
        self.behavior_error = Some(kr);
        self
    }

    /// Primitive calls seen so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn live_mappings(&self) -> usize {
        self.entries.borrow().len()
    }

    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }

    fn zero_backing_page(&self, len: usize) -> io::Result<()> {
        let Some(backing) = &self.backing else {
            return Ok(());
        };
        let file_len = backing.metadata()?.len() as usize;
        let n = len.min(file_len);
        backing.write_all_at(&vec![0u8; n], 0)?;
        backing.sync_all()
    }
}

impl VirtualMemory for SimulatedVm {
    fn page_size(&self) -> usize {
        SIM_PAGE
    }

    fn map_shared_read_only(&self, file: &File, len: usize) -> Result<PageRange, VmError> {
        self.record("map");
        let mut page = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = file.read_at(&mut page[filled..], filled as u64)?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        let base = self.next_base.get();
        self.next_base.set(base + len);
        self.entries.borrow_mut().insert(
            base,
            Entry {
                page,
                zero_wired_pages: false,
                wired: 0,
                wired_while_flagged: false,
                private_copy: false,
            },
        );
        Ok(PageRange::new(base, len))
    }

    fn set_zero_wired_pages(&self, range: PageRange) -> Result<(), VmError> {
        self.record("set_zero_wired_pages");
        if let Some(kr) = self.behavior_error {
            return Err(VmError::Kern(kr));
        }
        let mut entries = self.entries.borrow_mut();
        let entry = entries
            .get_mut(&range.base())
            .ok_or(VmError::Kern(KernReturn::INVALID_ADDRESS))?;
        entry.zero_wired_pages = true;
        Ok(())
    }

    fn wire(&self, range: PageRange) -> Result<(), VmError> {
        self.record("wire");
        let mut entries = self.entries.borrow_mut();
        let entry = entries
            .get_mut(&range.base())
            .ok_or_else(|| VmError::Os(io::Error::from(io::ErrorKind::OutOfMemory)))?;
        match self.copy {
            CopyStrategy::Delay => {}
            CopyStrategy::SymmetricRefused => {
                return Err(VmError::Os(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "symmetric copy object",
                )));
            }
            CopyStrategy::SymmetricConverted => entry.private_copy = true,
        }
        entry.wired += 1;
        entry.wired_while_flagged = entry.zero_wired_pages;
        Ok(())
    }

    fn deallocate(&self, range: PageRange) -> Result<(), VmError> {
        self.record("deallocate");
        let mut entry = self
            .entries
            .borrow_mut()
            .remove(&range.base())
            .ok_or(VmError::Kern(KernReturn::INVALID_ADDRESS))?;

        if entry.wired > 0 && entry.zero_wired_pages && entry.wired_while_flagged && !self.patched
        {
            entry.page.fill(0);
            if !entry.private_copy {
                self.zero_backing_page(entry.page.len())?;
            }
            entry.zero_wired_pages = false;
        }
        Ok(())
    }

    fn read(&self, range: PageRange, buf: &mut [u8]) -> Result<usize, VmError> {
        let entries = self.entries.borrow();
        let entry = entries
            .get(&range.base())
            .ok_or(VmError::Kern(KernReturn::INVALID_ADDRESS))?;
        let n = buf.len().min(entry.page.len());
        buf[..n].copy_from_slice(&entry.page[..n]);
        Ok(n)
    }
}

/// Create `dir/target.bin` holding `len` copies of `fill`, make it mode
/// 0o444, and return its path with a writable handle opened beforehand.
pub fn read_only_target(dir: &Path, len: usize, fill: u8) -> (PathBuf, File) {
    let path = dir.join("target.bin");
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&path)
        .unwrap();
    file.write_all(&vec![fill; len]).unwrap();
    file.sync_all().unwrap();
    fs::set_permissions(&path, Permissions::from_mode(0o444)).unwrap();
    (path, file)
}

/// Permission bits, owner and group of `path`.
pub fn mode_and_owner(path: &Path) -> (u32, u32, u32) {
    let meta = fs::metadata(path).unwrap();
    (meta.mode() & 0o7777, meta.uid(), meta.gid())
}
