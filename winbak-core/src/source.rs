// winbak_core/src/source.rs
use crate::domain::ArchivedEntry;
use crate::error::Result;
use std::io::Read;
use std::path::Path;

/// One opened archive: its entry table and per-entry byte streams.
pub trait ArchiveSource {
    fn entries(&mut self) -> Result<Vec<ArchivedEntry>>;

    /// General-purpose flag bit 11 of one entry. Read per entry so a damaged
    /// header only costs that entry.
    fn name_is_utf8(&mut self, index: usize) -> Result<bool>;

    /// Decompressed stream for the entry at `index` (as listed by `entries`).
    fn open_entry(&mut self, index: usize) -> Result<Box<dyn Read + '_>>;
}

pub trait ArchiveOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveSource>>;
}
