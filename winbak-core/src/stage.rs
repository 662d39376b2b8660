use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

use tracing::{debug, warn};

use crate::context::RunContext;
use crate::decode::NameDecoder;
use crate::domain::{ArchiveFile, ArchivedEntry, StagedFragment};
use crate::error::{Result, WinbakError};
use crate::path::RelPath;
use crate::source::ArchiveSource;
use crate::util::copy::{COPY_BUF_SIZE, copy_with_buffer};

/// Streams archive entries to `.part_NNNN` files, one per occurrence.
///
/// Indices are handed out per case-insensitive path in the order entries are
/// seen, so they encode archive processing order. Must run single-threaded.
pub struct FragmentStager {
    decoder: NameDecoder,
    counters: HashMap<String, u32>,
    fragments: Vec<StagedFragment>,
    buf: Vec<u8>,
}

impl FragmentStager {
    pub fn new(decoder: NameDecoder) -> Self {
        Self {
            decoder,
            counters: HashMap::new(),
            fragments: Vec::new(),
            buf: vec![0u8; COPY_BUF_SIZE],
        }
    }

    /// Stage every file entry of one archive. Failures are recorded per entry
    /// and never stop the loop.
    pub fn stage_archive(
        &mut self,
        ctx: &mut RunContext,
        archive: &ArchiveFile,
        source: &mut dyn ArchiveSource,
    ) {
        let archive_name = archive.display_name();
        let entries = match source.entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(archive = %archive_name, error = %e, "cannot list archive");
                ctx.ledger.record_extraction_error(&archive_name, None, &e);
                return;
            }
        };

        for entry in entries.iter().filter(|e| !e.is_dir()) {
            match self.stage_entry(ctx, &archive_name, source, entry) {
                Ok(frag) => {
                    debug!(
                        archive = %archive_name,
                        path = %frag.path.display(),
                        bytes = frag.size,
                        "staged fragment"
                    );
                    ctx.ledger.note_fragment();
                    self.fragments.push(frag);
                }
                Err(e) => {
                    let entry_name = entry.lossy_name();
                    warn!(archive = %archive_name, entry = %entry_name, error = %e, "entry failed");
                    ctx.ledger
                        .record_extraction_error(&archive_name, Some(&entry_name), &e);
                }
            }
        }
    }

    fn stage_entry(
        &mut self,
        ctx: &RunContext,
        archive_name: &str,
        source: &mut dyn ArchiveSource,
        entry: &ArchivedEntry,
    ) -> Result<StagedFragment> {
        let utf8 = source.name_is_utf8(entry.index)?;
        let name = self.decoder.decode(&entry.raw_name, utf8)?;
        let rel = RelPath::from_entry_name(&name)?;
        let key = rel.key();
        let index = self.counters.get(&key).copied().unwrap_or(0) + 1;

        let path = ctx.staging.prepare_fragment(&rel, index)?;
        // create_new: a fragment is never overwritten
        let mut out = OpenOptions::new().write(true).create_new(true).open(&path)?;
        let copied = copy_entry(source, entry.index, &mut out, &mut self.buf);
        drop(out);

        let written = match copied {
            Ok(n) => n,
            Err(e) => {
                discard_partial(&path);
                return Err(e);
            }
        };
        if written != entry.size {
            discard_partial(&path);
            return Err(WinbakError::Extraction(format!(
                "declared {} bytes, extracted {written}",
                entry.size
            )));
        }

        self.counters.insert(key, index);
        Ok(StagedFragment {
            rel,
            index,
            path,
            size: written,
            archive: Some(archive_name.to_string()),
        })
    }

    pub fn fragments(&self) -> &[StagedFragment] {
        &self.fragments
    }

    pub fn into_fragments(self) -> Vec<StagedFragment> {
        self.fragments
    }
}

fn copy_entry(
    source: &mut dyn ArchiveSource,
    index: usize,
    out: &mut File,
    buf: &mut [u8],
) -> Result<u64> {
    let mut reader = source.open_entry(index)?;
    Ok(copy_with_buffer(&mut reader, out, buf)?)
}

fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "cannot remove partial fragment");
    }
}
