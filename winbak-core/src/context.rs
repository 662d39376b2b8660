use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ledger::RunLedger;
use crate::path::RelPath;
use crate::staging::StagingArea;

/// Per-run state handed to every stage instead of living in globals.
/// Dropping it prunes the staging area, whatever happened before.
pub struct RunContext {
    dest: PathBuf,
    pub staging: StagingArea,
    pub ledger: RunLedger,
}

impl RunContext {
    pub fn new(dest: &Path) -> Self {
        Self {
            dest: dest.to_path_buf(),
            staging: StagingArea::new(dest),
            ledger: RunLedger::new(),
        }
    }

    pub fn final_path(&self, rel: &RelPath) -> PathBuf {
        rel.join_under(&self.dest)
    }

    pub fn finish(mut self) -> RunLedger {
        std::mem::take(&mut self.ledger)
    }
}

impl Drop for RunContext {
    fn drop(&mut self) {
        let removed = self.staging.prune();
        debug!(removed, root = %self.staging.root().display(), "pruned staging area");
    }
}
