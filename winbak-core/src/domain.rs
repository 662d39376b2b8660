// winbak_core/src/domain.rs
use crate::path::RelPath;
use serde::Serialize;
use std::path::PathBuf;

/// One archive of a backup set, ordered by `seq`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveFile {
    pub path: PathBuf,
    pub seq: u64,
}

impl ArchiveFile {
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Central-directory view of one record inside an archive.
#[derive(Clone, Debug)]
pub struct ArchivedEntry {
    pub index: usize,
    /// Stored name bytes, before any separator normalization.
    pub raw_name: Vec<u8>,
    pub size: u64,
}

impl ArchivedEntry {
    pub fn is_dir(&self) -> bool {
        matches!(self.raw_name.last(), Some(b'/') | Some(b'\\'))
    }

    /// Lossy rendering for log and ledger messages only.
    pub fn lossy_name(&self) -> String {
        String::from_utf8_lossy(&self.raw_name).into_owned()
    }
}

#[derive(Clone, Debug)]
pub struct StagedFragment {
    pub rel: RelPath,
    /// 1-based, per grouping key, in discovery order.
    pub index: u32,
    pub path: PathBuf,
    pub size: u64,
    /// Source archive; unknown for fragments recovered from a previous run.
    pub archive: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum MergeOutcome {
    Merged {
        path: PathBuf,
        parts: usize,
        bytes: u64,
    },
    Skipped {
        path: PathBuf,
        reason: String,
    },
    Failed {
        path: PathBuf,
        reason: String,
    },
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, MergeOutcome::Merged { .. })
    }
}
