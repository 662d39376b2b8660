use serde::Serialize;
use std::path::PathBuf;

use crate::domain::MergeOutcome;
use crate::error::WinbakError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    Merged,
    Skipped,
    Failed,
    ExtractionError,
}

#[derive(Clone, Debug, Serialize)]
pub struct LedgerRecord {
    pub kind: RecordKind,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

impl LedgerRecord {
    pub fn is_error(&self) -> bool {
        self.kind != RecordKind::Merged
    }
}

/// Append-only record of one run, in processing order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunLedger {
    archives_processed: usize,
    fragments_staged: usize,
    records: Vec<LedgerRecord>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_archive(&mut self) {
        self.archives_processed += 1;
    }

    pub fn note_fragment(&mut self) {
        self.fragments_staged += 1;
    }

    pub fn record_outcome(&mut self, outcome: &MergeOutcome) {
        let rec = match outcome {
            MergeOutcome::Merged { path, parts, bytes } => LedgerRecord {
                kind: RecordKind::Merged,
                reason: format!("merged {parts} part(s)"),
                archive: None,
                entry: None,
                path: Some(path.clone()),
                parts: Some(*parts),
                bytes: Some(*bytes),
            },
            MergeOutcome::Skipped { path, reason } => LedgerRecord {
                kind: RecordKind::Skipped,
                reason: reason.clone(),
                archive: None,
                entry: None,
                path: Some(path.clone()),
                parts: None,
                bytes: None,
            },
            MergeOutcome::Failed { path, reason } => LedgerRecord {
                kind: RecordKind::Failed,
                reason: reason.clone(),
                archive: None,
                entry: None,
                path: Some(path.clone()),
                parts: None,
                bytes: None,
            },
        };
        self.records.push(rec);
    }

    /// `entry` is `None` when the archive itself could not be read.
    pub fn record_extraction_error(&mut self, archive: &str, entry: Option<&str>, err: &WinbakError) {
        self.records.push(LedgerRecord {
            kind: RecordKind::ExtractionError,
            reason: err.to_string(),
            archive: Some(archive.to_string()),
            entry: entry.map(str::to_string),
            path: None,
            parts: None,
            bytes: None,
        });
    }

    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    pub fn archives_processed(&self) -> usize {
        self.archives_processed
    }

    pub fn fragments_staged(&self) -> usize {
        self.fragments_staged
    }

    pub fn errors(&self) -> impl Iterator<Item = &LedgerRecord> {
        self.records.iter().filter(|r| r.is_error())
    }

    pub fn of_kind(&self, kind: RecordKind) -> impl Iterator<Item = &LedgerRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    pub fn has_errors(&self) -> bool {
        self.records.iter().any(LedgerRecord::is_error)
    }

    /// Process exit status: non-zero as soon as one error record exists.
    pub fn exit_code(&self) -> i32 {
        if self.has_errors() { 1 } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_flags_errors() {
        let mut ledger = RunLedger::new();
        ledger.record_outcome(&MergeOutcome::Merged {
            path: "/d/a.txt".into(),
            parts: 2,
            bytes: 150,
        });
        assert!(!ledger.has_errors());
        assert_eq!(ledger.exit_code(), 0);

        ledger.record_extraction_error(
            "Backup files 2.zip",
            Some("docs/b.txt"),
            &WinbakError::Extraction("boom".into()),
        );
        ledger.record_outcome(&MergeOutcome::Skipped {
            path: "/d/c.txt".into(),
            reason: "final path already exists".into(),
        });

        let kinds: Vec<RecordKind> = ledger.records().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RecordKind::Merged, RecordKind::ExtractionError, RecordKind::Skipped]
        );
        assert_eq!(ledger.errors().count(), 2);
        assert_eq!(ledger.exit_code(), 1);
        assert_eq!(ledger.records()[0].bytes, Some(150));
    }
}
