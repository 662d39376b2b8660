use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::macros::format_description;
use winbak_core::{RecordKind, RunLedger};

pub fn summary_file_name(now: OffsetDateTime) -> std::io::Result<String> {
    let stamp = now
        .format(format_description!("[year][month][day]T[hour][minute][second]Z"))
        .map_err(std::io::Error::other)?;
    Ok(format!("winbak_extract_{stamp}.txt"))
}

pub fn render(ledger: &RunLedger) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "Windows Backup Extract Summary");
    let _ = writeln!(s, "ZIPs processed: {}", ledger.archives_processed());
    let _ = writeln!(s, "Part files extracted: {}", ledger.fragments_staged());
    let _ = writeln!(
        s,
        "Files merged: {}",
        ledger.of_kind(RecordKind::Merged).count()
    );
    s.push('\n');

    // single-part outputs are plain moves, only joined files are listed
    let _ = writeln!(s, "Merged outputs:");
    for r in ledger.of_kind(RecordKind::Merged) {
        if r.parts.unwrap_or(0) > 1 {
            let _ = writeln!(
                s,
                "- {} (parts={}, bytes={})",
                display(&r.path),
                r.parts.unwrap_or(0),
                r.bytes.unwrap_or(0)
            );
        }
    }
    s.push('\n');

    let skipped: Vec<_> = ledger.of_kind(RecordKind::Skipped).collect();
    if !skipped.is_empty() {
        let _ = writeln!(s, "Skipped (final already exists):");
        for r in skipped {
            let _ = writeln!(s, "- {}", display(&r.path));
        }
        s.push('\n');
    }

    let failures: Vec<_> = ledger
        .errors()
        .filter(|r| r.kind != RecordKind::Skipped)
        .collect();
    if !failures.is_empty() {
        let _ = writeln!(s, "Errors:");
        for r in failures {
            match (r.kind, &r.archive, &r.entry) {
                (RecordKind::ExtractionError, Some(archive), Some(entry)) => {
                    let _ = writeln!(s, "- {archive} [{entry}]: {}", r.reason);
                }
                (RecordKind::ExtractionError, Some(archive), None) => {
                    let _ = writeln!(s, "- Failed to extract from {archive}: {}", r.reason);
                }
                _ => {
                    let _ = writeln!(s, "- Failed to merge {}: {}", display(&r.path), r.reason);
                }
            }
        }
        s.push('\n');
    }
    s
}

pub fn write_summary(dest: &Path, ledger: &RunLedger) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dest)?;
    let path = dest.join(summary_file_name(OffsetDateTime::now_utc())?);
    fs::write(&path, render(ledger))?;
    Ok(path)
}

fn display(p: &Option<PathBuf>) -> String {
    p.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "?".to_string())
}
