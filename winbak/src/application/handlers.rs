use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info, warn};
use winbak_core::config::ArchiveNaming;
use winbak_core::decode::NameDecoder;
use winbak_core::error::{Result, WinbakError};
use winbak_core::path::RelPath;
use winbak_core::source::{ArchiveOpener, ArchiveSource};
use winbak_core::source_zip::ZipOpener;
use winbak_core::{Reconstructor, RunLedger, RunOptions, resolve_archive_set};

use crate::application::discover::jobs_for;
use crate::presentation::cli::SourceArgs;
use crate::presentation::summary;

fn naming_with(prefix: String) -> ArchiveNaming {
    ArchiveNaming {
        prefix,
        ..ArchiveNaming::default()
    }
}

fn exit_for(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Summary file, optional JSON, one log line. Returns whether the run had errors.
fn report(dest: &std::path::Path, ledger: &RunLedger, json: bool) -> Result<bool> {
    match summary::write_summary(dest, ledger) {
        Ok(path) => info!(summary = %path.display(), "wrote summary"),
        Err(e) => warn!(error = %e, "could not write summary file"),
    }
    if json {
        let doc = serde_json::json!({ "dest": dest, "ledger": ledger });
        let line = serde_json::to_string(&doc).map_err(std::io::Error::from)?;
        println!("{line}");
    }
    let errors = ledger.errors().count();
    info!(
        archives = ledger.archives_processed(),
        fragments = ledger.fragments_staged(),
        errors,
        "done"
    );
    Ok(errors > 0)
}

pub fn handle_extract(
    source: SourceArgs,
    dest: Option<PathBuf>,
    encoding: Option<String>,
    prefix: String,
    no_host_concat: bool,
    json: bool,
) -> Result<ExitCode> {
    let naming = naming_with(prefix);
    let jobs = jobs_for(&source, dest.as_deref(), &naming)?;
    if jobs.iter().all(|j| j.archives.is_empty()) {
        return Err(WinbakError::Configuration(format!(
            "no archives matching \"{} N{}\"",
            naming.prefix, naming.suffix
        )));
    }

    let mut failed = false;
    for job in jobs {
        let options = RunOptions {
            dest: job.dest.clone(),
            encoding: encoding.clone(),
            naming: naming.clone(),
            host_concat: !no_host_concat,
        };
        match Reconstructor::new(options).run(&job.archives) {
            Ok(ledger) => failed |= report(&job.dest, &ledger, json)?,
            Err(e) => {
                // a bad set does not stop its siblings
                error!(dest = %job.dest.display(), error = %e, "run aborted");
                failed = true;
            }
        }
    }
    Ok(exit_for(failed))
}

pub fn handle_resume(dest: PathBuf, no_host_concat: bool, json: bool) -> Result<ExitCode> {
    let options = RunOptions::new(&dest).with_host_concat(!no_host_concat);
    let ledger = Reconstructor::new(options).resume()?;
    let failed = report(&dest, &ledger, json)?;
    Ok(exit_for(failed))
}

pub fn handle_plan(source: SourceArgs, encoding: Option<String>, prefix: String) -> Result<ExitCode> {
    let naming = naming_with(prefix);
    let decoder = NameDecoder::from_label(encoding.as_deref())?;
    let jobs = jobs_for(&source, None, &naming)?;
    let mut failed = false;

    for job in jobs {
        println!("{}", job.dest.display());
        let set = resolve_archive_set(&job.archives, &naming)?;
        // parts seen so far per case-folded path, as staging would number them
        let mut seen: HashMap<String, u32> = HashMap::new();
        for archive in &set {
            println!("  [{}] {}", archive.seq, archive.display_name());
            let mut src = match ZipOpener.open(&archive.path) {
                Ok(s) => s,
                Err(e) => {
                    println!("    !! {e}");
                    failed = true;
                    continue;
                }
            };
            let entries = match src.entries() {
                Ok(entries) => entries,
                Err(e) => {
                    println!("    !! {e}");
                    failed = true;
                    continue;
                }
            };
            for entry in entries {
                if entry.is_dir() {
                    continue;
                }
                let rel = src
                    .name_is_utf8(entry.index)
                    .and_then(|utf8| decoder.decode(&entry.raw_name, utf8))
                    .and_then(|name| RelPath::from_entry_name(&name));
                match rel {
                    Ok(rel) => {
                        let n = seen.entry(rel.key()).or_insert(0);
                        *n += 1;
                        println!("    {rel}  {} bytes  part {}", entry.size, n);
                    }
                    Err(e) => {
                        println!("    !! {}: {e}", entry.lossy_name());
                        failed = true;
                    }
                }
            }
        }
        let split = seen.values().filter(|n| **n > 1).count();
        println!("  {} file(s), {split} split across archives", seen.len());
    }
    Ok(exit_for(failed))
}
