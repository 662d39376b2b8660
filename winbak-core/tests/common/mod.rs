#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use walkdir::WalkDir;
use winbak_core::concat::{ConcatStrategy, StreamConcat};
use winbak_core::source::{ArchiveOpener, ArchiveSource};
use winbak_core::{ArchivedEntry, Result, WinbakError};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut zw = ZipWriter::new(file);
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, body) in entries {
        if name.ends_with('/') {
            zw.add_directory(*name, opts).unwrap();
        } else {
            zw.start_file(*name, opts).unwrap();
            zw.write_all(body).unwrap();
        }
    }
    zw.finish().unwrap();
}

pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add((i % 97) as u8)).collect()
}

/// Relative paths of every file under `root`, sorted.
pub fn files_under(root: &Path) -> Vec<String> {
    if !root.exists() {
        return Vec::new();
    }
    let mut out: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    out.sort();
    out
}

pub fn read(p: impl AsRef<Path>) -> Vec<u8> {
    fs::read(p).unwrap()
}

/// Counts invocations, then delegates to the streaming strategy.
pub struct RecordingConcat {
    pub calls: Rc<Cell<usize>>,
}

impl ConcatStrategy for RecordingConcat {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn concat(&self, parts: &[PathBuf], out: &Path) -> Result<()> {
        self.calls.set(self.calls.get() + 1);
        StreamConcat.concat(parts, out)
    }
}

pub struct FailingConcat;

impl ConcatStrategy for FailingConcat {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn concat(&self, _parts: &[PathBuf], _out: &Path) -> Result<()> {
        Err(WinbakError::MergeTool("tool unavailable".into()))
    }
}

/// Claims success but only writes the first part.
pub struct FirstPartOnly;

impl ConcatStrategy for FirstPartOnly {
    fn name(&self) -> &'static str {
        "first-part-only"
    }

    fn concat(&self, parts: &[PathBuf], out: &Path) -> Result<()> {
        fs::copy(&parts[0], out)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct MemEntry {
    pub raw_name: Vec<u8>,
    pub utf8: bool,
    pub declared: u64,
    pub body: Vec<u8>,
}

impl MemEntry {
    pub fn new(raw_name: &[u8], utf8: bool, body: &[u8]) -> Self {
        Self {
            raw_name: raw_name.to_vec(),
            utf8,
            declared: body.len() as u64,
            body: body.to_vec(),
        }
    }
}

pub struct MemSource {
    entries: Vec<MemEntry>,
}

impl ArchiveSource for MemSource {
    fn entries(&mut self) -> Result<Vec<ArchivedEntry>> {
        Ok(self
            .entries
            .iter()
            .enumerate()
            .map(|(index, e)| ArchivedEntry {
                index,
                raw_name: e.raw_name.clone(),
                size: e.declared,
            })
            .collect())
    }

    fn name_is_utf8(&mut self, index: usize) -> Result<bool> {
        Ok(self.entries[index].utf8)
    }

    fn open_entry(&mut self, index: usize) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(&self.entries[index].body[..]))
    }
}

/// In-memory archives keyed by file name; the paths need not exist on disk.
#[derive(Default)]
pub struct MemOpener {
    pub archives: HashMap<String, Vec<MemEntry>>,
}

impl ArchiveOpener for MemOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveSource>> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let entries = self
            .archives
            .get(&name)
            .cloned()
            .ok_or_else(|| WinbakError::Extraction(format!("no such archive: {name}")))?;
        Ok(Box::new(MemSource { entries }))
    }
}
