use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use zip::ZipArchive;

use crate::domain::ArchivedEntry;
use crate::error::{Result, WinbakError};
use crate::source::{ArchiveOpener, ArchiveSource};

const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
/// General-purpose bit 11: name and comment are UTF-8.
const FLAG_UTF8: u16 = 1 << 11;

pub struct ZipOpener;

impl ArchiveOpener for ZipOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveSource>> {
        Ok(Box::new(ZipSource::open(path)?))
    }
}

pub struct ZipSource {
    archive: ZipArchive<File>,
    // Separate handle so header probes never move the archive's cursor.
    headers: File,
    // indices whose record could not be opened while listing, with the reason
    unreadable: HashMap<usize, String>,
}

impl ZipSource {
    pub fn open(path: &Path) -> Result<Self> {
        let archive = ZipArchive::new(File::open(path)?)?;
        let headers = File::open(path)?;
        Ok(Self {
            archive,
            headers,
            unreadable: HashMap::new(),
        })
    }

    fn local_flags(&mut self, header_start: u64) -> Result<u16> {
        let mut buf = [0u8; 8];
        self.headers.seek(SeekFrom::Start(header_start))?;
        self.headers.read_exact(&mut buf)?;
        let sig = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if sig != LOCAL_HEADER_SIG {
            return Err(WinbakError::Extraction(format!(
                "bad local header signature at offset {header_start}"
            )));
        }
        Ok(u16::from_le_bytes([buf[6], buf[7]]))
    }
}

impl ArchiveSource for ZipSource {
    fn entries(&mut self) -> Result<Vec<ArchivedEntry>> {
        let mut out = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            match self.archive.by_index_raw(index) {
                Ok(f) => out.push(ArchivedEntry {
                    index,
                    raw_name: f.name_raw().to_vec(),
                    size: f.size(),
                }),
                Err(e) => {
                    // listed anyway so the failure is charged to this entry alone
                    self.unreadable.insert(index, e.to_string());
                    out.push(ArchivedEntry {
                        index,
                        raw_name: format!("<entry {index}>").into_bytes(),
                        size: 0,
                    });
                }
            }
        }
        Ok(out)
    }

    fn name_is_utf8(&mut self, index: usize) -> Result<bool> {
        if let Some(reason) = self.unreadable.get(&index) {
            return Err(WinbakError::Extraction(reason.clone()));
        }
        let header_start = self.archive.by_index_raw(index)?.header_start();
        Ok(self.local_flags(header_start)? & FLAG_UTF8 != 0)
    }

    fn open_entry(&mut self, index: usize) -> Result<Box<dyn Read + '_>> {
        let f = self.archive.by_index(index)?;
        // Box to erase the zip reader type
        Ok(Box::new(f))
    }
}
