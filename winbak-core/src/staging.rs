use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::StagedFragment;
use crate::error::Result;
use crate::path::RelPath;

pub const STAGING_DIR_NAME: &str = ".staging";
pub const PART_MARKER: &str = ".part_";
pub const MERGE_TMP_SUFFIX: &str = ".merge_tmp";

/// `<dest>/.staging`, mirroring the destination tree with `.part_NNNN` files.
#[derive(Clone, Debug)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(dest: &Path) -> Self {
        Self {
            root: dest.join(STAGING_DIR_NAME),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fragment_path(&self, rel: &RelPath, index: u32) -> PathBuf {
        self.dir_for(rel)
            .join(format!("{}{PART_MARKER}{index:04}", rel.file_name()))
    }

    pub fn merge_temp_path(&self, rel: &RelPath) -> PathBuf {
        self.dir_for(rel)
            .join(format!("{}{MERGE_TMP_SUFFIX}", rel.file_name()))
    }

    /// Fragment path with its directory created; the root appears on first use.
    pub fn prepare_fragment(&self, rel: &RelPath, index: u32) -> Result<PathBuf> {
        let dir = self.dir_for(rel);
        fs::create_dir_all(&dir)?;
        Ok(self.fragment_path(rel, index))
    }

    fn dir_for(&self, rel: &RelPath) -> PathBuf {
        let mut dir = self.root.clone();
        if let Some(parent) = rel.parent() {
            for comp in parent.split('/') {
                dir.push(comp);
            }
        }
        dir
    }

    pub fn has_fragments(&self) -> Result<bool> {
        Ok(!self.scan_fragments()?.is_empty())
    }

    /// Rebuild fragment records from `.part_NNNN` files left by an earlier run.
    pub fn scan_fragments(&self) -> Result<Vec<StagedFragment>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                warn!(path = %entry.path().display(), "skipping non UTF-8 staged file");
                continue;
            };
            let Some((name, index)) = parse_part_name(file_name) else {
                continue;
            };
            let Some(rel) = rel_from_staged(&self.root, entry.path(), name) else {
                warn!(path = %entry.path().display(), "skipping staged file with unusable path");
                continue;
            };
            out.push(StagedFragment {
                rel,
                index,
                path: entry.path().to_path_buf(),
                size: entry.metadata().map_err(std::io::Error::from)?.len(),
                archive: None,
            });
        }
        Ok(out)
    }

    /// Remove every directory left empty, bottom-up, the root included.
    /// Directories still holding fragments keep themselves and their ancestors.
    pub fn prune(&self) -> usize {
        if !self.root.is_dir() {
            return 0;
        }
        let mut removed = 0;
        for entry in WalkDir::new(&self.root)
            .contents_first(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_dir() {
                continue;
            }
            let empty = fs::read_dir(entry.path())
                .map(|mut it| it.next().is_none())
                .unwrap_or(false);
            if !empty {
                continue;
            }
            match fs::remove_dir(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => debug!(path = %entry.path().display(), error = %e, "cannot remove staging dir"),
            }
        }
        removed
    }
}

/// Split `name.ext.part_0003` into `("name.ext", 3)`.
pub fn parse_part_name(file_name: &str) -> Option<(&str, u32)> {
    let (name, digits) = file_name.rsplit_once(PART_MARKER)?;
    if name.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((name, digits.parse().ok()?))
}

fn rel_from_staged(root: &Path, path: &Path, name: &str) -> Option<RelPath> {
    let dir = path.parent()?.strip_prefix(root).ok()?;
    let mut comps = Vec::new();
    for c in dir.components() {
        comps.push(c.as_os_str().to_str()?);
    }
    comps.push(name);
    Some(RelPath::from_components(comps))
}
