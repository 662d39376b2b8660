use crate::error::{Result, WinbakError};
use crate::staging::STAGING_DIR_NAME;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Archive-relative destination path, `/`-separated and normalized.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RelPath(String);

impl RelPath {
    /// Normalize a decoded entry name into a relative destination path.
    ///
    /// `\` counts as a separator, leading separators and `.` components are
    /// dropped, and a drive designator on the first component loses its colon
    /// (`C:\Users\x` becomes `C/Users/x`). Parent references are rejected, as is
    /// anything that would land inside the staging area.
    pub fn from_entry_name(name: &str) -> Result<Self> {
        let unified = name.replace('\\', "/");
        let mut parts: Vec<&str> = Vec::new();
        for comp in unified.split('/') {
            match comp {
                "" | "." => continue,
                ".." => {
                    return Err(WinbakError::Extraction(format!("unsafe path: {name}")));
                }
                c => parts.push(c),
            }
        }

        let mut out: Vec<String> = parts.iter().map(|s| s.to_string()).collect();
        if let Some(first) = out.first_mut() {
            if is_drive_designator(first) {
                first.truncate(1);
            }
        }
        if out.is_empty() {
            return Err(WinbakError::Extraction(format!("empty path: {name:?}")));
        }
        if out[0].eq_ignore_ascii_case(STAGING_DIR_NAME) {
            return Err(WinbakError::Extraction(format!(
                "path collides with staging area: {name}"
            )));
        }
        Ok(Self(out.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Grouping key: the destination filesystem is case-insensitive.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn file_name(&self) -> &str {
        match self.0.rsplit_once('/') {
            Some((_, name)) => name,
            None => &self.0,
        }
    }

    pub fn parent(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(dir, _)| dir)
    }

    pub fn join_under(&self, root: &Path) -> PathBuf {
        let mut p = root.to_path_buf();
        for comp in self.0.split('/') {
            p.push(comp);
        }
        p
    }

    pub(crate) fn from_components<'a>(comps: impl IntoIterator<Item = &'a str>) -> Self {
        let v: Vec<&str> = comps.into_iter().collect();
        Self(v.join("/"))
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_drive_designator(comp: &str) -> bool {
    let b = comp.as_bytes();
    b.len() == 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}
