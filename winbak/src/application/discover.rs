use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;
use winbak_core::config::ArchiveNaming;
use winbak_core::error::{Result, WinbakError};
use winbak_core::resolve::{parse_sequence, resolve_archive_set};

use crate::presentation::cli::SourceArgs;

/// One independent reconstruction: a backup set and where it lands.
#[derive(Debug)]
pub struct Job {
    pub archives: Vec<PathBuf>,
    pub dest: PathBuf,
}

/// Matching archives directly inside `dir`, not recursing.
pub fn archives_in(dir: &Path, naming: &ArchiveNaming) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(WinbakError::Configuration(format!(
            "directory not found: {}",
            dir.display()
        )));
    }
    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .and_then(|n| parse_sequence(n, naming))
            .is_some();
        if matches {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

pub fn jobs_for(
    source: &SourceArgs,
    dest: Option<&Path>,
    naming: &ArchiveNaming,
) -> Result<Vec<Job>> {
    if let Some(dir) = &source.dir {
        let archives = archives_in(dir, naming)?;
        let dest = dest.map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
        return Ok(vec![Job { archives, dest }]);
    }

    if let Some(set) = &source.set {
        if !set.is_dir() {
            return Err(WinbakError::Configuration(format!(
                "directory not found: {}",
                set.display()
            )));
        }
        let mut jobs = Vec::new();
        for entry in WalkDir::new(set)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let archives = archives_in(entry.path(), naming)?;
            if archives.is_empty() {
                debug!(dir = %entry.path().display(), "no backup archives, skipping");
                continue;
            }
            let dest = match dest {
                Some(root) => root.join(entry.file_name()),
                None => entry.path().to_path_buf(),
            };
            jobs.push(Job { archives, dest });
        }
        return Ok(jobs);
    }

    let mut present = Vec::new();
    for f in &source.files {
        if f.is_file() {
            present.push(f.clone());
        } else {
            warn!(path = %f.display(), "not a file, ignoring");
        }
    }
    let resolved = resolve_archive_set(&present, naming)?;
    let Some(first) = resolved.first() else {
        return Ok(Vec::new());
    };
    let dest = match dest {
        Some(d) => d.to_path_buf(),
        None => match first.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        },
    };
    Ok(vec![Job {
        archives: resolved.into_iter().map(|a| a.path).collect(),
        dest,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(p: &Path) {
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, b"").unwrap();
    }

    fn source(dir: Option<&Path>, files: &[PathBuf], set: Option<&Path>) -> SourceArgs {
        SourceArgs {
            dir: dir.map(Path::to_path_buf),
            files: files.to_vec(),
            set: set.map(Path::to_path_buf),
        }
    }

    #[test]
    fn dir_lists_only_matching_archives() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("Backup files 2.zip"));
        touch(&tmp.path().join("backup files 1.ZIP"));
        touch(&tmp.path().join("notes.zip"));
        touch(&tmp.path().join("nested/Backup files 3.zip"));

        let found = archives_in(tmp.path(), &ArchiveNaming::default()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Backup files 2.zip".to_string()));
        assert!(names.contains(&"backup files 1.ZIP".to_string()));
    }

    #[test]
    fn missing_dir_is_a_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let err = archives_in(&tmp.path().join("nope"), &ArchiveNaming::default()).unwrap_err();
        assert!(matches!(err, WinbakError::Configuration(_)));
    }

    #[test]
    fn set_gives_each_child_its_own_destination() {
        let tmp = TempDir::new().unwrap();
        let set = tmp.path().join("set");
        touch(&set.join("pc-a/Backup files 1.zip"));
        touch(&set.join("pc-b/Backup files 1.zip"));
        touch(&set.join("pc-b/Backup files 2.zip"));
        fs::create_dir_all(set.join("empty")).unwrap();

        let jobs = jobs_for(&source(None, &[], Some(&set)), None, &ArchiveNaming::default()).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].dest, set.join("pc-a"));
        assert_eq!(jobs[1].archives.len(), 2);

        let out = tmp.path().join("out");
        let jobs = jobs_for(
            &source(None, &[], Some(&set)),
            Some(&out),
            &ArchiveNaming::default(),
        )
        .unwrap();
        assert_eq!(jobs[1].dest, out.join("pc-b"));
    }

    #[test]
    fn files_default_to_first_archive_parent() {
        let tmp = TempDir::new().unwrap();
        let z2 = tmp.path().join("b/Backup files 2.zip");
        let z1 = tmp.path().join("a/Backup files 1.zip");
        touch(&z1);
        touch(&z2);
        let missing = tmp.path().join("Backup files 3.zip");

        let jobs = jobs_for(
            &source(None, &[z2.clone(), z1.clone(), missing], None),
            None,
            &ArchiveNaming::default(),
        )
        .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].archives, vec![z1, z2]);
        assert_eq!(jobs[0].dest, tmp.path().join("a"));
    }
}
