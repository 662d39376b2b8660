use crate::config::ArchiveNaming;
use crate::domain::ArchiveFile;
use crate::error::{Result, WinbakError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parse the sequence number out of `<prefix> <N><suffix>`, ignoring ASCII case.
pub fn parse_sequence(file_name: &str, naming: &ArchiveNaming) -> Option<u64> {
    // `get` rather than slicing: a multi-byte char may straddle any boundary
    let prefix = file_name.get(..naming.prefix.len())?;
    if !prefix.eq_ignore_ascii_case(&naming.prefix) {
        return None;
    }
    let rest = file_name.get(naming.prefix.len()..)?.strip_prefix(' ')?;
    let digits_len = rest.len().checked_sub(naming.suffix.len())?;
    let (digits, suffix) = (rest.get(..digits_len)?, rest.get(digits_len..)?);
    if !suffix.eq_ignore_ascii_case(&naming.suffix) {
        return None;
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Filter `paths` to archives of the set and order them by sequence number.
///
/// Non-matching names are dropped silently. Two archives with the same number
/// make the order undefined and abort the run.
pub fn resolve_archive_set<P: AsRef<Path>>(
    paths: &[P],
    naming: &ArchiveNaming,
) -> Result<Vec<ArchiveFile>> {
    let mut seen: HashMap<u64, PathBuf> = HashMap::new();
    let mut out = Vec::new();

    for p in paths {
        let path = p.as_ref();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(seq) = parse_sequence(name, naming) else {
            debug!(path = %path.display(), "ignoring non-matching archive name");
            continue;
        };
        if let Some(prev) = seen.insert(seq, path.to_path_buf()) {
            return Err(WinbakError::Configuration(format!(
                "archives {} and {} share sequence number {seq}",
                prev.display(),
                path.display()
            )));
        }
        out.push(ArchiveFile {
            path: path.to_path_buf(),
            seq,
        });
    }

    out.sort_by_key(|a| a.seq);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming() -> ArchiveNaming {
        ArchiveNaming::default()
    }

    #[test]
    fn parses_numbers_case_insensitively() {
        let n = naming();
        assert_eq!(parse_sequence("Backup files 1.zip", &n), Some(1));
        assert_eq!(parse_sequence("BACKUP FILES 007.ZIP", &n), Some(7));
        assert_eq!(parse_sequence("backup files 12.Zip", &n), Some(12));
    }

    #[test]
    fn rejects_other_names() {
        let n = naming();
        for name in [
            "Backup files.zip",
            "Backup files .zip",
            "Backup files 1a.zip",
            "Backup files  1.zip",
            "Backup files 1.7z",
            "Backup files -1.zip",
            "notes.txt",
            "Backup",
        ] {
            assert_eq!(parse_sequence(name, &n), None, "{name}");
        }
    }

    #[test]
    fn multibyte_names_never_panic() {
        let n = naming();
        for name in [
            "Backup fileé 1.zip",
            "Backup filesé1.zip",
            "Backup files é.zip",
            "Backup files 1é.zip",
            "Backup files 1.zié",
            "Backu\u{1F600} 1.zip",
            "é",
        ] {
            assert_eq!(parse_sequence(name, &n), None, "{name}");
        }
        let out =
            resolve_archive_set(&["/set/Backup fileé 1.zip", "/set/Backup files 1.zip"], &n).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].display_name(), "Backup files 1.zip");
    }

    #[test]
    fn orders_numerically_not_lexically() {
        let input = [
            "/set/Backup files 10.zip",
            "/set/Backup files 2.zip",
            "/set/readme.txt",
            "/set/Backup files 1.zip",
        ];
        let out = resolve_archive_set(&input, &naming()).unwrap();
        let seqs: Vec<u64> = out.iter().map(|a| a.seq).collect();
        assert_eq!(seqs, vec![1, 2, 10]);
        assert_eq!(out[0].display_name(), "Backup files 1.zip");
    }

    #[test]
    fn order_is_independent_of_input_order_and_padding() {
        let a = ["Backup files 03.zip", "Backup files 1.zip", "Backup files 2.zip"];
        let b = ["Backup files 2.zip", "Backup files 03.zip", "Backup files 1.zip"];
        let ra: Vec<u64> = resolve_archive_set(&a, &naming()).unwrap().iter().map(|x| x.seq).collect();
        let rb: Vec<u64> = resolve_archive_set(&b, &naming()).unwrap().iter().map(|x| x.seq).collect();
        assert_eq!(ra, vec![1, 2, 3]);
        assert_eq!(ra, rb);
    }

    #[test]
    fn duplicate_sequence_is_configuration_error() {
        let input = ["Backup files 1.zip", "Backup files 01.zip"];
        let err = resolve_archive_set(&input, &naming()).unwrap_err();
        assert!(matches!(err, WinbakError::Configuration(_)));
    }

    #[test]
    fn custom_naming() {
        let n = ArchiveNaming {
            prefix: "Sicherungsdateien".into(),
            suffix: ".zip".into(),
        };
        assert_eq!(parse_sequence("Sicherungsdateien 4.zip", &n), Some(4));
        assert_eq!(parse_sequence("Backup files 4.zip", &n), None);
    }
}
