use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::concat::{ConcatStrategy, HostConcat, StreamConcat};
use crate::config::RunOptions;
use crate::context::RunContext;
use crate::domain::{MergeOutcome, StagedFragment};
use crate::error::{Result, WinbakError};
use crate::group::MergeGroup;

pub const FINAL_EXISTS: &str = "final path already exists";

/// Turns merge groups into final files.
///
/// The final path is only ever created by the last step, a no-clobber move of
/// an output whose size has already been checked. Nothing is deleted unless
/// that move succeeded.
pub struct MergeEngine {
    primary: Option<Box<dyn ConcatStrategy>>,
    fallback: Box<dyn ConcatStrategy>,
}

impl MergeEngine {
    pub fn new(primary: Option<Box<dyn ConcatStrategy>>, fallback: Box<dyn ConcatStrategy>) -> Self {
        Self { primary, fallback }
    }

    pub fn from_options(opts: &RunOptions) -> Self {
        let primary: Option<Box<dyn ConcatStrategy>> = if opts.host_concat {
            Some(Box::new(HostConcat))
        } else {
            None
        };
        Self::new(primary, Box::new(StreamConcat))
    }

    pub fn merge_group(&self, ctx: &mut RunContext, group: &MergeGroup) -> MergeOutcome {
        let outcome = self.merge(ctx, group);
        match &outcome {
            MergeOutcome::Merged { path, parts, bytes } => {
                info!(path = %path.display(), parts, bytes, "merged");
            }
            MergeOutcome::Skipped { path, reason } => {
                warn!(path = %path.display(), reason = %reason, "skipped");
            }
            MergeOutcome::Failed { path, reason } => {
                warn!(path = %path.display(), reason = %reason, "merge failed");
            }
        }
        ctx.ledger.record_outcome(&outcome);
        outcome
    }

    fn merge(&self, ctx: &RunContext, group: &MergeGroup) -> MergeOutcome {
        let path = ctx.final_path(&group.rel);
        if path_exists(&path) {
            return MergeOutcome::Skipped {
                path,
                reason: FINAL_EXISTS.to_string(),
            };
        }

        let result = match group.fragments.as_slice() {
            [] => Err(WinbakError::Extraction("empty merge group".into())),
            [single] => commit_single(single, &path),
            _ => self.commit_multi(ctx, group, &path),
        };

        match result {
            Ok(()) => MergeOutcome::Merged {
                path,
                parts: group.part_count(),
                bytes: group.total_bytes(),
            },
            Err(WinbakError::OverwriteConflict(_)) => MergeOutcome::Skipped {
                path,
                reason: FINAL_EXISTS.to_string(),
            },
            Err(e) => MergeOutcome::Failed {
                path,
                reason: e.to_string(),
            },
        }
    }

    fn commit_multi(&self, ctx: &RunContext, group: &MergeGroup, final_path: &Path) -> Result<()> {
        let expected = group.total_bytes();
        let parts: Vec<PathBuf> = group.fragments.iter().map(|f| f.path.clone()).collect();
        let tmp = ctx.staging.merge_temp_path(&group.rel);

        self.build_output(&parts, &tmp, expected)?;
        if let Err(e) = commit_no_clobber(&tmp, final_path) {
            discard(&tmp);
            return Err(e);
        }

        for f in &group.fragments {
            if let Err(e) = fs::remove_file(&f.path) {
                warn!(path = %f.path.display(), error = %e, "cannot remove merged fragment");
            }
        }
        Ok(())
    }

    /// Primary strategy first; any failure or wrong size falls through to the
    /// fallback. A wrong size from the fallback leaves `tmp` in place.
    fn build_output(&self, parts: &[PathBuf], tmp: &Path, expected: u64) -> Result<()> {
        if let Some(primary) = &self.primary {
            discard(tmp);
            match primary.concat(parts, tmp).and_then(|()| file_len(tmp)) {
                Ok(actual) if actual == expected => return Ok(()),
                Ok(actual) => warn!(
                    tool = primary.name(),
                    expected,
                    actual,
                    "size mismatch, falling back to {}",
                    self.fallback.name()
                ),
                Err(e) => warn!(
                    tool = primary.name(),
                    error = %e,
                    "concatenation failed, falling back to {}",
                    self.fallback.name()
                ),
            }
        }

        discard(tmp);
        if let Err(e) = self.fallback.concat(parts, tmp) {
            discard(tmp);
            return Err(e);
        }
        let actual = file_len(tmp)?;
        if actual != expected {
            return Err(WinbakError::SizeMismatch {
                path: tmp.to_path_buf(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

/// Single part: move it, no concatenation at all.
fn commit_single(frag: &StagedFragment, final_path: &Path) -> Result<()> {
    let on_disk = file_len(&frag.path)?;
    if on_disk != frag.size {
        return Err(WinbakError::SizeMismatch {
            path: frag.path.clone(),
            expected: frag.size,
            actual: on_disk,
        });
    }

    commit_no_clobber(&frag.path, final_path)?;

    let actual = file_len(final_path)?;
    if actual != frag.size {
        // hand the fragment back to the staging area
        fs::rename(final_path, &frag.path)?;
        return Err(WinbakError::SizeMismatch {
            path: final_path.to_path_buf(),
            expected: frag.size,
            actual,
        });
    }
    Ok(())
}

/// Move `src` to `dst` without ever replacing an existing `dst`.
///
/// A hard link fails atomically on an existing target; filesystems without
/// hard links (FAT, exFAT) get a check-then-rename instead.
pub fn commit_no_clobber(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::hard_link(src, dst) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(src) {
                warn!(path = %src.display(), error = %e, "cannot unlink committed source");
            }
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(WinbakError::OverwriteConflict(dst.to_path_buf()))
        }
        Err(e) => {
            debug!(error = %e, "hard link unavailable, renaming");
            if path_exists(dst) {
                return Err(WinbakError::OverwriteConflict(dst.to_path_buf()));
            }
            fs::rename(src, dst)?;
            Ok(())
        }
    }
}

fn path_exists(p: &Path) -> bool {
    fs::symlink_metadata(p).is_ok()
}

fn file_len(p: &Path) -> Result<u64> {
    Ok(fs::metadata(p)?.len())
}

fn discard(p: &Path) {
    match fs::remove_file(p) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => debug!(path = %p.display(), error = %e, "cannot remove temp output"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_clobber_refuses_existing_target() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("out/dst");
        fs::write(&src, b"new").unwrap();
        fs::create_dir_all(dst.parent().unwrap()).unwrap();
        fs::write(&dst, b"old").unwrap();

        let err = commit_no_clobber(&src, &dst).unwrap_err();
        assert!(matches!(err, WinbakError::OverwriteConflict(_)));
        assert_eq!(fs::read(&dst).unwrap(), b"old");
        assert!(src.exists());
    }

    #[test]
    fn no_clobber_moves_and_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("a/b/dst");
        fs::write(&src, b"payload").unwrap();
        commit_no_clobber(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
    }
}
