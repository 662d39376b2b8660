use super::ConcatStrategy;
use crate::error::{Result, WinbakError};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// The host's bulk concatenation tool: `copy /b` on Windows, `cat` elsewhere.
/// Parts are always passed as an explicit ordered list, never a wildcard.
pub struct HostConcat;

impl ConcatStrategy for HostConcat {
    fn name(&self) -> &'static str {
        if cfg!(windows) { "copy /b" } else { "cat" }
    }

    fn concat(&self, parts: &[PathBuf], out: &Path) -> Result<()> {
        let output = run_tool(parts, out)?;
        if output.status.success() {
            return Ok(());
        }
        Err(WinbakError::MergeTool(format!(
            "{} exited with {}: {}",
            self.name(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

#[cfg(windows)]
fn run_tool(parts: &[PathBuf], out: &Path) -> Result<Output> {
    use std::os::windows::process::CommandExt;

    // copy /b "p1"+"p2"+... "out"
    let list = parts
        .iter()
        .map(|p| format!("\"{}\"", p.display()))
        .collect::<Vec<_>>()
        .join("+");
    Command::new("cmd")
        .arg("/c")
        .raw_arg(format!("copy /y /b {list} \"{}\"", out.display()))
        .stdin(Stdio::null())
        .output()
        .map_err(|e| WinbakError::MergeTool(format!("cannot run cmd: {e}")))
}

#[cfg(not(windows))]
fn run_tool(parts: &[PathBuf], out: &Path) -> Result<Output> {
    let sink = std::fs::File::create(out)?;
    Command::new("cat")
        .args(parts)
        .stdin(Stdio::null())
        .stdout(Stdio::from(sink))
        .output()
        .map_err(|e| WinbakError::MergeTool(format!("cannot run cat: {e}")))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn cat_joins_parts() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.part_0001");
        let b = tmp.path().join("a.part_0002");
        std::fs::write(&a, b"abc").unwrap();
        std::fs::write(&b, b"def").unwrap();
        let out = tmp.path().join("a.merge_tmp");
        HostConcat.concat(&[a, b], &out).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"abcdef");
    }

    #[test]
    fn missing_part_is_tool_failure() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        let err = HostConcat
            .concat(&[tmp.path().join("nope.part_0001")], &out)
            .unwrap_err();
        assert!(matches!(err, WinbakError::MergeTool(_)));
    }
}
