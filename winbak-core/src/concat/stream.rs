use super::ConcatStrategy;
use crate::error::Result;
use crate::util::copy::{COPY_BUF_SIZE, copy_with_buffer};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Sequential byte-stream concatenation through one fixed buffer.
pub struct StreamConcat;

impl ConcatStrategy for StreamConcat {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn concat(&self, parts: &[PathBuf], out: &Path) -> Result<()> {
        let mut dst = File::create(out)?;
        let mut buf = vec![0u8; COPY_BUF_SIZE];
        for p in parts {
            let mut src = File::open(p)?;
            copy_with_buffer(&mut src, &mut dst, &mut buf)?;
        }
        dst.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn concatenates_in_list_order() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("z.part_0001");
        let b = tmp.path().join("a.part_0002");
        std::fs::write(&a, b"first-").unwrap();
        std::fs::write(&b, b"second").unwrap();
        let out = tmp.path().join("out");
        StreamConcat.concat(&[a, b], &out).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"first-second");
    }
}
