use std::io::{Read, Write};

/// Fixed copy buffer: bounds memory no matter how large an entry or part is.
pub const COPY_BUF_SIZE: usize = 1 << 20;

/// Stream `src` into `dst` through `buf`, returning the byte count.
pub fn copy_with_buffer(src: &mut dyn Read, dst: &mut dyn Write, buf: &mut [u8]) -> std::io::Result<u64> {
    let mut total = 0u64;
    loop {
        let n = match src.read(buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        dst.write_all(&buf[..n])?;
        total += n as u64;
    }
    dst.flush()?;
    Ok(total)
}
