use crate::error::Result;
use std::path::{Path, PathBuf};

/// Writes `parts`, in the given order, into a fresh file at `out`.
///
/// Implementations do not verify; the merge engine checks the output size
/// against the recorded fragment sizes whichever strategy produced it.
pub trait ConcatStrategy {
    fn name(&self) -> &'static str;
    fn concat(&self, parts: &[PathBuf], out: &Path) -> Result<()>;
}

pub mod host;
pub mod stream;

pub use host::HostConcat;
pub use stream::StreamConcat;
