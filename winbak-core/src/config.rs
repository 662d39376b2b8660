use std::path::PathBuf;

pub const DEFAULT_ARCHIVE_PREFIX: &str = "Backup files";
pub const DEFAULT_ARCHIVE_SUFFIX: &str = ".zip";

/// Archive names look like `<prefix> <N><suffix>`, compared case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveNaming {
    pub prefix: String,
    pub suffix: String,
}

impl Default for ArchiveNaming {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
            suffix: DEFAULT_ARCHIVE_SUFFIX.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Root of the reconstructed tree; `.staging` lives directly under it.
    pub dest: PathBuf,
    /// Fallback codec label for entries without the UTF-8 flag (e.g. "cp932").
    pub encoding: Option<String>,
    pub naming: ArchiveNaming,
    /// Try the host's bulk concatenation tool before streaming parts manually.
    pub host_concat: bool,
}

impl RunOptions {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self {
            dest: dest.into(),
            encoding: None,
            naming: ArchiveNaming::default(),
            host_concat: true,
        }
    }

    pub fn with_encoding(mut self, encoding: Option<String>) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_host_concat(mut self, enabled: bool) -> Self {
        self.host_concat = enabled;
        self
    }
}
