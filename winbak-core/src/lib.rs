#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;
pub mod path;

pub mod util {
    pub mod copy;
}

pub mod codec;
pub mod decode;
pub mod resolve;

pub mod source;
pub mod source_zip;

pub mod concat;
pub mod context;
pub mod group;
pub mod ledger;
pub mod merge;
pub mod stage;
pub mod staging;

pub mod reconstruct;

// Re-exports: stable API surface
pub use config::{ArchiveNaming, RunOptions};
pub use domain::{ArchiveFile, ArchivedEntry, MergeOutcome, StagedFragment};
pub use error::{Result, WinbakError};
pub use ledger::{LedgerRecord, RecordKind, RunLedger};
pub use reconstruct::Reconstructor;
pub use resolve::resolve_archive_set;
