use std::path::Path;

use tracing::{info, warn};

use crate::config::RunOptions;
use crate::context::RunContext;
use crate::decode::NameDecoder;
use crate::domain::ArchiveFile;
use crate::error::{Result, WinbakError};
use crate::group::{MergeGroup, group_fragments};
use crate::ledger::RunLedger;
use crate::merge::MergeEngine;
use crate::resolve::resolve_archive_set;
use crate::source::ArchiveOpener;
use crate::source_zip::ZipOpener;
use crate::stage::FragmentStager;

/// Drives one serial pass: resolve, stage every archive, group, merge.
pub struct Reconstructor {
    options: RunOptions,
    opener: Box<dyn ArchiveOpener>,
    engine: MergeEngine,
}

impl Reconstructor {
    pub fn new(options: RunOptions) -> Self {
        let engine = MergeEngine::from_options(&options);
        Self {
            options,
            opener: Box::new(ZipOpener),
            engine,
        }
    }

    pub fn with_opener(mut self, opener: Box<dyn ArchiveOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn with_engine(mut self, engine: MergeEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Full run over `archives`. Only configuration problems return `Err`;
    /// everything else lands in the ledger.
    pub fn run<P: AsRef<Path>>(&self, archives: &[P]) -> Result<RunLedger> {
        let set = resolve_archive_set(archives, &self.options.naming)?;
        let decoder = NameDecoder::from_label(self.options.encoding.as_deref())?;

        let mut ctx = RunContext::new(&self.options.dest);
        if ctx.staging.has_fragments()? {
            return Err(WinbakError::Configuration(format!(
                "{} holds fragments from an earlier run; resume it or remove it first",
                ctx.staging.root().display()
            )));
        }

        info!(
            archives = set.len(),
            dest = %self.options.dest.display(),
            "reconstructing backup set"
        );
        let mut stager = FragmentStager::new(decoder);
        for archive in &set {
            self.stage_archive(&mut ctx, &mut stager, archive);
        }

        let groups = group_fragments(stager.into_fragments());
        self.merge_groups(&mut ctx, &groups);
        Ok(ctx.finish())
    }

    /// Merge whatever an interrupted or partly failed run left in the staging area.
    pub fn resume(&self) -> Result<RunLedger> {
        let mut ctx = RunContext::new(&self.options.dest);
        let fragments = ctx.staging.scan_fragments()?;
        info!(
            fragments = fragments.len(),
            root = %ctx.staging.root().display(),
            "resuming from staging area"
        );
        let groups = group_fragments(fragments);
        self.merge_groups(&mut ctx, &groups);
        Ok(ctx.finish())
    }

    fn stage_archive(&self, ctx: &mut RunContext, stager: &mut FragmentStager, archive: &ArchiveFile) {
        ctx.ledger.note_archive();
        let name = archive.display_name();
        info!(archive = %name, seq = archive.seq, "staging archive");
        match self.opener.open(&archive.path) {
            Ok(mut source) => stager.stage_archive(ctx, archive, source.as_mut()),
            Err(e) => {
                warn!(archive = %name, error = %e, "cannot open archive");
                ctx.ledger.record_extraction_error(&name, None, &e);
            }
        }
    }

    fn merge_groups(&self, ctx: &mut RunContext, groups: &[MergeGroup]) {
        for group in groups {
            self.engine.merge_group(ctx, group);
        }
    }
}
