use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use winbak_core::config::DEFAULT_ARCHIVE_PREFIX;

#[derive(Parser)]
#[command(author, version, about = "Rebuild files split across Windows Backup ZIP sets", long_about = None)]
pub struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the archives come from; exactly one is required.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Folder containing "Backup files N.zip"
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Explicit ZIP paths
    #[arg(long, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Parent folder with several backup folders; each one is its own run
    #[arg(long)]
    pub set: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a backup set and merge split files into the destination
    Extract {
        #[command(flatten)]
        source: SourceArgs,

        /// Destination root (defaults to the folder holding the archives)
        #[arg(long)]
        dest: Option<PathBuf>,

        /// Filename encoding for entries without the UTF-8 flag (e.g. cp932)
        #[arg(long)]
        encoding: Option<String>,

        /// Archive name prefix, followed by " N.zip"
        #[arg(long, default_value = DEFAULT_ARCHIVE_PREFIX)]
        prefix: String,

        /// Skip the host copy tool and always concatenate in-process
        #[arg(long)]
        no_host_concat: bool,

        /// Print the run ledger as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Merge fragments an earlier run left under <DEST>/.staging
    Resume {
        #[arg(long)]
        dest: PathBuf,

        #[arg(long)]
        no_host_concat: bool,

        #[arg(long)]
        json: bool,
    },

    /// Show archive order and decoded entry paths without writing anything
    Plan {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long)]
        encoding: Option<String>,

        #[arg(long, default_value = DEFAULT_ARCHIVE_PREFIX)]
        prefix: String,
    },
}
