pub mod acquire;
pub mod config;
pub mod date_expr;
pub mod decode;
pub mod download;
pub mod error;
pub mod ingest;
pub mod load_config;
pub mod populate;
pub mod storage;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use acquire::{ArchiveSource, SourceSelection};
use ingest::{ingest, IngestOptions};
use load_config::load_config;

#[derive(Parser)]
#[clap(
    name = "archive-ingest",
    version,
    about = "Load hourly timeline-archive event records into the document store"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest archives from exactly one source into the event store
    Ingest {
        /// Direct URL of the archive payload
        #[clap(long)]
        url: Option<String>,

        /// Archive date or range, e.g. 2012-04-{05..25}-{2..18}
        #[clap(long)]
        date: Option<String>,

        /// Directory already holding *.json.gz archives; used as-is
        #[clap(long)]
        source_dir: Option<PathBuf>,

        /// ZIP container of *.json.gz archives to extract
        #[clap(long)]
        zip: Option<PathBuf>,

        /// Archive files: absolute paths or dir,file1[,file2...] clusters
        #[clap(long, num_args = 1..)]
        files: Option<Vec<String>>,

        /// Working directory override for resolved archives
        #[clap(long)]
        workdir: Option<PathBuf>,

        /// Delete the working directory after processing
        #[clap(long)]
        delete_after: bool,

        /// Optional YAML config file for store and template settings
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ingest {
            url,
            date,
            source_dir,
            zip,
            files,
            workdir,
            delete_after,
            config,
        } => {
            let config = load_config(config)?;
            let source = ArchiveSource::select(SourceSelection {
                url,
                date,
                source_dir,
                zip,
                files,
            })?;
            println!("Ingest starting...");
            let report = ingest(
                &config,
                source,
                IngestOptions {
                    workdir,
                    delete_after,
                },
            )
            .await?;
            println!("Ingest complete.\nReport:");
            println!("{report:#?}");
            Ok(())
        }
    }
}
