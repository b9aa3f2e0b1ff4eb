//! Command-line entrypoint for drive-publish.
//!
//! All protocol logic lives in [`drive_publish_core`]; this module parses
//! arguments, loads the config, prints results and maps the outcome to the
//! process exit status.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use drive_publish_core::graph::GraphClient;
use drive_publish_core::publish::{PublishReport, Publisher, ShareOutcome};

use crate::load_config::{load_config, CliConfig};

/// CLI for drive-publish: upload release artifacts and share the folder.
#[derive(Parser)]
#[clap(
    name = "drive-publish",
    version,
    about = "Upload release artifacts to a OneDrive folder and print an anonymous share link"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload every configured file, then share the destination folder
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Value substituted for {version} in file names and the remote path
        #[clap(long)]
        release_version: Option<String>,
        /// Skip creating the folder share link
        #[clap(long)]
        no_share: bool,
    },
    /// Only create an anonymous view link for the destination folder
    Share {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Value substituted for {version} in the remote path
        #[clap(long)]
        release_version: Option<String>,
    },
}

/// Async CLI logic, shared by `main()` and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish {
            config,
            release_version,
            no_share,
        } => {
            let config = load_config(config, release_version.as_deref())?;
            let share = config.share && !no_share;
            let files = config.files.clone();
            tracing::info!(command = "publish", files = files.len(), share, "Starting publish");

            let mut publisher = connect(config).await?;
            let report = publisher
                .publish(&files, share)
                .await
                .context("Publish run aborted")?;
            print_report(&report);

            if report.is_success() {
                Ok(())
            } else {
                let failed = report.failed_files().count();
                tracing::error!(command = "publish", failed, "Publish finished with failures");
                bail!("Publish finished with failures ({failed} file(s) failed)");
            }
        }
        Commands::Share {
            config,
            release_version,
        } => {
            let config = load_config(config, release_version.as_deref())?;
            tracing::info!(command = "share", remote_folder = %config.publish.remote_folder, "Sharing folder");

            let mut publisher = connect(config).await?;
            let link = publisher
                .share_folder()
                .await
                .context("Folder sharing failed")?;
            println!("Folder share link: {}", link.web_url);
            Ok(())
        }
    }
}

async fn connect(config: CliConfig) -> Result<Publisher<GraphClient>> {
    config.client.trace_loaded();
    let client = GraphClient::new(&config.client).context("Failed to build HTTP client")?;
    Publisher::connect(client, config.identity, config.publish)
        .await
        .context("Failed to acquire access token")
}

fn print_report(report: &PublishReport) {
    for file in &report.files {
        match &file.outcome {
            Ok(item) => println!(
                "Uploaded: {} ({})",
                file.local_path.display(),
                item.id.as_deref().unwrap_or("no id")
            ),
            Err(e) => println!("Upload failed: {}: {e}", file.local_path.display()),
        }
    }
    match &report.share {
        ShareOutcome::Shared(link) => println!("Folder share link: {}", link.web_url),
        ShareOutcome::Failed(e) => println!("Folder sharing failed: {e}"),
        ShareOutcome::Skipped => {}
    }
}
