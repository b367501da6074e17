use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod aggregate;
mod error;
mod ingest;
mod models;
mod report;
mod server;

use models::ColumnMapping;
use server::AppState;

#[derive(Parser)]
#[command(name = "training-progress-dashboard")]
#[command(about = "Department and team training progress dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the upload server
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        /// CSV mapping emails to department and team, loaded once at startup
        #[arg(long)]
        directory: PathBuf,
        #[command(flatten)]
        mapping: MappingArgs,
    },
    /// Render a report from files on disk
    Report {
        #[arg(long)]
        detail: PathBuf,
        #[arg(long)]
        summary: PathBuf,
        #[arg(long)]
        directory: PathBuf,
        #[arg(long, default_value = "report.html")]
        out: PathBuf,
        #[command(flatten)]
        mapping: MappingArgs,
    },
}

#[derive(Args)]
struct MappingArgs {
    /// Zero-based position of the email column in the detail report
    #[arg(long, default_value_t = 2)]
    email_column: usize,
    #[arg(long, default_value = "Progress")]
    progress_column: String,
    #[arg(long, default_value = "activated")]
    activated_column: String,
}

impl From<MappingArgs> for ColumnMapping {
    fn from(args: MappingArgs) -> Self {
        ColumnMapping {
            email_column: args.email_column,
            progress_column: args.progress_column,
            activated_column: args.activated_column,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            directory,
            mapping,
        } => {
            let entries = ingest::load_directory(&directory)
                .context("failed to preload the organizational directory")?;
            info!(entries = entries.len(), "directory loaded from {}", directory.display());

            let state = Arc::new(AppState {
                directory: entries,
                mapping: mapping.into(),
            });
            server::serve(state, port).await?;
        }
        Commands::Report {
            detail,
            summary,
            directory,
            out,
            mapping,
        } => {
            let detail_bytes = std::fs::read(&detail)
                .with_context(|| format!("failed to read {}", detail.display()))?;
            let summary_bytes = std::fs::read(&summary)
                .with_context(|| format!("failed to read {}", summary.display()))?;
            let entries = ingest::load_directory(&directory)
                .context("failed to load the organizational directory")?;

            let page = server::run_report(
                Some(detail_bytes.as_slice()),
                Some(summary_bytes.as_slice()),
                &entries,
                &mapping.into(),
            )?;
            std::fs::write(&out, page)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
