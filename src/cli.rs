//! CLI glue: argument surface and stage orchestration.
//!
//! The binary takes no flags or subcommands; every path is fixed (key file
//! search per [`crate::credentials`], jobs file at
//! [`crate::upload::JOBS_FILE_PATH`], collection
//! [`crate::upload::JOBS_COLLECTION`]). All business logic lives in the
//! stage modules; `run` only wires them together and maps their typed
//! errors onto the process exit contract: any stage failure exits non-zero,
//! per-record upload failures are reported but do not fail the run.

use crate::credentials;
use crate::firestore::FirestoreClient;
use crate::upload::{self, JOBS_FILE_PATH};
use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, warn};

/// CLI for jobs-uploader: publish the local jobs file to the jobs collection.
#[derive(Parser)]
#[clap(
    name = "jobs-uploader",
    version,
    about = "Upload job postings from lib/data/jobs.json into the jobs collection of the configured document store"
)]
pub struct Cli {}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(_cli: Cli) -> Result<()> {
    info!("Starting job upload run");

    let key_path = credentials::locate()?;
    let key = credentials::load(&key_path)?;
    let client = FirestoreClient::new(&key)?;

    let report = upload::upload_jobs(&client, Path::new(JOBS_FILE_PATH)).await?;
    if report.failed.is_empty() {
        info!(uploaded = report.uploaded.len(), "All jobs uploaded");
    } else {
        warn!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            "Run finished with per-job failures"
        );
    }
    Ok(())
}
