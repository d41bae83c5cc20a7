//! Batch upload of the jobs file into the document store.
//!
//! The jobs file is read once and parsed into a mapping of job id to job
//! record; each record becomes one document write. A failing write (or a
//! record that is not a JSON object) is logged and recorded in the report,
//! and the batch continues with the next entry. Only a missing or malformed
//! jobs file aborts the run.

use crate::store::DocumentStore;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

/// Fixed relative path of the jobs file.
pub const JOBS_FILE_PATH: &str = "lib/data/jobs.json";

/// Collection every job document is written into.
pub const JOBS_COLLECTION: &str = "jobs";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read jobs file {path:?}: {source}")]
    JobsFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse jobs file {path:?}: {source}")]
    JobsFileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level shape of the jobs file. `preserve_order` on serde_json keeps
/// the mapping in source insertion order, which fixes upload order.
#[derive(Debug, Deserialize)]
struct JobsFile {
    jobs: Map<String, Value>,
}

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Ids written successfully, in upload order.
    pub uploaded: Vec<String>,
    /// Entries that failed, with the reason; the batch continued past each.
    pub failed: Vec<FailedJob>,
}

#[derive(Debug)]
pub struct FailedJob {
    pub job_id: String,
    pub reason: String,
}

/// Uploads every entry of the jobs file at `jobs_path` through `store`.
///
/// Writes are issued strictly one at a time, in the file's insertion order.
/// Re-running with an unchanged file rewrites the same documents in place
/// (idempotent overwrite), never duplicates.
pub async fn upload_jobs<S>(store: &S, jobs_path: &Path) -> Result<UploadReport, UploadError>
where
    S: DocumentStore + ?Sized,
{
    let raw = fs::read_to_string(jobs_path).map_err(|source| UploadError::JobsFileRead {
        path: jobs_path.to_path_buf(),
        source,
    })?;
    let parsed: JobsFile =
        serde_json::from_str(&raw).map_err(|source| UploadError::JobsFileParse {
            path: jobs_path.to_path_buf(),
            source,
        })?;
    info!(path = %jobs_path.display(), jobs = parsed.jobs.len(), "loaded jobs file");

    let mut report = UploadReport::default();
    for (job_id, record) in &parsed.jobs {
        let fields = match record.as_object() {
            Some(fields) => fields,
            None => {
                error!(job_id = %job_id, "job record is not a JSON object, skipping");
                report.failed.push(FailedJob {
                    job_id: job_id.clone(),
                    reason: "record is not a JSON object".to_string(),
                });
                continue;
            }
        };
        match store.put_document(JOBS_COLLECTION, job_id, fields).await {
            Ok(()) => {
                let title = fields
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or(job_id.as_str());
                info!(job_id = %job_id, title = %title, "Successfully uploaded job");
                report.uploaded.push(job_id.clone());
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Error uploading job");
                report.failed.push(FailedJob {
                    job_id: job_id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        uploaded = report.uploaded.len(),
        failed = report.failed.len(),
        "Job upload complete!"
    );
    Ok(report)
}
