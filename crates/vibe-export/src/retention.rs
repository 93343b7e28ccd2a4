//! Age-based cleanup of export job directories.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tracing::{debug, info};

use crate::error::PipelineResult;

/// Deletes job directories older than a configurable age.
///
/// Purely filesystem-timestamp driven: there is no job ledger, so any
/// process touching a job directory resets its eligibility clock. The age
/// boundary is inclusive: a directory exactly `max_age` old is deleted.
pub struct RetentionSweeper {
    root: PathBuf,
}

impl RetentionSweeper {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Delete eligible job directories, returning how many were removed.
    ///
    /// Walks one level of project directories, then one level of job
    /// directories within each. Idempotent: with nothing eligible it
    /// deletes zero and errors on none.
    pub async fn sweep(&self, max_age: Duration) -> PipelineResult<u64> {
        let mut deleted = 0u64;
        let now = SystemTime::now();

        let mut projects = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            // missing root means nothing to sweep
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        while let Some(project) = projects.next_entry().await? {
            if !project.file_type().await?.is_dir() {
                continue;
            }

            let mut jobs = tokio::fs::read_dir(project.path()).await?;
            while let Some(job) = jobs.next_entry().await? {
                if !job.file_type().await?.is_dir() {
                    continue;
                }

                let modified = job.metadata().await?.modified()?;
                let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
                if age >= max_age {
                    debug!(dir = %job.path().display(), ?age, "deleting expired job directory");
                    match tokio::fs::remove_dir_all(job.path()).await {
                        Ok(()) => deleted += 1,
                        // racing another sweep is fine
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }

        info!(root = %self.root.display(), deleted, "retention sweep finished");
        Ok(deleted)
    }
}
