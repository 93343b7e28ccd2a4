//! Export job identity and lifecycle state.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::format::OutputFormat;

/// Opaque export job identifier, derived from creation time plus a random
/// suffix so concurrent jobs never collide on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ExportId(String);

impl ExportId {
    pub fn new() -> Self {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", stamp, &suffix[..8]))
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ExportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of one export run.
///
/// `Completed`, `Failed` and `Cancelled` are terminal; a job is never
/// resumed, a retry starts a fresh job with a fresh directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Created,
    Segmenting,
    Fetching,
    Encoding,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Created => "created",
            JobState::Segmenting => "segmenting",
            JobState::Fetching => "fetching",
            JobState::Encoding => "encoding",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// One export run and the on-disk directory it owns.
///
/// The directory and everything under it belong exclusively to this job
/// until the retention sweep reclaims them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportJob {
    pub id: ExportId,
    pub project_id: String,
    pub export_name: String,
    pub format: OutputFormat,
    pub work_dir: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl ExportJob {
    /// Create a job rooted under `<export_root>/<project_id>/<export_id>`.
    pub fn new(
        export_root: &Path,
        project_id: impl Into<String>,
        export_name: impl Into<String>,
        format: OutputFormat,
    ) -> Self {
        let id = ExportId::new();
        let project_id = project_id.into();
        let work_dir = export_root.join(&project_id).join(id.as_str());
        Self {
            id,
            project_id,
            export_name: export_name.into(),
            format,
            work_dir,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_ids_are_unique() {
        let a = ExportId::new();
        let b = ExportId::new();
        assert_ne!(a, b);
        // timestamp part + dash + 8 hex chars
        assert_eq!(a.as_str().len(), 14 + 1 + 8);
    }

    #[test]
    fn test_work_dir_layout() {
        let job = ExportJob::new(
            Path::new("/data/exports"),
            "proj_1",
            "hero_cutout",
            OutputFormat::WebmAlpha,
        );
        assert!(job.work_dir.starts_with("/data/exports/proj_1"));
        assert!(job.work_dir.ends_with(job.id.as_str()));
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
        assert!(!JobState::Encoding.is_terminal());
    }
}
