//! Multi-subject mask extraction.
//!
//! Runs the segmentation client once per named subject against the same
//! source video. Fail-fast: the first subject failure abandons the rest
//! and no partial record list is returned, so a character sheet is never
//! silently short.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use vibe_models::{BatchSegmentationRecord, SubjectSpec};
use vibe_segmentation::{SegmentationClient, SegmentationError};

use crate::error::{ExportError, PipelineResult};

/// Fans out segmentation calls for the subjects of one video.
pub struct BatchSegmenter {
    segmentation: Arc<SegmentationClient>,
    concurrency: usize,
}

impl BatchSegmenter {
    /// `concurrency` of 1 processes subjects strictly in input order.
    pub fn new(segmentation: Arc<SegmentationClient>, concurrency: usize) -> Self {
        Self {
            segmentation,
            concurrency: concurrency.max(1),
        }
    }

    /// Segment every subject, returning records in input order.
    pub async fn run(
        &self,
        video_url: &str,
        subjects: &[SubjectSpec],
    ) -> PipelineResult<Vec<BatchSegmentationRecord>> {
        let mut seen = HashSet::new();
        for subject in subjects {
            if !seen.insert(subject.name.as_str()) {
                warn!(subject = %subject.name, "duplicate subject name in batch");
            }
        }

        info!(%video_url, subjects = subjects.len(), "batch segmentation started");

        if self.concurrency <= 1 {
            self.run_sequential(video_url, subjects).await
        } else {
            self.run_bounded(video_url, subjects).await
        }
    }

    async fn run_sequential(
        &self,
        video_url: &str,
        subjects: &[SubjectSpec],
    ) -> PipelineResult<Vec<BatchSegmentationRecord>> {
        let mut records = Vec::with_capacity(subjects.len());
        for subject in subjects {
            let mask = self
                .segmentation
                .segment_video(video_url, &subject.intent)
                .await
                .map_err(|source| ExportError::Subject {
                    name: subject.name.clone(),
                    source,
                })?;
            records.push(BatchSegmentationRecord {
                subject_name: subject.name.clone(),
                mask_url: mask.mask_url,
            });
        }
        Ok(records)
    }

    async fn run_bounded(
        &self,
        video_url: &str,
        subjects: &[SubjectSpec],
    ) -> PipelineResult<Vec<BatchSegmentationRecord>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut set = JoinSet::new();

        for (index, subject) in subjects.iter().cloned().enumerate() {
            let client = self.segmentation.clone();
            let semaphore = semaphore.clone();
            let url = video_url.to_string();
            set.spawn(async move {
                // the semaphore lives for the whole run and is never closed
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("batch semaphore closed");
                let result = client.segment_video(&url, &subject.intent).await;
                (index, subject.name, result)
            });
        }

        let mut masks: Vec<Option<String>> = vec![None; subjects.len()];
        let mut failure: Option<(usize, String, SegmentationError)> = None;

        while let Some(joined) = set.join_next().await {
            let Ok((index, name, result)) = joined else {
                // aborted or panicked task; collect_records refuses to
                // hand back a record list with its mask missing
                continue;
            };
            match result {
                Ok(mask) => masks[index] = Some(mask.mask_url),
                Err(source) => {
                    // keep the earliest failure by input order
                    if failure.as_ref().is_none_or(|(i, _, _)| index < *i) {
                        failure = Some((index, name, source));
                    }
                    set.abort_all();
                }
            }
        }

        collect_records(subjects, masks, failure)
    }
}

/// Assemble the final record list, all-or-nothing.
///
/// A recorded failure wins; otherwise every subject must have produced a
/// mask. A mask missing without a recorded failure means its task never
/// completed, and returning fewer records than subjects would silently
/// shorten the caller's character sheet.
fn collect_records(
    subjects: &[SubjectSpec],
    masks: Vec<Option<String>>,
    failure: Option<(usize, String, SegmentationError)>,
) -> PipelineResult<Vec<BatchSegmentationRecord>> {
    if let Some((_, name, source)) = failure {
        return Err(ExportError::Subject { name, source });
    }

    let mut records = Vec::with_capacity(subjects.len());
    for (subject, mask) in subjects.iter().zip(masks) {
        match mask {
            Some(mask_url) => records.push(BatchSegmentationRecord {
                subject_name: subject.name.clone(),
                mask_url,
            }),
            None => return Err(ExportError::SubjectIncomplete(subject.name.clone())),
        }
    }
    Ok(records)
}
