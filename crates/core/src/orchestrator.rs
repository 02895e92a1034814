use tracing::{info, warn};

use crate::{
    analyzer::{SegmentContext, analyze_segment},
    error::Result,
    merge::{MergeContext, merge_segments},
    model::{AnalysisModel, MediaFile},
    planner::{DEFAULT_WINDOW_SECONDS, plan_segments},
    progress::{Phase, Progress},
    types::{AnalysisReport, AnalysisRequest},
};

/// Drives one analysis run: plan windows, analyze each in order, merge.
pub struct Orchestrator<M> {
    model: M,
    window_seconds: u64,
}

impl<M: AnalysisModel> Orchestrator<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            window_seconds: DEFAULT_WINDOW_SECONDS,
        }
    }

    pub fn with_window_seconds(mut self, window_seconds: u64) -> Self {
        self.window_seconds = window_seconds;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Windows are visited strictly in order, one request at a time, so
    /// progress events and hook/CTA attribution follow media time. A failed
    /// window is skipped; only a run with no successful window fails.
    pub async fn run(
        &self,
        file: &MediaFile,
        request: &AnalysisRequest,
        progress: Progress<'_>,
    ) -> Result<AnalysisReport> {
        let windows = plan_segments(file.duration, self.window_seconds);
        let count = windows.len();
        info!(
            run_id = %progress.run_id(),
            duration = file.duration,
            segments = count,
            "starting analysis"
        );
        progress.emit(Phase::Planned { segments: count });

        let mut results = Vec::with_capacity(count);
        let mut failed = 0;

        for window in windows {
            progress.emit(Phase::SegmentStarted {
                index: window.index,
                count,
                start: window.start,
                end: window.end,
            });

            let ctx = SegmentContext {
                request,
                window,
                total_windows: count,
                duration: file.duration,
            };

            match analyze_segment(&self.model, file, &ctx).await {
                Ok(result) => {
                    progress.emit(Phase::SegmentCompleted {
                        index: window.index,
                        count,
                        issues: result.issues.len(),
                    });
                    results.push(result);
                }
                Err(e) => {
                    warn!(segment = window.index, error = %e, "segment analysis failed, skipping");
                    failed += 1;
                    progress.emit(Phase::SegmentFailed {
                        index: window.index,
                        count,
                        reason: e.to_string(),
                    });
                }
            }
        }

        progress.emit(Phase::Merging {
            segments: results.len(),
        });

        let report = merge_segments(
            results,
            MergeContext {
                title: request.title.clone(),
                platform: request.platform,
                duration: file.duration,
                segments_failed: failed,
            },
        )?;

        info!(
            run_id = %progress.run_id(),
            score = report.score,
            issues = report.issues.len(),
            failed,
            "analysis complete"
        );
        progress.emit(Phase::Done {
            issues: report.issues.len(),
            score: report.score,
        });

        Ok(report)
    }
}
