//! Folding per-window results into one report.

use std::collections::HashSet;

use tracing::debug;

use crate::{
    error::{ClipcheckError, Result},
    types::{AnalysisReport, Issue, MarketingAssessment, Platform, RetentionPoint, SegmentResult},
};

pub const MAX_RETENTION_POINTS: usize = 20;

const NO_HOOK_DATA: &str = "No hook data available";
const NO_CTA_DATA: &str = "No call-to-action data available";

/// Run-level facts the segments themselves do not carry.
#[derive(Debug, Clone)]
pub struct MergeContext {
    pub title: String,
    pub platform: Platform,
    pub duration: u64,
    pub segments_failed: usize,
}

/// Merge results ordered by window (index 0 first) into one report.
pub fn merge_segments(segments: Vec<SegmentResult>, ctx: MergeContext) -> Result<AnalysisReport> {
    match segments.len() {
        0 => Err(ClipcheckError::NoResults {
            attempted: ctx.segments_failed,
        }),
        1 => {
            let mut segments = segments;
            let segment = segments.remove(0);
            Ok(single_segment_report(segment, ctx))
        }
        n => {
            debug!(segments = n, "merging segment results");
            Ok(merge_many(segments, ctx))
        }
    }
}

fn single_segment_report(segment: SegmentResult, ctx: MergeContext) -> AnalysisReport {
    AnalysisReport {
        title: ctx.title,
        platform: ctx.platform,
        score: segment.score.map(round_score).unwrap_or(0),
        duration: ctx.duration,
        issues: segment.issues,
        marketing: segment.marketing.unwrap_or_default(),
        platform_fit: segment.platform_fit.unwrap_or_default(),
        segments_analyzed: 1,
        segments_failed: ctx.segments_failed,
    }
}

fn merge_many(segments: Vec<SegmentResult>, ctx: MergeContext) -> AnalysisReport {
    let segments_analyzed = segments.len();
    let score = mean(segments.iter().filter_map(|s| s.score));
    let overall_score = mean(segments.iter().filter_map(|s| s.marketing_score));

    let first = segments.first().and_then(|s| s.marketing.as_ref());
    let (hook_score, hook_feedback) = attributed(
        first.map(|m| (m.hook_score, m.hook_feedback.as_str())),
        NO_HOOK_DATA,
    );

    let last = segments.last().and_then(|s| s.marketing.as_ref());
    let (cta_score, cta_feedback) = attributed(
        last.map(|m| (m.cta_score, m.cta_feedback.as_str())),
        NO_CTA_DATA,
    );

    let platform_fit = segments
        .first()
        .and_then(|s| s.platform_fit.clone())
        .unwrap_or_default();

    let mut issues = Vec::new();
    let mut curve = Vec::new();
    for segment in segments {
        issues.extend(segment.issues);
        if let Some(marketing) = segment.marketing {
            curve.extend(marketing.retention_curve);
        }
    }

    AnalysisReport {
        title: ctx.title,
        platform: ctx.platform,
        score: score.map(round_score).unwrap_or(0),
        duration: ctx.duration,
        issues: merge_issues(issues),
        marketing: MarketingAssessment {
            overall_score: overall_score.map(|s| s.round()).unwrap_or(0.0),
            hook_score,
            hook_feedback,
            cta_score,
            cta_feedback,
            retention_curve: merge_retention(curve),
        },
        platform_fit,
        segments_analyzed,
        segments_failed: ctx.segments_failed,
    }
}

fn attributed(source: Option<(f64, &str)>, fallback: &str) -> (f64, String) {
    match source {
        Some((score, feedback)) if !feedback.trim().is_empty() => (score, feedback.to_string()),
        Some((score, _)) => (score, fallback.to_string()),
        None => (0.0, fallback.to_string()),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

fn round_score(score: f64) -> u32 {
    score.round().clamp(0.0, 100.0) as u32
}

/// Dedup on `(timestamp, description)` keeping the first, then order by time.
pub fn merge_issues(issues: Vec<Issue>) -> Vec<Issue> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Issue> = issues
        .into_iter()
        .filter(|issue| seen.insert((issue.timestamp.clone(), issue.description.clone())))
        .collect();
    // stable: equal times keep window order
    merged.sort_by_key(Issue::seconds);
    merged
}

/// Dedup on the parsed second keeping the first, order by time, then thin
/// to [`MAX_RETENTION_POINTS`].
pub fn merge_retention(points: Vec<RetentionPoint>) -> Vec<RetentionPoint> {
    let mut seen = HashSet::new();
    let mut merged: Vec<RetentionPoint> = points
        .into_iter()
        .filter(|point| seen.insert(point.seconds()))
        .collect();
    merged.sort_by_key(RetentionPoint::seconds);
    downsample(merged, MAX_RETENTION_POINTS)
}

/// Keep `max` evenly spaced points, always including the first and last.
pub fn downsample<T>(points: Vec<T>, max: usize) -> Vec<T> {
    let n = points.len();
    if max == 0 || n <= max {
        return points;
    }
    if max == 1 {
        return points.into_iter().take(1).collect();
    }
    // n > max, so consecutive picks are at least one apart
    let mut picks = (0..max).map(|i| i * (n - 1) / (max - 1)).peekable();
    points
        .into_iter()
        .enumerate()
        .filter_map(|(i, point)| picks.next_if_eq(&i).map(|_| point))
        .collect()
}
