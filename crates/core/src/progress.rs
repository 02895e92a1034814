use std::{fmt, time::SystemTime};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::timestamp::format_timestamp;

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Uploading { bytes: usize },
    Processing { attempt: u32 },
    MediaReady { duration: u64 },
    Planned { segments: usize },
    SegmentStarted { index: usize, count: usize, start: u64, end: Option<u64> },
    SegmentCompleted { index: usize, count: usize, issues: usize },
    SegmentFailed { index: usize, count: usize, reason: String },
    Merging { segments: usize },
    Done { issues: usize, score: u32 },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Uploading { bytes } => {
                write!(f, "Uploading video ({:.1} MB)...", *bytes as f64 / 1_048_576.0)
            }
            Phase::Processing { attempt } => {
                write!(f, "Waiting for provider to process video (check {attempt})...")
            }
            Phase::MediaReady { duration: 0 } => write!(f, "Video ready (duration unknown)"),
            Phase::MediaReady { duration } => {
                write!(f, "Video ready ({})", format_timestamp(*duration))
            }
            Phase::Planned { segments } => write!(f, "Analyzing in {segments} segment(s)"),
            Phase::SegmentStarted { index, count, start, end } => {
                let end = end.map(format_timestamp).unwrap_or_else(|| "end".to_string());
                write!(
                    f,
                    "Analyzing segment {}/{} ({} - {})...",
                    index + 1,
                    count,
                    format_timestamp(*start),
                    end
                )
            }
            Phase::SegmentCompleted { index, count, issues } => {
                write!(f, "Segment {}/{} done: {issues} issue(s)", index + 1, count)
            }
            Phase::SegmentFailed { index, count, reason } => {
                write!(f, "Segment {}/{} failed, skipping: {reason}", index + 1, count)
            }
            Phase::Merging { segments } => write!(f, "Merging {segments} segment result(s)..."),
            Phase::Done { issues, score } => {
                write!(f, "Analysis complete: score {score}, {issues} issue(s)")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub run_id: Uuid,
    pub at: SystemTime,
    pub phase: Phase,
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Discards every event.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _event: ProgressEvent) {}
}

impl ProgressSink for mpsc::UnboundedSender<ProgressEvent> {
    fn emit(&self, event: ProgressEvent) {
        // receiver gone means nobody is watching; the run carries on
        let _ = self.send(event);
    }
}

/// A sink bound to one run id.
#[derive(Clone, Copy)]
pub struct Progress<'a> {
    run_id: Uuid,
    sink: &'a dyn ProgressSink,
}

impl<'a> Progress<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self::with_run_id(Uuid::new_v4(), sink)
    }

    pub fn with_run_id(run_id: Uuid, sink: &'a dyn ProgressSink) -> Self {
        Self { run_id, sink }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn emit(&self, phase: Phase) {
        self.sink.emit(ProgressEvent {
            run_id: self.run_id,
            at: SystemTime::now(),
            phase,
        });
    }
}
