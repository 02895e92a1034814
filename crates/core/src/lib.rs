//! Clipcheck Core Library
//!
//! Chunked video quality review on top of a multimodal model: plan time
//! windows, analyze each with absolute-timestamp framing, and merge the
//! per-window results into one report.

pub mod analyzer;
pub mod cache;
pub mod error;
pub mod format;
pub mod gemini;
pub mod merge;
pub mod model;
pub mod orchestrator;
pub mod pipeline;
pub mod planner;
pub mod poll;
pub mod preferences;
pub mod progress;
pub mod provider;
pub mod schema;
pub mod timestamp;
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{get_cache_dir, get_report_path, get_root_cache_dir};
pub use error::{ClipcheckError, Result};
pub use format::format_report_readable;
pub use gemini::GeminiClient;
pub use merge::{MergeContext, merge_segments};
pub use model::{AnalysisModel, FileState, MediaFile, MediaStatus, MediaStore, ModelReply, UploadedMedia};
pub use orchestrator::Orchestrator;
pub use pipeline::{analyze_media, load_report, mime_type_for, save_report, upload_and_wait};
pub use planner::{DEFAULT_WINDOW_SECONDS, plan_segments};
pub use poll::{PollPolicy, poll_until};
pub use preferences::{FileStore, MemoryStore, PreferenceStore, Preferences, load_preferences, save_preferences};
pub use progress::{NoProgress, Phase, Progress, ProgressEvent, ProgressSink};
pub use provider::{GeminiConfig, ProviderError, resolve_api_key};
pub use timestamp::{format_timestamp, parse_timestamp};
pub use types::{
    AnalysisReport, AnalysisRequest, Issue, IssueCategory, MarketingAssessment, Platform,
    PlatformFit, RetentionPoint, SegmentResult, Severity, ThumbnailQuality, TimeWindow,
};
