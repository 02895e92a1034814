#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use clipcheck_core::{
    AnalysisModel, ClipcheckError, FileState, MediaFile, MediaStatus, MediaStore, ModelReply,
    ProgressEvent, Result, UploadedMedia,
};
use serde_json::{Value, json};
use tokio::sync::mpsc;

/// Replies with a fixed script, one entry per call, and records prompts.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<ModelReply>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisModel for ScriptedModel {
    async fn generate(&self, prompt: &str, _file: &MediaFile, schema: &Value) -> Result<ModelReply> {
        assert!(schema["properties"]["issues"].is_object());
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ModelReply::Text("script exhausted".to_string())))
    }
}

/// Media store whose status checks walk through a fixed list.
pub struct FakeStore {
    statuses: Mutex<VecDeque<MediaStatus>>,
    pub status_calls: AtomicUsize,
    fail_upload: bool,
}

impl FakeStore {
    pub fn new(statuses: Vec<MediaStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            status_calls: AtomicUsize::new(0),
            fail_upload: false,
        }
    }

    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl MediaStore for FakeStore {
    async fn upload(&self, bytes: Vec<u8>, mime_type: &str, _display_name: &str) -> Result<UploadedMedia> {
        if self.fail_upload {
            return Err(ClipcheckError::Api {
                status: 413,
                body: "too large".to_string(),
            });
        }
        assert!(!bytes.is_empty());
        Ok(UploadedMedia {
            name: "files/fake-1".to_string(),
            uri: "https://files.example/fake-1".to_string(),
            mime_type: mime_type.to_string(),
            state: FileState::Processing,
        })
    }

    async fn status(&self, _name: &str) -> Result<MediaStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock().unwrap();
        Ok(match statuses.len() {
            0 => panic!("status polled after a terminal state"),
            1 => *statuses.front().unwrap(),
            _ => statuses.pop_front().unwrap(),
        })
    }
}

pub fn processing() -> MediaStatus {
    MediaStatus {
        state: FileState::Processing,
        duration_seconds: None,
    }
}

pub fn active(duration: Option<u64>) -> MediaStatus {
    MediaStatus {
        state: FileState::Active,
        duration_seconds: duration,
    }
}

pub fn media(duration: u64) -> MediaFile {
    MediaFile {
        name: "files/fake-1".to_string(),
        uri: "https://files.example/fake-1".to_string(),
        mime_type: "video/mp4".to_string(),
        duration,
    }
}

/// A structured reply with one issue per timestamp.
pub fn structured(score: f64, timestamps: &[&str], hook: f64, cta: f64) -> Result<ModelReply> {
    Ok(ModelReply::Structured(json!({
        "score": score,
        "issues": timestamps.iter().map(|ts| json!({
            "timestamp": ts,
            "category": "clarity",
            "severity": "minor",
            "description": format!("mumbled line at {ts}"),
        })).collect::<Vec<_>>(),
        "marketing": {
            "overallScore": score,
            "hookScore": hook,
            "hookFeedback": if hook > 0.0 { "Opens on the payoff" } else { "" },
            "ctaScore": cta,
            "ctaFeedback": if cta > 0.0 { "Ends with a clear subscribe ask" } else { "" },
            "retentionCurve": timestamps.iter().map(|ts| json!({ "timestamp": ts, "value": 60 })).collect::<Vec<_>>(),
        },
        "platformFit": {
            "aspectRatioOk": true,
            "durationOk": true,
            "thumbnailQuality": "medium",
            "captionsPresent": false
        }
    })))
}

pub fn text(reply: &str) -> Result<ModelReply> {
    Ok(ModelReply::Text(reply.to_string()))
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn failed() -> MediaStatus {
    MediaStatus {
        state: FileState::Failed,
        duration_seconds: None,
    }
}
