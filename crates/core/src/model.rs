//! The two capabilities the analysis core consumes from the model provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileState {
    Processing,
    Active,
    Failed,
}

impl FileState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FileState::Processing)
    }

    /// Map the provider's state names; anything unknown still counts as processing.
    pub fn from_provider(state: &str) -> FileState {
        match state {
            "ACTIVE" => FileState::Active,
            "FAILED" => FileState::Failed,
            _ => FileState::Processing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    /// Provider resource name used for status checks, e.g. `files/abc123`
    pub name: String,
    pub uri: String,
    pub mime_type: String,
    pub state: FileState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaStatus {
    pub state: FileState,
    pub duration_seconds: Option<u64>,
}

/// A processed upload the model can be pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    pub name: String,
    pub uri: String,
    pub mime_type: String,
    /// Seconds; 0 when the provider reported no duration
    pub duration: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Structured(Value),
    Text(String),
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, mime_type: &str, display_name: &str)
    -> Result<UploadedMedia>;

    async fn status(&self, name: &str) -> Result<MediaStatus>;
}

#[async_trait]
pub trait AnalysisModel: Send + Sync {
    async fn generate(&self, prompt: &str, file: &MediaFile, schema: &Value) -> Result<ModelReply>;
}
