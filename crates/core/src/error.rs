use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Error, Debug)]
pub enum ClipcheckError {
    #[error("Upload failed: {reason}")]
    Upload { reason: String },

    #[error("Provider failed to process {name}")]
    ProcessingFailed { name: String },

    #[error("Media was still processing after {attempts} status checks")]
    PollExhausted { attempts: u32 },

    #[error("Model replied with text instead of structured output: {text}")]
    UnstructuredReply { text: String },

    #[error("Malformed structured reply: {reason}")]
    MalformedReply { reason: String },

    #[error("Analysis produced no results ({attempted} segments attempted)")]
    NoResults { attempted: usize },

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClipcheckError>;
