//! Gemini REST client: Files API upload/status and `generateContent`
//! with forced function calling.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    error::{ClipcheckError, Result},
    model::{AnalysisModel, FileState, MediaFile, MediaStatus, MediaStore, ModelReply, UploadedMedia},
    provider::GeminiConfig,
    schema::ANALYSIS_FUNCTION,
    timestamp::parse_timestamp,
};

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
    api_key: String,
}

#[derive(Deserialize)]
struct FileEnvelope {
    file: FileResource,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    name: String,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    video_metadata: Option<VideoMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoMetadata {
    /// Protobuf duration, e.g. `"1534.5s"`
    #[serde(default)]
    video_duration: Option<String>,
}

impl FileResource {
    fn duration_seconds(&self) -> Option<u64> {
        self.video_metadata
            .as_ref()
            .and_then(|m| m.video_duration.as_deref())
            .map(parse_timestamp)
            .filter(|secs| *secs > 0)
    }
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            config,
            api_key: api_key.into(),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClipcheckError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl MediaStore for GeminiClient {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: &str,
    ) -> Result<UploadedMedia> {
        let start = self
            .http
            .post(self.config.upload_url())
            .query(&[("key", self.api_key.as_str())])
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = Self::check(start).await?;

        let session_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ClipcheckError::Upload {
                reason: "provider did not return an upload session URL".to_string(),
            })?;
        debug!(bytes = bytes.len(), "upload session opened");

        let finished = self
            .http
            .post(session_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await?;
        let envelope: FileEnvelope = Self::check(finished).await?.json().await?;
        let file = envelope.file;

        Ok(UploadedMedia {
            state: FileState::from_provider(&file.state),
            mime_type: if file.mime_type.is_empty() {
                mime_type.to_string()
            } else {
                file.mime_type
            },
            name: file.name,
            uri: file.uri,
        })
    }

    async fn status(&self, name: &str) -> Result<MediaStatus> {
        let response = self
            .http
            .get(self.config.file_url(name))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;
        let file: FileResource = Self::check(response).await?.json().await?;

        Ok(MediaStatus {
            state: FileState::from_provider(&file.state),
            duration_seconds: file.duration_seconds(),
        })
    }
}

/// Pick the function-call arguments out of a `generateContent` response,
/// falling back to whatever text the model wrote instead.
pub fn extract_reply(response: &Value) -> Result<ModelReply> {
    let parts = response["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| ClipcheckError::MalformedReply {
            reason: format!("no candidate parts in response: {}", response),
        })?;

    if let Some(args) = parts.iter().find_map(|part| {
        let call = part.get("functionCall")?;
        (call["name"] == ANALYSIS_FUNCTION).then(|| call["args"].clone())
    }) {
        return Ok(ModelReply::Structured(args));
    }

    let text = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect::<Vec<_>>()
        .join("\n");
    Ok(ModelReply::Text(text))
}

#[async_trait]
impl AnalysisModel for GeminiClient {
    async fn generate(&self, prompt: &str, file: &MediaFile, schema: &Value) -> Result<ModelReply> {
        let response = self
            .http
            .post(self.config.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "fileData": { "mimeType": file.mime_type, "fileUri": file.uri } },
                        { "text": prompt },
                    ],
                }],
                "tools": [{
                    "functionDeclarations": [{
                        "name": ANALYSIS_FUNCTION,
                        "description": "Report the quality review of the analyzed part of the video",
                        "parameters": schema,
                    }],
                }],
                "toolConfig": {
                    "functionCallingConfig": {
                        "mode": "ANY",
                        "allowedFunctionNames": [ANALYSIS_FUNCTION],
                    },
                },
                "generationConfig": { "temperature": 0.3 },
            }))
            .send()
            .await?;

        let body: Value = Self::check(response).await?.json().await?;
        extract_reply(&body)
    }
}
