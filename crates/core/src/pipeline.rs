use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::{
    error::{ClipcheckError, Result},
    model::{AnalysisModel, FileState, MediaFile, MediaStore},
    orchestrator::Orchestrator,
    poll::{PollPolicy, poll_until},
    progress::{Phase, Progress},
    types::{AnalysisReport, AnalysisRequest},
};

/// Guess the upload mime type from the file extension
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mpeg" | "mpg" => "video/mpeg",
        _ => "video/mp4",
    }
}

/// Upload media and wait until the provider has processed it.
///
/// A provider-side `FAILED` state is fatal: without a usable file there is
/// nothing to analyze.
pub async fn upload_and_wait<S>(
    store: &S,
    bytes: Vec<u8>,
    mime_type: &str,
    display_name: &str,
    poll: PollPolicy,
    progress: Progress<'_>,
) -> Result<MediaFile>
where
    S: MediaStore + ?Sized,
{
    progress.emit(Phase::Uploading { bytes: bytes.len() });
    let uploaded = store.upload(bytes, mime_type, display_name).await?;
    info!(name = %uploaded.name, uri = %uploaded.uri, "media uploaded");

    let name = uploaded.name.as_str();
    let status = poll_until(
        poll,
        move |attempt| {
            progress.emit(Phase::Processing { attempt });
            store.status(name)
        },
        |status| status.state.is_terminal(),
    )
    .await?;

    if status.state == FileState::Failed {
        return Err(ClipcheckError::ProcessingFailed {
            name: uploaded.name,
        });
    }

    let duration = status.duration_seconds.unwrap_or_else(|| {
        warn!(name = %uploaded.name, "provider reported no duration, analyzing as one segment");
        0
    });
    progress.emit(Phase::MediaReady { duration });

    Ok(MediaFile {
        name: uploaded.name,
        uri: uploaded.uri,
        mime_type: uploaded.mime_type,
        duration,
    })
}

/// Upload, wait for processing, then run the chunked analysis.
pub async fn analyze_media<S, M>(
    store: &S,
    orchestrator: &Orchestrator<M>,
    bytes: Vec<u8>,
    mime_type: &str,
    request: &AnalysisRequest,
    poll: PollPolicy,
    progress: Progress<'_>,
) -> Result<AnalysisReport>
where
    S: MediaStore + ?Sized,
    M: AnalysisModel,
{
    let file = upload_and_wait(store, bytes, mime_type, &request.title, poll, progress).await?;
    orchestrator.run(&file, request, progress).await
}

/// Load a report from a cached file
pub async fn load_report(path: &Path) -> Result<AnalysisReport> {
    let json_content = fs::read_to_string(path).await?;
    let report: AnalysisReport = serde_json::from_str(&json_content)?;
    Ok(report)
}

/// Save a report to a file
pub async fn save_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let pretty_json = serde_json::to_string_pretty(report)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}
