use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::{ClipcheckError, Result},
    model::{AnalysisModel, MediaFile, ModelReply},
    schema::{ANALYSIS_FUNCTION, analysis_schema},
    timestamp::{format_timestamp, format_timestamp_long, parse_timestamp},
    types::{
        AnalysisRequest, Issue, IssueCategory, MarketingAssessment, PlatformFit, RetentionPoint,
        SegmentResult, Severity, TimeWindow,
    },
};

/// Everything needed to phrase the request for one window.
pub struct SegmentContext<'a> {
    pub request: &'a AnalysisRequest,
    pub window: TimeWindow,
    pub total_windows: usize,
    /// Media duration in seconds, 0 when unknown
    pub duration: u64,
}

impl SegmentContext<'_> {
    pub fn is_first(&self) -> bool {
        self.window.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.window.index + 1 == self.total_windows
    }

    pub fn is_chunked(&self) -> bool {
        self.total_windows > 1
    }
}

pub fn build_segment_prompt(ctx: &SegmentContext<'_>) -> String {
    let request = ctx.request;
    let mut prompt = format!(
        "You are a meticulous quality reviewer for {platform} videos. Watch the attached video \
         and report every problem a careful editor would flag before publishing.\n\n",
        platform = request.platform
    );

    prompt.push_str("VIDEO\n");
    prompt.push_str(&format!("- Title: {}\n", request.title));
    prompt.push_str(&format!(
        "- Platform: {} ({})\n",
        request.platform,
        request.platform.norms()
    ));
    if let Some(url) = &request.channel_url {
        prompt.push_str(&format!("- Channel: {}\n", url));
    }
    if let Some(context) = request.context.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("- Creator notes: {}\n", context.trim()));
    }
    if ctx.duration > 0 {
        prompt.push_str(&format!(
            "- Total duration: {}\n",
            format_timestamp_long(ctx.duration)
        ));
    }
    prompt.push('\n');

    if ctx.is_chunked() {
        let end = ctx.window.end.unwrap_or(ctx.duration);
        prompt.push_str(&format!(
            "SEGMENT\nThis is segment {} of {}. Analyze ONLY the part of the video from {} to {}. \
             Ignore everything outside this range; other segments are reviewed separately.\n\n",
            ctx.window.index + 1,
            ctx.total_windows,
            format_timestamp_long(ctx.window.start),
            format_timestamp_long(end),
        ));
    }

    prompt.push_str(
        "TIMESTAMPS\nEvery timestamp you return must be ABSOLUTE: measured from the very start of \
         the whole video, never from the start of a segment. Use MM:SS, or HH:MM:SS past one \
         hour.\n\n",
    );

    prompt.push_str(
        "CHECK\n\
         1. spelling: typos and grammar in on-screen text, titles, lower thirds and captions. \
         Quote the text in `found` and the correction in `shouldBe`.\n\
         2. factual: claims that are wrong, outdated or unverifiable.\n\
         3. clarity: confusing explanations, inaudible speech, jarring cuts, unreadable text.\n\
         4. marketing: pacing, engagement and drop-off risk. Give 5-10 retentionCurve points \
         inside the analyzed range.\n\
         5. platform: problems against the platform conventions above.\n",
    );

    if ctx.is_first() {
        prompt.push_str(
            "6. hook: score the opening 3-5 seconds from 0 to 10 in hookScore and explain in \
             hookFeedback.\n",
        );
    } else {
        prompt.push_str("Do not assess the hook: set hookScore to 0 and hookFeedback to \"\".\n");
    }

    if ctx.is_last() {
        prompt.push_str(
            "7. call to action: score the closing call to action from 0 to 10 in ctaScore and \
             explain in ctaFeedback.\n",
        );
    } else {
        prompt.push_str("Do not assess the call to action: set ctaScore to 0 and ctaFeedback to \"\".\n");
    }

    prompt.push_str(&format!(
        "\nRate severity as critical (must fix before publishing), major, minor or suggestion. \
         Give an overall score from 0 to 100.\n\
         Respond ONLY by calling the `{}` function. Do not answer in plain text.",
        ANALYSIS_FUNCTION
    ));

    prompt
}

/// Top level of the function-call arguments. Fields stay untyped so one
/// off-schema value does not cost the rest of the segment.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawReply {
    score: Value,
    issues: Value,
    marketing: Value,
    platform_fit: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIssue {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    timestamp: String,
    category: IssueCategory,
    severity: Severity,
    description: String,
    #[serde(default)]
    found: Option<String>,
    #[serde(default)]
    should_be: Option<String>,
    #[serde(default)]
    impact: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawMarketing {
    overall_score: Value,
    hook_score: Value,
    hook_feedback: Value,
    cta_score: Value,
    cta_feedback: Value,
    retention_curve: Value,
}

fn clamp(value: f64, max: f64) -> f64 {
    value.clamp(0.0, max)
}

/// A present, finite JSON number clamped into `0..=max`; anything else is absent.
fn number(value: &Value, max: f64) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite()).map(|v| clamp(v, max))
}

fn text(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

fn list(value: Value, window: &TimeWindow, what: &str) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            warn!(segment = window.index, value = %other, "ignoring non-list {what}");
            Vec::new()
        }
    }
}

/// Decode an optional object, treating a value of the wrong shape as absent.
fn optional<T: serde::de::DeserializeOwned>(value: Value, window: &TimeWindow, what: &str) -> Option<T> {
    if value.is_null() {
        return None;
    }
    serde_json::from_value(value)
        .map_err(|e| warn!(segment = window.index, error = %e, "ignoring malformed {what}"))
        .ok()
}

fn blank_to_none(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

impl RawIssue {
    fn into_issue(self) -> Issue {
        Issue {
            id: blank_to_none(self.id).unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            timestamp: self.timestamp.trim().to_string(),
            category: self.category,
            severity: self.severity,
            description: self.description.trim().to_string(),
            found: blank_to_none(self.found),
            should_be: blank_to_none(self.should_be),
            impact: blank_to_none(self.impact),
            fixed: false,
        }
    }
}

impl RawMarketing {
    fn overall_score(&self) -> Option<f64> {
        number(&self.overall_score, 100.0)
    }

    fn into_assessment(self, window: &TimeWindow) -> MarketingAssessment {
        let overall_score = self.overall_score().unwrap_or(0.0);
        let retention = list(self.retention_curve, window, "retention curve");
        let retention_curve = decode_each::<RetentionPoint>(retention, window, "retention point")
            .into_iter()
            .map(|point| RetentionPoint {
                value: clamp(point.value, 100.0),
                ..point
            })
            .collect();

        MarketingAssessment {
            overall_score,
            hook_score: number(&self.hook_score, 10.0).unwrap_or(0.0),
            hook_feedback: text(&self.hook_feedback),
            cta_score: number(&self.cta_score, 10.0).unwrap_or(0.0),
            cta_feedback: text(&self.cta_feedback),
            retention_curve,
        }
    }
}

/// Decode list items one by one, dropping the ones that do not fit.
fn decode_each<T: serde::de::DeserializeOwned>(
    items: Vec<Value>,
    window: &TimeWindow,
    what: &str,
) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(segment = window.index, error = %e, "dropping malformed {what}");
                None
            }
        })
        .collect()
}

/// Turn the model's function-call arguments into a validated segment
/// result with timestamps made absolute.
pub fn parse_segment_reply(window: TimeWindow, args: Value) -> Result<SegmentResult> {
    if !args.is_object() {
        return Err(ClipcheckError::MalformedReply {
            reason: format!("expected an object, got {}", args),
        });
    }

    let raw: RawReply = serde_json::from_value(args).map_err(|e| ClipcheckError::MalformedReply {
        reason: e.to_string(),
    })?;

    let issues = decode_each::<RawIssue>(list(raw.issues, &window, "issues"), &window, "issue")
        .into_iter()
        .map(RawIssue::into_issue)
        .collect();

    let marketing = optional::<RawMarketing>(raw.marketing, &window, "marketing");
    let mut result = SegmentResult {
        window,
        score: number(&raw.score, 100.0),
        issues,
        marketing_score: marketing.as_ref().and_then(RawMarketing::overall_score),
        marketing: marketing.map(|m| m.into_assessment(&window)),
        platform_fit: optional::<PlatformFit>(raw.platform_fit, &window, "platform fit"),
    };

    correct_timestamps(&mut result);
    Ok(result)
}

fn correct_timestamp(timestamp: &mut String, segment_start: u64) -> bool {
    let seconds = parse_timestamp(timestamp);
    if segment_start > 0 && seconds < segment_start {
        *timestamp = format_timestamp(seconds.saturating_add(segment_start));
        return true;
    }
    false
}

/// Shift timestamps that look window-relative into absolute time.
///
/// A timestamp earlier than the window start is assumed to be relative to
/// it. This misfires for a genuinely early absolute timestamp reported from
/// a later window; there is no way to tell the two apart from the reply.
pub fn correct_timestamps(result: &mut SegmentResult) -> usize {
    let start = result.window.start;
    let mut corrected = 0;

    for issue in &mut result.issues {
        corrected += correct_timestamp(&mut issue.timestamp, start) as usize;
    }
    if let Some(marketing) = &mut result.marketing {
        for point in &mut marketing.retention_curve {
            corrected += correct_timestamp(&mut point.timestamp, start) as usize;
        }
    }

    if corrected > 0 {
        debug!(segment = result.window.index, corrected, "shifted relative timestamps");
    }
    corrected
}

/// Run one window through the model.
pub async fn analyze_segment<M>(
    model: &M,
    file: &MediaFile,
    ctx: &SegmentContext<'_>,
) -> Result<SegmentResult>
where
    M: AnalysisModel + ?Sized,
{
    let prompt = build_segment_prompt(ctx);
    debug!(
        segment = ctx.window.index,
        prompt_len = prompt.len(),
        "requesting segment analysis"
    );

    match model.generate(&prompt, file, &analysis_schema()).await? {
        ModelReply::Structured(args) => parse_segment_reply(ctx.window, args),
        ModelReply::Text(text) => Err(ClipcheckError::UnstructuredReply {
            text: text.chars().take(200).collect(),
        }),
    }
}
