use serde_json::{Value, json};

/// Name of the function the model is forced to call.
pub const ANALYSIS_FUNCTION: &str = "report_analysis";

/// Parameters schema for [`ANALYSIS_FUNCTION`], in the OpenAPI subset the
/// Gemini function-calling API accepts.
pub fn analysis_schema() -> Value {
    let timestamp = json!({
        "type": "STRING",
        "description": "Absolute position from the start of the whole video, MM:SS or HH:MM:SS"
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "score": {
                "type": "NUMBER",
                "description": "Overall quality score for this part of the video, 0-100"
            },
            "issues": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "timestamp": timestamp,
                        "category": {
                            "type": "STRING",
                            "enum": ["spelling", "factual", "clarity", "marketing", "platform"]
                        },
                        "severity": {
                            "type": "STRING",
                            "enum": ["critical", "major", "minor", "suggestion"]
                        },
                        "description": { "type": "STRING" },
                        "found": { "type": "STRING", "description": "The exact text or claim as it appears" },
                        "shouldBe": { "type": "STRING", "description": "The corrected version" },
                        "impact": { "type": "STRING", "description": "Why this matters to viewers" }
                    },
                    "required": ["timestamp", "category", "severity", "description"]
                }
            },
            "marketing": {
                "type": "OBJECT",
                "properties": {
                    "overallScore": { "type": "NUMBER", "description": "0-100" },
                    "hookScore": { "type": "NUMBER", "description": "0-10, first seconds of the video only" },
                    "hookFeedback": { "type": "STRING" },
                    "ctaScore": { "type": "NUMBER", "description": "0-10, call to action at the end only" },
                    "ctaFeedback": { "type": "STRING" },
                    "retentionCurve": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "timestamp": timestamp,
                                "value": { "type": "NUMBER", "description": "Predicted % of viewers still watching, 0-100" },
                                "label": { "type": "STRING" }
                            },
                            "required": ["timestamp", "value"]
                        }
                    }
                },
                "required": ["overallScore", "retentionCurve"]
            },
            "platformFit": {
                "type": "OBJECT",
                "properties": {
                    "aspectRatioOk": { "type": "BOOLEAN" },
                    "durationOk": { "type": "BOOLEAN" },
                    "thumbnailQuality": { "type": "STRING", "enum": ["low", "medium", "high"] },
                    "captionsPresent": { "type": "BOOLEAN" }
                },
                "required": ["aspectRatioOk", "durationOk", "thumbnailQuality", "captionsPresent"]
            }
        },
        "required": ["score", "issues", "marketing", "platformFit"]
    })
}
