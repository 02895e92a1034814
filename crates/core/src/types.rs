use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timestamp::parse_timestamp;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Youtube,
    Tiktok,
    Instagram,
    Linkedin,
    Generic,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Youtube,
        Platform::Tiktok,
        Platform::Instagram,
        Platform::Linkedin,
        Platform::Generic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Youtube => "YouTube",
            Platform::Tiktok => "TikTok",
            Platform::Instagram => "Instagram",
            Platform::Linkedin => "LinkedIn",
            Platform::Generic => "Generic",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Linkedin => "linkedin",
            Platform::Generic => "generic",
        }
    }

    pub fn from_key(key: &str) -> Option<Platform> {
        Platform::ALL.into_iter().find(|p| p.key() == key)
    }

    /// Platform conventions the model should judge fit against
    pub fn norms(&self) -> &'static str {
        match self {
            Platform::Youtube => {
                "16:9 landscape, any length, custom thumbnail expected, captions recommended"
            }
            Platform::Tiktok => "9:16 vertical, under 3 minutes, burned-in captions expected",
            Platform::Instagram => "9:16 vertical for Reels, under 90 seconds, captions expected",
            Platform::Linkedin => {
                "1:1 or 16:9, under 10 minutes, captions required (most viewers watch muted)"
            }
            Platform::Generic => "no specific platform; judge general web video conventions",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Spelling,
    Factual,
    Clarity,
    Marketing,
    Platform,
}

impl IssueCategory {
    pub fn label(&self) -> &'static str {
        match self {
            IssueCategory::Spelling => "spelling",
            IssueCategory::Factual => "factual",
            IssueCategory::Clarity => "clarity",
            IssueCategory::Marketing => "marketing",
            IssueCategory::Platform => "platform",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Suggestion,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
            Severity::Suggestion => "suggestion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    /// `MM:SS` or `HH:MM:SS`, absolute from media start
    pub timestamp: String,
    pub category: IssueCategory,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_be: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(default)]
    pub fixed: bool,
}

impl Issue {
    pub fn seconds(&self) -> u64 {
        parse_timestamp(&self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPoint {
    pub timestamp: String,
    /// Predicted share of viewers still watching, 0-100
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RetentionPoint {
    pub fn seconds(&self) -> u64 {
        parse_timestamp(&self.timestamp)
    }
}

/// Hook fields only mean something for the first window, CTA fields only
/// for the last one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingAssessment {
    pub overall_score: f64,
    pub hook_score: f64,
    pub hook_feedback: String,
    pub cta_score: f64,
    pub cta_feedback: String,
    pub retention_curve: Vec<RetentionPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl ThumbnailQuality {
    pub fn label(&self) -> &'static str {
        match self {
            ThumbnailQuality::Low => "low",
            ThumbnailQuality::Medium => "medium",
            ThumbnailQuality::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformFit {
    pub aspect_ratio_ok: bool,
    pub duration_ok: bool,
    pub thumbnail_quality: ThumbnailQuality,
    pub captions_present: bool,
}

/// One contiguous slice of the media, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub index: usize,
    pub start: u64,
    /// `None` means "until the end of the media" (duration unknown)
    pub end: Option<u64>,
}

impl TimeWindow {
    pub fn is_open_ended(&self) -> bool {
        self.end.is_none()
    }
}

/// What one model call produced for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResult {
    pub window: TimeWindow,
    pub score: Option<f64>,
    pub issues: Vec<Issue>,
    /// `overallScore` as reported; `None` when missing or not a number,
    /// in which case `marketing.overall_score` holds a placeholder 0.
    #[serde(default)]
    pub marketing_score: Option<f64>,
    pub marketing: Option<MarketingAssessment>,
    pub platform_fit: Option<PlatformFit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub title: String,
    pub platform: Platform,
    pub score: u32,
    /// Media duration in seconds, 0 when the provider reported none
    pub duration: u64,
    pub issues: Vec<Issue>,
    pub marketing: MarketingAssessment,
    pub platform_fit: PlatformFit,
    #[serde(default)]
    pub segments_analyzed: usize,
    #[serde(default)]
    pub segments_failed: usize,
}

impl AnalysisReport {
    /// Set the `fixed` flag of an issue; returns false for unknown ids.
    pub fn set_fixed(&mut self, issue_id: &str, fixed: bool) -> bool {
        match self.issues.iter_mut().find(|issue| issue.id == issue_id) {
            Some(issue) => {
                issue.fixed = fixed;
                true
            }
            None => false,
        }
    }

    pub fn toggle_fixed(&mut self, issue_id: &str) -> Option<bool> {
        let issue = self.issues.iter_mut().find(|issue| issue.id == issue_id)?;
        issue.fixed = !issue.fixed;
        Some(issue.fixed)
    }

    pub fn open_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| !issue.fixed)
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// What the caller tells the tool about the media being reviewed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub title: String,
    pub platform: Platform,
    pub channel_url: Option<String>,
    pub context: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(id: &str) -> Issue {
        Issue {
            id: id.to_string(),
            timestamp: "01:05".to_string(),
            category: IssueCategory::Spelling,
            severity: Severity::Minor,
            description: "Typo in lower third".to_string(),
            found: Some("Recieve".to_string()),
            should_be: Some("Receive".to_string()),
            impact: None,
            fixed: false,
        }
    }

    #[test]
    fn issue_uses_camel_case_on_the_wire() {
        let json = serde_json::to_value(issue("a")).unwrap();
        assert_eq!(json["shouldBe"], "Receive");
        assert_eq!(json["category"], "spelling");
        assert!(json.get("impact").is_none());
    }

    #[test]
    fn toggling_fixed_only_touches_the_named_issue() {
        let mut report = AnalysisReport {
            title: "t".to_string(),
            platform: Platform::Youtube,
            score: 80,
            duration: 100,
            issues: vec![issue("a"), issue("b")],
            marketing: MarketingAssessment::default(),
            platform_fit: PlatformFit::default(),
            segments_analyzed: 1,
            segments_failed: 0,
        };

        assert_eq!(report.toggle_fixed("b"), Some(true));
        assert!(!report.issues[0].fixed);
        assert_eq!(report.open_issues().count(), 1);
        assert!(report.set_fixed("b", false));
        assert!(!report.set_fixed("missing", true));
        assert_eq!(report.toggle_fixed("missing"), None);
    }

    #[test]
    fn platform_keys_round_trip() {
        for platform in Platform::ALL {
            assert_eq!(Platform::from_key(platform.key()), Some(platform));
        }
        assert_eq!(Platform::from_key("myspace"), None);
    }
}
