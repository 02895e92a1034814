use crate::{
    timestamp::format_timestamp,
    types::{AnalysisReport, Severity},
};

fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}

/// Format an analysis report as human-readable markdown
pub fn format_report_readable(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", report.title));

    let duration = if report.duration > 0 {
        format_timestamp(report.duration)
    } else {
        "unknown".to_string()
    };
    output.push_str(&format!(
        "**Score:** {}/100 | **Platform:** {} | **Duration:** {}\n\n",
        report.score, report.platform, duration
    ));

    if report.segments_failed > 0 {
        output.push_str(&format!(
            "> {} of {} segments could not be analyzed; issues in those ranges are missing.\n\n",
            report.segments_failed,
            report.segments_failed + report.segments_analyzed
        ));
    }

    output.push_str("## Issues\n\n");
    if report.issues.is_empty() {
        output.push_str("No issues found.\n\n");
    } else {
        let counts = [
            Severity::Critical,
            Severity::Major,
            Severity::Minor,
            Severity::Suggestion,
        ]
        .map(|s| format!("{} {}", report.count_by_severity(s), s.label()));
        output.push_str(&format!("{}\n\n", counts.join(" · ")));

        for issue in &report.issues {
            let mark = if issue.fixed { "x" } else { " " };
            output.push_str(&format!(
                "- [{}] `{}` **{}** ({}) {}\n",
                mark,
                issue.timestamp,
                issue.severity.label(),
                issue.category.label(),
                issue.description
            ));
            if let (Some(found), Some(should_be)) = (&issue.found, &issue.should_be) {
                output.push_str(&format!("  - \"{}\" → \"{}\"\n", found, should_be));
            }
            if let Some(impact) = &issue.impact {
                output.push_str(&format!("  - {}\n", impact));
            }
        }
        output.push('\n');
    }

    let marketing = &report.marketing;
    output.push_str("## Marketing\n\n");
    output.push_str(&format!("**Overall:** {:.0}/100\n\n", marketing.overall_score));
    output.push_str(&format!(
        "**Hook:** {:.0}/10: {}\n\n",
        marketing.hook_score, marketing.hook_feedback
    ));
    output.push_str(&format!(
        "**Call to action:** {:.0}/10: {}\n\n",
        marketing.cta_score, marketing.cta_feedback
    ));

    if !marketing.retention_curve.is_empty() {
        output.push_str("### Predicted retention\n\n");
        for point in &marketing.retention_curve {
            let bar = "█".repeat((point.value / 5.0).round() as usize);
            output.push_str(&format!("{} {:>3.0}% {}", point.timestamp, point.value, bar));
            if let Some(label) = &point.label {
                output.push_str(&format!("  {}", label));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    let fit = &report.platform_fit;
    output.push_str("## Platform fit\n\n");
    output.push_str(&format!("• Aspect ratio OK: {}\n", yes_no(fit.aspect_ratio_ok)));
    output.push_str(&format!("• Duration OK: {}\n", yes_no(fit.duration_ok)));
    output.push_str(&format!("• Captions present: {}\n", yes_no(fit.captions_present)));
    output.push_str(&format!(
        "• Thumbnail quality: {}\n",
        fit.thumbnail_quality.label()
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Issue, IssueCategory, MarketingAssessment, Platform, PlatformFit, RetentionPoint,
    };

    #[test]
    fn readable_report_lists_issues_and_partial_coverage() {
        let report = AnalysisReport {
            title: "Launch".to_string(),
            platform: Platform::Youtube,
            score: 72,
            duration: 2500,
            issues: vec![Issue {
                id: "1".to_string(),
                timestamp: "20:30".to_string(),
                category: IssueCategory::Spelling,
                severity: Severity::Critical,
                description: "Brand name misspelled".to_string(),
                found: Some("Acmee".to_string()),
                should_be: Some("Acme".to_string()),
                impact: None,
                fixed: true,
            }],
            marketing: MarketingAssessment {
                retention_curve: vec![RetentionPoint {
                    timestamp: "00:00".to_string(),
                    value: 100.0,
                    label: Some("start".to_string()),
                }],
                ..MarketingAssessment::default()
            },
            platform_fit: PlatformFit::default(),
            segments_analyzed: 2,
            segments_failed: 1,
        };

        let text = format_report_readable(&report);
        assert!(text.starts_with("# Launch\n"));
        assert!(text.contains("**Duration:** 41:40"));
        assert!(text.contains("1 of 3 segments"));
        assert!(text.contains("- [x] `20:30` **critical** (spelling) Brand name misspelled"));
        assert!(text.contains("\"Acmee\" → \"Acme\""));
        assert!(text.contains("Thumbnail quality: medium"));
    }
}
