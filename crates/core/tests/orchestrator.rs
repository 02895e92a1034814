mod common;

use clipcheck_core::{
    AnalysisRequest, ClipcheckError, Orchestrator, Phase, Platform, Progress, ProgressEvent,
};
use tokio::sync::mpsc;

use common::{ScriptedModel, drain, media, structured, text};

fn request() -> AnalysisRequest {
    AnalysisRequest {
        title: "How we ship".to_string(),
        platform: Platform::Youtube,
        channel_url: None,
        context: None,
    }
}

fn phases(events: &[ProgressEvent]) -> Vec<Phase> {
    events.iter().map(|e| e.phase.clone()).collect()
}

#[tokio::test]
async fn failed_segment_is_skipped_and_rest_merged_in_order() {
    let model = ScriptedModel::new(vec![
        structured(80.0, &["00:30", "05:00"], 8.0, 0.0),
        text("Sorry, I can only describe this video."),
        // third window answers relative to its own start
        structured(60.0, &["00:30", "41:00"], 0.0, 7.0),
    ]);
    let orchestrator = Orchestrator::new(model).with_window_seconds(1200);
    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();

    let report = orchestrator
        .run(&media(2500), &request(), Progress::new(&tx))
        .await
        .unwrap();

    let times: Vec<_> = report.issues.iter().map(|i| i.timestamp.as_str()).collect();
    assert_eq!(times, vec!["00:30", "05:00", "40:30", "41:00"]);
    assert_eq!(report.score, 70);
    assert_eq!(report.duration, 2500);
    assert_eq!(report.segments_analyzed, 2);
    assert_eq!(report.segments_failed, 1);
    assert_eq!(report.marketing.hook_score, 8.0);
    assert_eq!(report.marketing.cta_score, 7.0);
    assert_eq!(report.marketing.cta_feedback, "Ends with a clear subscribe ask");

    let prompts = orchestrator.model().prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].contains("segment 1 of 3") && prompts[0].contains("6. hook"));
    assert!(prompts[1].contains("from 00:20:00 to 00:40:00"));
    assert!(prompts[2].contains("from 00:40:00 to 00:41:40") && prompts[2].contains("7. call to action"));

    let events = drain(&mut rx);
    assert!(events.iter().all(|e| e.run_id == events[0].run_id));
    let phases = phases(&events);
    assert_eq!(phases[0], Phase::Planned { segments: 3 });
    assert_eq!(
        phases[1],
        Phase::SegmentStarted { index: 0, count: 3, start: 0, end: Some(1200) }
    );
    assert_eq!(phases[2], Phase::SegmentCompleted { index: 0, count: 3, issues: 2 });
    assert!(matches!(phases[4], Phase::SegmentFailed { index: 1, count: 3, .. }));
    assert!(phases[4].to_string().starts_with("Segment 2/3 failed"));
    assert_eq!(
        phases[5],
        Phase::SegmentStarted { index: 2, count: 3, start: 2400, end: Some(2500) }
    );
    assert_eq!(phases[7], Phase::Merging { segments: 2 });
    assert_eq!(phases[8], Phase::Done { issues: 4, score: 70 });
    assert_eq!(phases.len(), 9);
}

#[tokio::test]
async fn all_segments_failing_is_fatal() {
    let model = ScriptedModel::new(vec![text("no"), text("still no")]);
    let orchestrator = Orchestrator::new(model).with_window_seconds(600);
    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();

    let err = orchestrator
        .run(&media(1000), &request(), Progress::new(&tx))
        .await
        .unwrap_err();

    assert!(matches!(err, ClipcheckError::NoResults { attempted: 2 }));
    assert!(err.to_string().contains("no results"));

    let phases = phases(&drain(&mut rx));
    assert!(!phases.iter().any(|p| matches!(p, Phase::Done { .. })));
    assert_eq!(
        phases.iter().filter(|p| matches!(p, Phase::SegmentFailed { .. })).count(),
        2
    );
}

#[tokio::test]
async fn unknown_duration_runs_one_unframed_request() {
    let model = ScriptedModel::new(vec![structured(91.0, &["00:10", "00:05"], 6.0, 4.0)]);
    let orchestrator = Orchestrator::new(model);
    let (tx, _rx) = mpsc::unbounded_channel::<ProgressEvent>();

    let report = orchestrator
        .run(&media(0), &request(), Progress::new(&tx))
        .await
        .unwrap();

    let prompts = orchestrator.model().prompts();
    assert_eq!(prompts.len(), 1);
    assert!(!prompts[0].contains("SEGMENT"));
    assert_eq!(report.duration, 0);
    assert_eq!(report.score, 91);
    // single segment keeps the model's own order
    assert_eq!(report.issues[0].timestamp, "00:10");
    assert_eq!(report.marketing.hook_feedback, "Opens on the payoff");
}

#[tokio::test]
async fn model_transport_errors_are_segment_local() {
    let model = ScriptedModel::new(vec![
        Err(ClipcheckError::Api {
            status: 503,
            body: "overloaded".to_string(),
        }),
        structured(50.0, &["20:01"], 0.0, 2.0),
    ]);
    let orchestrator = Orchestrator::new(model).with_window_seconds(1200);
    let (tx, _rx) = mpsc::unbounded_channel::<ProgressEvent>();

    let report = orchestrator
        .run(&media(1800), &request(), Progress::new(&tx))
        .await
        .unwrap();

    assert_eq!(report.segments_failed, 1);
    assert_eq!(report.segments_analyzed, 1);
    assert_eq!(report.issues[0].timestamp, "20:01");
    // the lone survivor is the second window, taken verbatim: no hook data
    assert_eq!(report.marketing.hook_score, 0.0);
    assert_eq!(report.marketing.hook_feedback, "");
    assert_eq!(report.marketing.cta_score, 2.0);
}
