use crate::event::ProgressEvent;
use crate::publisher::{ProgressPublisher, RecordingProgressPublisher};
use crate::stage::Stage;

#[test]
fn stage_percents_match_the_canonical_ladder() {
    assert_eq!(Stage::Queued.canonical_percent(), 0);
    assert_eq!(Stage::Analysts.canonical_percent(), 15);
    assert_eq!(Stage::InvestmentDebate.canonical_percent(), 45);
    assert_eq!(Stage::ResearchManager.canonical_percent(), 60);
    assert_eq!(Stage::Trader.canonical_percent(), 70);
    assert_eq!(Stage::RiskDebate.canonical_percent(), 85);
    assert_eq!(Stage::RiskManager.canonical_percent(), 95);
    assert_eq!(Stage::Finalizing.canonical_percent(), 100);
}

#[tokio::test]
async fn recording_publisher_preserves_emission_order() {
    let publisher = RecordingProgressPublisher::new();
    for stage in [Stage::Queued, Stage::Analysts, Stage::InvestmentDebate] {
        publisher
            .publish(ProgressEvent::for_stage("run-1", stage, "gpt-4o", vec![]))
            .await;
    }

    let events = publisher.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].stage, Stage::Queued);
    assert_eq!(events[1].stage, Stage::Analysts);
    assert_eq!(events[2].stage, Stage::InvestmentDebate);
}

#[tokio::test]
async fn error_event_always_reports_finalizing_at_full_percent() {
    let event = ProgressEvent::error("run-1", "gpt-4o", vec![], "recursion limit exceeded");
    assert_eq!(event.stage, Stage::Finalizing);
    assert_eq!(event.percent, 100);
    assert_eq!(event.message.as_deref(), Some("recursion limit exceeded"));
}
