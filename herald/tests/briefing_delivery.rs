//! Composing a briefing and pushing it through the delivery engine

mod support;

use std::sync::Arc;

use chrono::NaiveDate;
use herald::{ConsoleTransport, HeraldConfig, compose, render_report};
use herald_delivery::{DeliveryOutcome, DeliveryProcessor, RecordingSleeper};
use pretty_assertions::assert_eq;
use support::{flaky_summarizer, sample_digest, write_config};

const CONFIG: &str = r#"(
    delivery: (
        mode: segment,
        inter_segment_delay_seconds: 2,
    ),
    subscribers: ["+15550001", "+15550002"],
)"#;

#[tokio::test]
async fn test_briefing_reaches_every_subscriber_in_order() {
    let (_dir, path) = write_config(CONFIG);
    let config = HeraldConfig::load(&path).expect("valid config");

    let date = NaiveDate::from_ymd_opt(2024, 11, 5).expect("valid date");
    let summarizer = flaky_summarizer();
    let briefing = compose(&sample_digest(), &summarizer, date).await;
    assert!(briefing.starts_with("DAILY NEWS BRIEFING\nNovember 05, 2024\n"));
    assert!(briefing.contains("WORLD NEWS\n----------\nLeaders met to discuss trade."));
    assert!(briefing.contains("TECH NEWS\n\n1. Tech headline number 1\n"));
    assert_eq!(summarizer.prompts().len(), 2);

    let transport = ConsoleTransport::buffered();
    let sleeper = RecordingSleeper::new();
    let processor = DeliveryProcessor::with_sleeper(
        config.delivery,
        Arc::new(transport.clone()),
        Arc::new(sleeper.clone()),
    )
    .expect("valid delivery config");
    let total = processor.segment(&briefing).len();
    assert!(total > 1, "briefing should need several segments");

    let report = processor
        .send_bulk(&briefing, &config.subscribers)
        .await;

    assert_eq!(report.successful_count, 2);
    assert_eq!(sleeper.waits().len(), 2 * (total - 1));

    let output = transport.captured().expect("buffered transport");
    for recipient in &config.subscribers {
        let Some(DeliveryOutcome::Delivered { provider_ids, .. }) = report.outcome_for(recipient)
        else {
            panic!("{recipient} should be delivered");
        };
        assert_eq!(provider_ids.len(), total);
        for id in provider_ids {
            assert!(output.contains(&format!("--> {recipient} [{id}]")));
        }
    }

    let first = output.find("[1/").expect("first marker");
    let last = output.find(&format!("[{total}/{total}]")).expect("last marker");
    assert!(first < last);

    assert!(render_report(&report).starts_with("Total recipients: 2\nSuccessfully sent: 2\nFailed: 0\n"));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let (_dir, path) = write_config(
        r#"(delivery: (dry_run: true), subscribers: ["+15550001"])"#,
    );
    let config = HeraldConfig::load(&path).expect("valid config");

    let transport = ConsoleTransport::buffered();
    let processor = DeliveryProcessor::with_sleeper(
        config.delivery,
        Arc::new(transport.clone()),
        Arc::new(RecordingSleeper::new()),
    )
    .expect("valid delivery config");

    let report = processor.send_bulk("Short", &config.subscribers).await;

    assert!(report.all_delivered());
    assert_eq!(transport.captured().as_deref(), Some(""));
}
