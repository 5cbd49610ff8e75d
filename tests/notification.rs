//! Integration tests for divergence notifications

use block_qa_tracker::{
    config::{AppConfig, NotifierConfig, NotifierKind},
    engine::{Comparator, CycleReport},
    notification::create_notifier,
    persistence::FsArtifactStore,
    test_helpers::{
        BlockRecordBuilder, RecordingPointSource, ScriptedStreamingSource,
        TransactionRecordBuilder,
    },
};
use mockito::Matcher;
use serde_json::json;
use url::Url;

fn divergent_sources(sequence: u64) -> (ScriptedStreamingSource, RecordingPointSource) {
    let firehose = BlockRecordBuilder::new()
        .sequence(sequence)
        .transaction(TransactionRecordBuilder::new().fee(5000).build())
        .build();
    let rpc = BlockRecordBuilder::new()
        .sequence(sequence)
        .transaction(TransactionRecordBuilder::new().fee(7000).build())
        .build();
    (
        ScriptedStreamingSource::new().then_block(firehose),
        RecordingPointSource::new().with_block(rpc),
    )
}

#[tokio::test]
async fn test_divergence_posts_slack_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/services/T000/B000/XXXX")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "channel": "qa-alerts",
                "username": "Solana Block QA Tracker",
                "icon_emoji": ":warning:"
            })),
            Matcher::Regex("Solana Block QA Alert".to_string()),
            Matcher::Regex("slot 42".to_string()),
            Matcher::Regex("rpc_fetcher_block_42.json".to_string()),
        ]))
        .with_status(200)
        .with_body("ok")
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let notifier_config = NotifierConfig {
        webhook_url: Some(Url::parse(&format!("{}/services/T000/B000/XXXX", server.url())).unwrap()),
        channel: "qa-alerts".to_string(),
        ..Default::default()
    };
    let (streaming, point) = divergent_sources(42);

    let mut comparator = Comparator::new(
        &AppConfig::default(),
        Box::new(streaming),
        Box::new(point),
        Box::new(FsArtifactStore::new(dir.path())),
        create_notifier(&notifier_config, reqwest::Client::new()),
    );

    let report = comparator.run_cycle().await.unwrap();

    assert!(matches!(report, CycleReport::Diverged { notified: true, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generic_webhook_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({ "title": "Solana Block QA Alert" })),
            Matcher::Regex("Block differences detected at slot 7".to_string()),
        ]))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let notifier_config = NotifierConfig {
        webhook_url: Some(Url::parse(&server.url()).unwrap()),
        kind: NotifierKind::Generic,
        ..Default::default()
    };
    let (streaming, point) = divergent_sources(7);

    let mut comparator = Comparator::new(
        &AppConfig::default(),
        Box::new(streaming),
        Box::new(point),
        Box::new(FsArtifactStore::new(dir.path())),
        create_notifier(&notifier_config, reqwest::Client::new()),
    );

    let report = comparator.run_cycle().await.unwrap();

    assert!(matches!(report, CycleReport::Diverged { notified: true, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_webhook_error_is_reported_but_cycle_succeeds() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/").with_status(500).expect(1).create_async().await;

    let dir = tempfile::tempdir().unwrap();
    let notifier_config =
        NotifierConfig { webhook_url: Some(Url::parse(&server.url()).unwrap()), ..Default::default() };
    let (streaming, point) = divergent_sources(3);

    let mut comparator = Comparator::new(
        &AppConfig::default(),
        Box::new(streaming),
        Box::new(point),
        Box::new(FsArtifactStore::new(dir.path())),
        create_notifier(&notifier_config, reqwest::Client::new()),
    );

    let report = comparator.run_cycle().await.unwrap();

    assert!(matches!(report, CycleReport::Diverged { notified: false, .. }));
    assert!(dir.path().join("firehose_block_3.json").exists());
    mock.assert_async().await;
}
