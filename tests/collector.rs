//! End-to-end collection runs against mocked API endpoints.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mockito::Matcher;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use tubepulse::models::{Config, VideoRecord};
use tubepulse::pipeline::{CollectionDriver, Termination};
use tubepulse::storage::CsvSink;

/// A full search page of `count` distinct video ids for the given page.
fn search_page(page: usize, count: usize) -> String {
    let items: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"id": {{"kind": "youtube#video", "videoId": "vid{page}_{i}"}},
                     "snippet": {{"title": "Video {page}-{i}",
                                  "publishedAt": "2023-05-01T12:00:00Z",
                                  "channelId": "c", "channelTitle": "Chan",
                                  "description": "d",
                                  "thumbnails": {{"default": {{"url": "u"}}}}}}}}"#
            )
        })
        .collect();
    format!(r#"{{"nextPageToken": "TOK", "items": [{}]}}"#, items.join(","))
}

fn test_config(dir: &TempDir, keys: &[&str]) -> Config {
    let mut config = Config::default();
    config.api.keys = keys.iter().map(|k| k.to_string()).collect();
    config.api.page_size = 50;
    config.api.page_delay_ms = 0;
    config.api.batch_delay_ms = 0;
    config.collection.target_count = 100;
    config.collection.save_interval = 50;
    config.collection.retry_backoff_ms = 1;
    config.paths.output_file = dir.path().join("out.csv").to_string_lossy().into_owned();
    config
}

/// Serve alternating fixed pages so re-runs see the same id universe.
async fn mock_endpoints(server: &mut mockito::Server) {
    let counter = Arc::new(AtomicUsize::new(0));
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_body_from_request(move |_| {
            let page = counter.fetch_add(1, Ordering::SeqCst) % 2;
            search_page(page, 50).into_bytes()
        })
        .create_async()
        .await;
    server
        .mock("GET", "/videos")
        .match_query(Matcher::Any)
        .with_body(r#"{"items": []}"#)
        .create_async()
        .await;
}

fn driver(config: &Config, server: &mockito::Server) -> CollectionDriver {
    CollectionDriver::with_endpoints(
        config,
        &format!("{}/search", server.url()),
        &format!("{}/videos", server.url()),
    )
    .unwrap()
}

#[tokio::test]
async fn collects_to_target_with_interval_flushes() {
    let mut server = mockito::Server::new_async().await;
    mock_endpoints(&mut server).await;

    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, &["K1"]);

    let outcome = driver(&config, &server)
        .run(&mut StdRng::seed_from_u64(3))
        .await
        .unwrap();

    // Target 100 with save interval 50: two periodic flushes of 50, then
    // an empty terminal flush.
    assert_eq!(outcome.termination, Termination::TargetReached);
    assert_eq!(outcome.accepted, 100);
    assert_eq!(outcome.periodic_flushes, 2);

    let sink = CsvSink::new(&config.paths.output_file);
    assert_eq!(sink.existing_ids().unwrap().len(), 100);

    let content = std::fs::read_to_string(&config.paths.output_file).unwrap();
    assert_eq!(content.lines().count(), 101); // header + 100 rows
}

#[tokio::test]
async fn rerun_accepts_no_duplicates() {
    let mut server = mockito::Server::new_async().await;
    mock_endpoints(&mut server).await;

    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, &["K1"]);

    let first = driver(&config, &server)
        .run(&mut StdRng::seed_from_u64(3))
        .await
        .unwrap();
    assert_eq!(first.accepted, 100);

    // Second run sees only identifiers the first run already persisted.
    let second = driver(&config, &server)
        .run(&mut StdRng::seed_from_u64(4))
        .await
        .unwrap();

    assert_eq!(second.accepted, 0);
    assert_eq!(second.termination, Termination::IterationLimit);

    let content = std::fs::read_to_string(&config.paths.output_file).unwrap();
    assert_eq!(content.lines().count(), 101);
}

#[tokio::test]
async fn failure_path_flushes_buffered_records() {
    let mut server = mockito::Server::new_async().await;
    let pages = Arc::new(AtomicUsize::new(0));
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_body_from_request(move |_| {
            let page = pages.fetch_add(1, Ordering::SeqCst);
            search_page(page, 50).into_bytes()
        })
        .create_async()
        .await;
    // First statistics call succeeds; later calls return garbage until
    // the bounded retry gives up.
    let stats_calls = Arc::new(AtomicUsize::new(0));
    server
        .mock("GET", "/videos")
        .match_query(Matcher::Any)
        .with_body_from_request(move |_| {
            if stats_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                br#"{"items": []}"#.to_vec()
            } else {
                b"not json".to_vec()
            }
        })
        .create_async()
        .await;

    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&tmp, &["K1", "K2", "K3"]);
    // Keep the first page below any save-interval mark.
    config.collection.save_interval = 1000;
    config.collection.retry_max_attempts = 2;

    let result = driver(&config, &server)
        .run(&mut StdRng::seed_from_u64(5))
        .await;
    assert!(result.is_err());

    // The accepted page never crossed a save-interval mark, but the
    // failure path still writes it out before surfacing the error.
    let sink = CsvSink::new(&config.paths.output_file);
    assert_eq!(sink.existing_ids().unwrap().len(), 50);
}

#[tokio::test]
async fn quota_exhaustion_terminates_cleanly() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_body(r#"{"error": {"message": "Daily quota exceeded"}}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/videos")
        .match_query(Matcher::Any)
        .with_body(r#"{"items": []}"#)
        .create_async()
        .await;

    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, &["K1", "K2"]);

    let outcome = driver(&config, &server)
        .run(&mut StdRng::seed_from_u64(1))
        .await
        .unwrap();

    assert_eq!(outcome.termination, Termination::QuotaExhausted);
    assert_eq!(outcome.accepted, 0);
    assert_eq!(outcome.key_switches, 1);
    // Nothing buffered, so the terminal flush never creates the file.
    assert!(!std::path::Path::new(&config.paths.output_file).exists());
}

#[tokio::test]
async fn enrichment_is_merged_into_persisted_rows() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_body(search_page(0, 2))
        .create_async()
        .await;
    server
        .mock("GET", "/videos")
        .match_query(Matcher::Any)
        .with_body(
            r#"{"items": [
                {"id": "vid0_0",
                 "statistics": {"viewCount": "1000", "likeCount": "50"},
                 "snippet": {"categoryId": "24", "tags": ["music", "live"]}},
                {"id": "vid0_1",
                 "statistics": {"viewCount": "5", "likeCount": "1", "commentCount": "2"},
                 "snippet": {"categoryId": "10", "tags": []}}
            ]}"#,
        )
        .create_async()
        .await;

    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&tmp, &["K1"]);
    config.collection.target_count = 2;

    let outcome = driver(&config, &server)
        .run(&mut StdRng::seed_from_u64(9))
        .await
        .unwrap();
    assert_eq!(outcome.accepted, 2);

    let mut reader = csv::Reader::from_path(&config.paths.output_file).unwrap();
    let rows: Vec<VideoRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    let first = rows.iter().find(|r| r.video_id == "vid0_0").unwrap();
    assert_eq!(first.view_count, 1000);
    assert_eq!(first.likes, 50);
    assert!(first.comments_disabled);
    assert_eq!(first.comment_count, 0);
    assert_eq!(first.category_id, 24);
    assert_eq!(first.tags, "music, live");
    assert!(!first.is_trending);

    let second = rows.iter().find(|r| r.video_id == "vid0_1").unwrap();
    assert!(!second.comments_disabled);
    assert_eq!(second.comment_count, 2);
}
