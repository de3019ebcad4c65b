//! End-to-end pipeline runs against a scripted transport
//!
//! Time is paused, so per-attempt timeouts and backoff sleeps complete
//! instantly while still being observable through `tokio::time::Instant`.

mod common;

use std::time::Duration;

use common::{Block, FakeTransport, Reply, no_results_page, results_page, robot_check_page, test_config};
use futures::future::join_all;
use marketplace_search_lib::application::{ErrorResponse, SearchError, SearchPipeline};
use marketplace_search_lib::domain::{ExtractionStatus, MatcherUsed};
use marketplace_search_lib::infrastructure::TransportError;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn scenario_a_three_well_formed_blocks() {
    let page = results_page(&[
        Block::complete("B0001", "Sony WH-1000XM5", "348"),
        Block::complete("B0002", "Bose QuietComfort Ultra", "429"),
        Block::complete("B0003", "Anker Soundcore Q20i", "49"),
    ]);
    let transport = FakeTransport::always(Reply::ok(page));
    let pipeline = SearchPipeline::with_transport(&test_config(), transport.clone()).unwrap();

    let result = pipeline.search("headphones").await.unwrap();

    assert_eq!(result.status, ExtractionStatus::Complete);
    assert_eq!(result.len(), 3);
    let titles: Vec<_> = result.listings.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, ["Sony WH-1000XM5", "Bose QuietComfort Ultra", "Anker Soundcore Q20i"]);

    for listing in &result.listings {
        assert!(!listing.price.is_empty());
        assert_eq!(listing.rating, "4.5 out of 5 stars");
        assert!(listing.image_url.starts_with("https://m.media-amazon.com/images/I/"));
        assert!(listing.link.starts_with("https://www.amazon.com/product-"));
    }
    assert_eq!(result.listings[0].price, "348");
    assert_eq!(
        result.listings[0].link,
        "https://www.amazon.com/product-B0001/dp/B0001/ref=sr_1_1"
    );

    assert_eq!(transport.attempts(), 1);
    assert_eq!(
        transport.requested_urls()[0].as_str(),
        "https://www.amazon.com/s?k=headphones"
    );
    assert_eq!(result.diagnostics.matcher, MatcherUsed::Primary);
    assert!(!result.diagnostics.possible_structural_drift);
}

#[tokio::test(start_paused = true)]
async fn scenario_b_no_matching_blocks_is_empty_not_failure() {
    let keyword = "zzz_no_such_product_zzz";
    let transport = FakeTransport::always(Reply::ok(no_results_page(keyword)));
    let pipeline = SearchPipeline::with_transport(&test_config(), transport.clone()).unwrap();

    let result = pipeline.search(keyword).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.status, ExtractionStatus::EmptyResult);
    assert_eq!(result.diagnostics.blocks_located, 0);
    assert!(result.diagnostics.possible_structural_drift);
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn scenario_c_access_denial_is_not_retried() {
    let transport = FakeTransport::always(Reply::status(403, "Forbidden"));
    let pipeline = SearchPipeline::with_transport(&test_config(), transport.clone()).unwrap();

    let error = pipeline.search("headphones").await.unwrap_err();

    assert!(matches!(error, SearchError::BlockedByRemote { status: 403, .. }));
    assert_eq!(transport.attempts(), 1);

    let response = ErrorResponse::from(&error);
    assert_eq!(response.kind, "blocked_by_remote");
    assert!(!response.retryable);
}

#[tokio::test(start_paused = true)]
async fn scenario_c_bot_check_page_with_ok_status_is_a_block() {
    let transport = FakeTransport::always(Reply::ok(robot_check_page()));
    let pipeline = SearchPipeline::with_transport(&test_config(), transport.clone()).unwrap();

    let error = pipeline.search("headphones").await.unwrap_err();

    assert!(matches!(error, SearchError::BlockedByRemote { status: 200, .. }));
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn scenario_d_timeouts_exhaust_the_retry_budget_with_growing_backoff() {
    let transport = FakeTransport::always(Reply::Hang);
    let pipeline = SearchPipeline::with_transport(&test_config(), transport.clone()).unwrap();

    let error = pipeline.search("headphones").await.unwrap_err();

    assert_eq!(error, SearchError::Timeout { attempts: 3 });
    assert!(error.is_transient());
    assert_eq!(transport.attempts(), 3);

    let times = transport.attempt_times();
    let gaps: Vec<Duration> = times.windows(2).map(|w| w[1] - w[0]).collect();

    // 2s per-attempt timeout, then 100ms and 200ms of backoff
    assert!(gaps[0] >= Duration::from_millis(2_100), "first gap {:?}", gaps[0]);
    assert!(gaps[1] >= Duration::from_millis(2_200), "second gap {:?}", gaps[1]);
    assert!(gaps[1] > gaps[0]);
}

#[tokio::test(start_paused = true)]
async fn transient_failure_then_success_recovers() {
    let page = results_page(&[Block::complete("B0001", "Cable", "9")]);
    let transport = FakeTransport::sequence(vec![
        Reply::Fail(TransportError::Connect("connection refused".into())),
        Reply::status(503, "Service Unavailable"),
        Reply::ok(page),
    ]);
    let pipeline = SearchPipeline::with_transport(&test_config(), transport.clone()).unwrap();

    let result = pipeline.search("cable").await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(transport.attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn exhausted_connection_failures_surface_as_unreachable() {
    let transport = FakeTransport::always(Reply::Fail(TransportError::Connect("no route".into())));
    let pipeline = SearchPipeline::with_transport(&test_config(), transport.clone()).unwrap();

    let error = pipeline.search("cable").await.unwrap_err();

    assert!(matches!(error, SearchError::Unreachable { attempts: 3, .. }));
    assert_eq!(error.http_status(), 502);
}

#[tokio::test(start_paused = true)]
async fn missing_rating_keeps_the_record() {
    let page = results_page(&[Block::complete("B0001", "Unrated Widget", "15").without_rating()]);
    let transport = FakeTransport::always(Reply::ok(page));
    let pipeline = SearchPipeline::with_transport(&test_config(), transport).unwrap();

    let result = pipeline.search("widget").await.unwrap();

    assert_eq!(result.len(), 1);
    let listing = &result.listings[0];
    assert_eq!(listing.rating, "");
    assert_eq!(listing.title, "Unrated Widget");
    assert_eq!(listing.price, "15");
    assert!(!listing.image_url.is_empty());
    assert!(!listing.link.is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_title_drops_only_that_record() {
    let page = results_page(&[
        Block::complete("B0001", "First", "10"),
        Block::complete("B0002", "Nameless", "20").without_title(),
        Block::complete("B0003", "Priceless", "30").without_price(),
        Block::complete("B0004", "Fourth", "40"),
    ]);
    let transport = FakeTransport::always(Reply::ok(page));
    let pipeline = SearchPipeline::with_transport(&test_config(), transport).unwrap();

    let result = pipeline.search("things").await.unwrap();

    let titles: Vec<_> = result.listings.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, ["First", "Fourth"]);
    assert_eq!(result.diagnostics.blocks_located, 4);
    assert_eq!(result.diagnostics.records_dropped, 2);
}

#[tokio::test(start_paused = true)]
async fn cancellation_aborts_a_pending_fetch() {
    let transport = FakeTransport::always(Reply::Hang);
    let pipeline = SearchPipeline::with_transport(&test_config(), transport.clone()).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let error = pipeline
        .search_with_cancellation("headphones", &cancel)
        .await
        .unwrap_err();

    assert_eq!(error, SearchError::Cancelled);
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_backoff_stops_further_attempts() {
    let mut config = test_config();
    config.retry.base_delay_ms = 1_000;
    let transport = FakeTransport::always(Reply::Fail(TransportError::Connect("connection refused".into())));
    let pipeline = SearchPipeline::with_transport(&config, transport.clone()).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = tokio::time::Instant::now();
    let error = pipeline
        .search_with_cancellation("headphones", &cancel)
        .await
        .unwrap_err();

    assert_eq!(error, SearchError::Cancelled);
    assert_eq!(transport.attempts(), 1);
    assert!(started.elapsed() < Duration::from_millis(1_000));
}

#[tokio::test(start_paused = true)]
async fn concurrent_searches_are_independent() {
    let transport = FakeTransport::from_fn(|url, _| {
        let keyword = url
            .query_pairs()
            .find(|(key, _)| key == "k")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        Reply::ok(results_page(&[
            Block::complete("B1", &format!("{keyword} one"), "1"),
            Block::complete("B2", &format!("{keyword} two"), "2"),
        ]))
    });
    let pipeline = SearchPipeline::with_transport(&test_config(), transport.clone()).unwrap();

    let keywords = ["alpha", "beta", "gamma"];
    let results = join_all(keywords.iter().map(|keyword| pipeline.search(keyword))).await;

    for (keyword, result) in keywords.iter().zip(results) {
        let result = result.unwrap();
        let titles: Vec<_> = result.listings.iter().map(|l| l.title.clone()).collect();
        assert_eq!(titles, [format!("{keyword} one"), format!("{keyword} two")]);
    }
    assert_eq!(transport.attempts(), 3);
}

#[tokio::test]
async fn blank_keyword_never_reaches_the_network() {
    let transport = FakeTransport::always(Reply::ok(""));
    let pipeline = SearchPipeline::with_transport(&test_config(), transport.clone()).unwrap();

    let error = pipeline.search(" \t ").await.unwrap_err();

    assert!(matches!(error, SearchError::InvalidQuery(_)));
    assert_eq!(error.http_status(), 400);
    assert_eq!(transport.attempts(), 0);
}
