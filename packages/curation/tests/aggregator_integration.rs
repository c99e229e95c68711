//! End-to-end runs of the aggregator against in-crate mocks.

use std::collections::HashSet;
use std::sync::Arc;

use curation::testing::{
    test_paper, test_time, MockChannel, MockDelivery, MockEnricher, MockFetcher, MockLlm,
};
use curation::{
    deliver, render_markdown, render_message, report_caption, Aggregator, AggregatorConfig,
    CurationError, Enrichment, LlmError, MemorySeenStore, Paper, SeenStore, Summarizer,
    SummarizerConfig,
};

fn five_papers() -> Vec<Paper> {
    ["p1", "p2", "p3", "p4", "p5"]
        .iter()
        .map(|id| test_paper(id))
        .collect()
}

fn s2_enricher() -> MockEnricher {
    MockEnricher::new("semantic_scholar")
        .with_patch("p1", Enrichment::new().with_citations(100, 10))
        .with_patch("p2", Enrichment::new().with_citations(50, 0))
        .with_patch("p4", Enrichment::new().with_citations(20, 0))
        .with_patch("p5", Enrichment::new().with_citations(5, 0))
        .fail_for("p3")
}

fn aggregator(
    fetcher: MockFetcher,
    store: Arc<MemorySeenStore>,
    llm: Arc<MockLlm>,
    enricher: Arc<MockEnricher>,
) -> Aggregator {
    Aggregator::new(
        Arc::new(fetcher),
        store,
        Summarizer::new(llm, SummarizerConfig::default()),
    )
    .with_enricher(enricher)
    .with_enricher(Arc::new(MockEnricher::new("crossref")))
    .with_config(AggregatorConfig::new().with_top_n(3))
}

#[tokio::test]
async fn test_enrichment_failure_does_not_drop_paper() {
    let store = Arc::new(MemorySeenStore::new());
    let llm = Arc::new(MockLlm::new());
    let enricher = Arc::new(s2_enricher());
    let aggregator = aggregator(
        MockFetcher::new(five_papers()),
        store.clone(),
        llm.clone(),
        enricher.clone(),
    );

    let report = aggregator.run(test_time()).await.unwrap();

    assert_eq!(report.ranked.len(), 5);
    assert!(report.ranked.iter().any(|s| s.id() == "p3"));
    assert_eq!(report.summary.enrichment_failures.len(), 1);
    assert_eq!(report.summary.enrichment_failures[0].paper_id, "p3");
    assert_eq!(report.summary.failures_for("semantic_scholar"), 1);
    assert!(report.summary.is_degraded());
    assert_eq!(store.seen_count().await.unwrap(), 5);
}

#[tokio::test]
async fn test_top_n_distinct_and_descending() {
    let aggregator = aggregator(
        MockFetcher::new(five_papers()),
        Arc::new(MemorySeenStore::new()),
        Arc::new(MockLlm::new()),
        Arc::new(s2_enricher()),
    );

    let report = aggregator.run(test_time()).await.unwrap();

    let ids: Vec<&str> = report.papers.iter().map(|c| c.paper().id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2", "p4"]);
    let distinct: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(distinct.len(), 3);
    for pair in report.papers.windows(2) {
        assert!(pair[0].total() >= pair[1].total());
    }
    for curated in &report.papers {
        assert!((0.0..=100.0).contains(&curated.total()));
        assert!(curated.summary.bullets.iter().all(|b| !b.is_empty()));
    }
}

#[tokio::test]
async fn test_seen_paper_is_not_reprocessed() {
    let store = Arc::new(MemorySeenStore::with_seen(["p1"]));
    let llm = Arc::new(MockLlm::new());
    let enricher = Arc::new(s2_enricher());
    let aggregator = aggregator(
        MockFetcher::new(five_papers()),
        store,
        llm.clone(),
        enricher.clone(),
    );

    let report = aggregator.run(test_time()).await.unwrap();

    assert_eq!(report.summary.skipped_seen, 1);
    assert!(report.ranked.iter().all(|s| s.id() != "p1"));
    assert!(!enricher.calls().contains(&"p1".to_string()));
    assert!(llm
        .calls()
        .iter()
        .all(|call| !call.prompt.user.contains("Paper p1")));
}

#[tokio::test]
async fn test_second_run_finds_nothing_new() {
    let store = Arc::new(MemorySeenStore::new());
    let aggregator = aggregator(
        MockFetcher::new(five_papers()),
        store,
        Arc::new(MockLlm::new()),
        Arc::new(s2_enricher()),
    );

    let first = aggregator.run(test_time()).await.unwrap();
    assert_eq!(first.papers.len(), 3);

    let second = aggregator.run(test_time()).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(second.summary.skipped_seen, 5);
    assert!(render_message(&second, test_time().date_naive()).contains("No new papers today"));
}

#[tokio::test]
async fn test_fetch_failure_aborts_run() {
    let store = Arc::new(MemorySeenStore::new());
    let llm = Arc::new(MockLlm::new());
    let aggregator = aggregator(
        MockFetcher::failing(),
        store.clone(),
        llm.clone(),
        Arc::new(s2_enricher()),
    );

    let err = aggregator.run(test_time()).await.unwrap_err();
    assert!(matches!(err, CurationError::Fetch(_)));
    assert!(llm.calls().is_empty());
    assert_eq!(store.seen_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_llm_auth_failure_aborts_and_marks_nothing() {
    let store = Arc::new(MemorySeenStore::new());
    let llm = Arc::new(MockLlm::new().failing(LlmError::Auth("invalid api key".into())));
    let aggregator = aggregator(
        MockFetcher::new(five_papers()),
        store.clone(),
        llm,
        Arc::new(s2_enricher()),
    );

    let err = aggregator.run(test_time()).await.unwrap_err();
    assert!(matches!(err, CurationError::LlmAuth(_)));
    assert_eq!(store.seen_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unavailable_llm_degrades_to_extracted_sentences() {
    let llm = Arc::new(MockLlm::new().failing(LlmError::Request("503 overloaded".into())));
    let aggregator = aggregator(
        MockFetcher::new(five_papers()),
        Arc::new(MemorySeenStore::new()),
        llm,
        Arc::new(s2_enricher()),
    );

    let report = aggregator.run(test_time()).await.unwrap();

    assert_eq!(report.papers.len(), 3);
    assert_eq!(report.summary.structuring_fallbacks, 3);
    assert_eq!(report.summary.compression_fallbacks, 3);
    for curated in &report.papers {
        assert!(curated.summary.is_fallback());
        assert_eq!(curated.summary.bullets[0], "We study a problem.");
    }
}

#[tokio::test]
async fn test_render_and_deliver() {
    let aggregator = aggregator(
        MockFetcher::new(five_papers()),
        Arc::new(MemorySeenStore::new()),
        Arc::new(MockLlm::new()),
        Arc::new(s2_enricher()),
    );
    let mut report = aggregator.run(test_time()).await.unwrap();
    let date = test_time().date_naive();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("digest.md");
    std::fs::write(&path, render_markdown(&report, date)).unwrap();

    let channel = MockChannel::new().failing_files();
    let message = render_message(&report, date);
    let caption = report_caption(&report, date);
    let delivery = deliver(&channel, &message, Some((path.as_path(), caption.as_str()))).await;
    delivery.record(&mut report.summary);

    assert!(delivery.message_sent);
    assert!(!delivery.file_sent);
    assert_eq!(report.summary.delivery_failures.len(), 1);
    assert_eq!(channel.sent(), vec![MockDelivery::Text(message.clone())]);
    assert!(message.contains("1. Paper p1"));
    assert!(message.contains("📈 100 citations"));
}
