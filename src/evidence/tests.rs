use super::*;
use crate::knowledge::{KnowledgeError, MockKnowledgeStore};
use crate::scrape::MockScraper;
use crate::search::MockSearch;

fn keywords() -> Vec<String> {
    ["snow leopard", "Himalayas", "camera traps"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn fast_config() -> ResolverConfig {
    ResolverConfig {
        scrape_delay: Duration::ZERO,
        ..ResolverConfig::default()
    }
}

fn hits() -> Vec<SearchHit> {
    vec![
        SearchHit::new("Leopard census", "https://a.example/census", "short a"),
        SearchHit::new("Broken page", "https://b.example/404", "short b"),
        SearchHit::new("Ranger report", "https://c.example/report.pdf", "short c"),
    ]
}

fn scraper() -> MockScraper {
    MockScraper::new()
        .with_page("https://a.example/census", "Population stable at 4000")
        .with_page("https://c.example/report.pdf", "Rangers reduced poaching by 30%")
}

struct Harness {
    knowledge: Arc<MockKnowledgeStore>,
    search: Arc<MockSearch>,
    scraper: Arc<MockScraper>,
    resolver: EvidenceResolver,
}

fn harness(knowledge: MockKnowledgeStore, search: MockSearch, scraper: MockScraper) -> Harness {
    let knowledge = Arc::new(knowledge);
    let search = Arc::new(search);
    let scraper = Arc::new(scraper);
    let resolver = EvidenceResolver::new(
        knowledge.clone(),
        search.clone(),
        scraper.clone(),
        fast_config(),
    );
    Harness {
        knowledge,
        search,
        scraper,
        resolver,
    }
}

#[test]
fn test_build_query_format() {
    assert_eq!(
        build_query(EVIDENCE_QUERY_PREFIX, &keywords()),
        "wildlife conservation recent data snow leopard, Himalayas, camera traps"
    );
}

#[test]
fn test_build_query_is_idempotent() {
    let k = keywords();
    assert_eq!(
        build_query(EVIDENCE_QUERY_PREFIX, &k),
        build_query(EVIDENCE_QUERY_PREFIX, &k.clone())
    );
}

#[test]
fn test_format_search_results() {
    let formatted = format_search_results(&[
        SearchHit::new("A", "l1", "alpha"),
        SearchHit::new("B", "l2", "beta"),
    ]);
    assert_eq!(formatted, "- A: alpha\n- B: beta");
    assert_eq!(format_search_results(&[]), "");
}

#[tokio::test]
async fn test_two_cached_snippets_skip_search() {
    let h = harness(
        MockKnowledgeStore::with_snippets(["first snippet", "second snippet"]),
        MockSearch::new(hits()),
        scraper(),
    );

    let block = h.resolver.resolve(&keywords()).await.unwrap();

    assert_eq!(block.origin, EvidenceOrigin::Cache);
    assert_eq!(block.text, "first snippet\n\nsecond snippet");
    assert_eq!(h.search.call_count(), 0);
    assert_eq!(h.scraper.call_count(), 0);
    assert!(h.knowledge.added().is_empty());
}

#[tokio::test]
async fn test_one_cached_snippet_triggers_fallback() {
    let h = harness(
        MockKnowledgeStore::with_snippets(["only snippet"]),
        MockSearch::new(hits()),
        scraper(),
    );

    let block = h.resolver.resolve(&keywords()).await.unwrap();

    assert_eq!(block.origin, EvidenceOrigin::Search);
    assert_eq!(
        block.text,
        "- Leopard census: Population stable at 4000\n- Ranger report: Rangers reduced poaching by 30%"
    );
    assert_eq!(h.search.call_count(), 1);
    assert_eq!(h.scraper.call_count(), 3);
}

#[tokio::test]
async fn test_fallback_backfills_cache_with_metadata() {
    let h = harness(MockKnowledgeStore::new(), MockSearch::new(hits()), scraper());

    let block = h.resolver.resolve(&keywords()).await.unwrap();
    let query = h.resolver.query_for(&keywords());

    assert_eq!(h.knowledge.added(), vec![vec![block.text.clone()]]);
    let meta = h.knowledge.metadata();
    assert_eq!(meta[0].source, SEARCH_SNIPPET_SOURCE);
    assert_eq!(meta[0].query, query);
}

#[tokio::test]
async fn test_same_query_goes_to_cache_and_search() {
    let h = harness(MockKnowledgeStore::new(), MockSearch::new(hits()), scraper());

    h.resolver.resolve(&keywords()).await.unwrap();

    let expected = h.resolver.query_for(&keywords());
    assert_eq!(h.knowledge.queries(), vec![(expected.clone(), 3)]);
    assert_eq!(h.search.queries(), vec![(expected, 3)]);
}

#[tokio::test]
async fn test_all_scrapes_fail_gives_empty_without_backfill() {
    let h = harness(
        MockKnowledgeStore::with_snippets(["lonely snippet"]),
        MockSearch::new(hits()),
        MockScraper::new(),
    );

    let block = h.resolver.resolve(&keywords()).await.unwrap();

    assert_eq!(block, EvidenceBlock::empty());
    assert!(block.is_empty());
    assert!(h.knowledge.added().is_empty());
}

#[tokio::test]
async fn test_no_search_results_gives_empty() {
    let h = harness(MockKnowledgeStore::new(), MockSearch::new(vec![]), scraper());

    let block = h.resolver.resolve(&keywords()).await.unwrap();

    assert_eq!(block.origin, EvidenceOrigin::Empty);
    assert_eq!(h.scraper.call_count(), 0);
}

#[tokio::test]
async fn test_search_failure_is_fatal() {
    let h = harness(MockKnowledgeStore::new(), MockSearch::failing(), scraper());

    assert!(matches!(
        h.resolver.resolve(&keywords()).await,
        Err(ResolutionError::Search(_))
    ));
}

#[tokio::test]
async fn test_backfill_failure_is_fatal() {
    let h = harness(
        MockKnowledgeStore::new().failing_add(),
        MockSearch::new(hits()),
        scraper(),
    );

    assert!(matches!(
        h.resolver.resolve(&keywords()).await,
        Err(ResolutionError::Knowledge(KnowledgeError::Io(_)))
    ));
}

#[tokio::test]
async fn test_respects_configured_threshold() {
    let knowledge = Arc::new(MockKnowledgeStore::with_snippets(["a", "b"]));
    let search = Arc::new(MockSearch::new(hits()));
    let resolver = EvidenceResolver::new(
        knowledge,
        search.clone(),
        Arc::new(scraper()),
        ResolverConfig {
            min_cache_hits: 3,
            ..fast_config()
        },
    );

    let block = resolver.resolve(&keywords()).await.unwrap();

    assert_eq!(block.origin, EvidenceOrigin::Search);
    assert_eq!(search.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_scrape_delay_between_calls() {
    let knowledge = Arc::new(MockKnowledgeStore::new());
    let resolver = EvidenceResolver::new(
        knowledge,
        Arc::new(MockSearch::new(hits())),
        Arc::new(scraper()),
        ResolverConfig::default(),
    );

    let started = tokio::time::Instant::now();
    resolver.resolve(&keywords()).await.unwrap();

    // Three scrapes, two pauses.
    assert_eq!(started.elapsed(), DEFAULT_SCRAPE_DELAY * 2);
}
