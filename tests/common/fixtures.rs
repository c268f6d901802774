//! Shared mock wiring for pipeline integration tests.

use std::sync::Arc;
use std::time::Duration;

use wildscore::{
    MockKnowledgeStore, MockReasoner, MockScraper, MockSearch, Pipeline, ResolverConfig,
    SearchHit, Services,
};

pub const SNOW_LEOPARD_PROJECT: &str = "Protecting snow leopards in the Himalayas through community-based conservation and camera trap monitoring. Local herders are trained as rangers and compensated for livestock losses.";

pub const POLAR_BEAR_PROJECT: &str = "Save polar bears.";

pub const SNOW_LEOPARD_KEYWORDS: &str =
    "snow leopard, Himalayas, camera traps, community rangers, livestock compensation";

pub const SNOW_LEOPARD_SCORE: &str = r#"```json
{
    "score_breakdown": {
        "conservation_science_alignment": 21,
        "community_impact": 17,
        "biodiversity_outcomes": 24,
        "sustainability": 11,
        "replicability": 8
    },
    "final_score": 81
}
```"#;

pub struct Fixture {
    pub reasoner: Arc<MockReasoner>,
    pub knowledge: Arc<MockKnowledgeStore>,
    pub search: Arc<MockSearch>,
    pub scraper: Arc<MockScraper>,
    pub pipeline: Pipeline,
}

pub fn resolver_config() -> ResolverConfig {
    ResolverConfig {
        scrape_delay: Duration::ZERO,
        ..ResolverConfig::default()
    }
}

pub fn leopard_hits() -> Vec<SearchHit> {
    vec![
        SearchHit::new(
            "Snow leopard population survey",
            "https://conservation.example/survey",
            "A survey",
        ),
        SearchHit::new(
            "Himalayan ranger report",
            "https://conservation.example/rangers.pdf",
            "A report",
        ),
        SearchHit::new("Dead link", "https://conservation.example/gone", "Gone"),
    ]
}

pub fn leopard_scraper() -> MockScraper {
    MockScraper::new()
        .with_page(
            "https://conservation.example/survey",
            "Camera traps recorded 42 individuals in 2023",
        )
        .with_page(
            "https://conservation.example/rangers.pdf",
            "Community rangers cut retaliatory killings by half",
        )
}

pub fn fixture(
    responses: &[&str],
    knowledge: MockKnowledgeStore,
    search: MockSearch,
    scraper: MockScraper,
) -> Fixture {
    let reasoner = Arc::new(MockReasoner::with_responses(responses.iter().copied()));
    let knowledge = Arc::new(knowledge);
    let search = Arc::new(search);
    let scraper = Arc::new(scraper);

    let pipeline = Pipeline::new(
        Services {
            reasoner: reasoner.clone(),
            knowledge: knowledge.clone(),
            search: search.clone(),
            scraper: scraper.clone(),
        },
        resolver_config(),
        2,
    );

    Fixture {
        reasoner,
        knowledge,
        search,
        scraper,
        pipeline,
    }
}
