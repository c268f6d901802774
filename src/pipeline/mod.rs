//! Pipeline orchestrator.
//!
//! `Normalize -> Extract -> (Insufficient: zero score) -> Resolve -> Score`.
//! One attempt per stage, no retries. Stages run sequentially within an invocation;
//! concurrent invocations share only the knowledge cache.


use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span, instrument};

use crate::config::Config;
use crate::embedding::{Embedder, HttpEmbedder, MemoEmbedder, StubEmbedder};
use crate::error::PipelineError;
use crate::evidence::{EvidenceResolver, ResolverConfig};
use crate::keywords::{KeywordExtractor, KeywordSet};
use crate::knowledge::{DiskKnowledgeCache, KnowledgeStore};
use crate::reasoning::{GenaiReasoner, ReasoningService};
use crate::scoring::{ScoreResult, Scorer};
use crate::scrape::{PageScraper, WebScraper};
use crate::search::{DisabledSearch, GoogleSearch, SearchService};
use crate::text::normalize;

/// The external capabilities a pipeline runs on.
#[derive(Clone)]
pub struct Services {
    pub reasoner: Arc<dyn ReasoningService>,
    pub knowledge: Arc<dyn KnowledgeStore>,
    pub search: Arc<dyn SearchService>,
    pub scraper: Arc<dyn PageScraper>,
}

pub struct Pipeline {
    extractor: KeywordExtractor,
    resolver: EvidenceResolver,
    scorer: Scorer,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("extractor", &self.extractor)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Wires a pipeline from arbitrary service implementations.
    pub fn new(
        services: Services,
        resolver_config: ResolverConfig,
        min_keyword_categories: usize,
    ) -> Self {
        Self {
            extractor: KeywordExtractor::with_min_categories(
                Arc::clone(&services.reasoner),
                min_keyword_categories,
            ),
            resolver: EvidenceResolver::new(
                services.knowledge,
                services.search,
                services.scraper,
                resolver_config,
            ),
            scorer: Scorer::new(services.reasoner),
        }
    }

    /// Production wiring: `genai` reasoner, Google search, web scraper and the disk
    /// knowledge cache at `config.cache_path`.
    pub async fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let knowledge = open_knowledge(config).await?;
        let services = production_services(config, knowledge)?;
        Ok(Self::new(
            services,
            config.resolver_config(),
            config.min_keyword_categories,
        ))
    }

    /// Scores one project description.
    ///
    /// `Ok` covers every defined outcome (score, zero score for insufficient input,
    /// format-error envelope). `Err` is reserved for empty input and fatal failures.
    #[instrument(skip_all, fields(input_len = raw_text.len()))]
    pub async fn run(&self, raw_text: &str) -> Result<ScoreResult, PipelineError> {
        if raw_text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let text = normalize(raw_text);
        debug!(words = crate::text::word_count(&text), "Normalized project text");

        let keywords = self
            .extractor
            .extract(&text)
            .instrument(info_span!("extract"))
            .await?;

        let keywords = match keywords {
            KeywordSet::Insufficient => {
                info!("Insufficient project text; returning zero score");
                return Ok(ScoreResult::zero());
            }
            KeywordSet::Keywords(keywords) => keywords,
        };

        let evidence = self
            .resolver
            .resolve(&keywords)
            .instrument(info_span!("resolve"))
            .await?;
        debug!(origin = ?evidence.origin, chars = evidence.text.len(), "Evidence resolved");

        let result = self
            .scorer
            .score(&text, &evidence.text)
            .instrument(info_span!("score"))
            .await?;

        Ok(result)
    }
}

/// Runs the pipeline and returns the JSON mapping handed to the HTTP layer.
pub async fn run_pipeline(
    pipeline: &Pipeline,
    text: &str,
) -> Result<serde_json::Value, PipelineError> {
    Ok(pipeline.run(text).await?.to_value())
}

/// Embedder selected by `config`, wrapped in the in-memory memo.
pub fn embedder_from_config(config: &Config) -> Result<Arc<dyn Embedder>, PipelineError> {
    let inner: Arc<dyn Embedder> = match (&config.openai_api_key, config.stub_embedder) {
        (Some(key), false) => Arc::new(HttpEmbedder::new(
            &config.embedding_url,
            &config.embedding_model,
            key,
            config.embedding_dim,
        )?),
        _ => {
            info!(dim = config.embedding_dim, "Using stub embedder");
            Arc::new(StubEmbedder::new(config.embedding_dim)?)
        }
    };
    Ok(Arc::new(MemoEmbedder::new(inner)))
}

/// Opens (or creates) the disk knowledge cache described by `config`.
pub async fn open_knowledge(config: &Config) -> Result<Arc<DiskKnowledgeCache>, PipelineError> {
    let embedder = embedder_from_config(config)?;
    let cache = DiskKnowledgeCache::open(config.knowledge_config(), embedder).await?;
    Ok(Arc::new(cache))
}

/// Production services around an already opened knowledge store.
pub fn production_services(
    config: &Config,
    knowledge: Arc<dyn KnowledgeStore>,
) -> Result<Services, PipelineError> {
    let search: Arc<dyn SearchService> = match config.search_credentials() {
        Ok((key, cx)) => Arc::new(GoogleSearch::with_endpoint(&config.search_url, key, cx)),
        Err(e) => {
            info!(reason = %e, "Search disabled");
            Arc::new(DisabledSearch::new(e.to_string()))
        }
    };

    Ok(Services {
        reasoner: Arc::new(GenaiReasoner::new(&config.reasoning_model)),
        knowledge,
        search,
        scraper: Arc::new(WebScraper::new(config.scrape_timeout)?),
    })
}
