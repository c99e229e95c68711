//! Aggregator - fetch, dedup, enrich, rank and summarize one run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, CurationError, Result};
use crate::scoring::keyword::{count_hits, normalize_keywords};
use crate::pipeline::relevance::select_relevant;
use crate::scoring::ScorerRegistry;
use crate::summarize::Summarizer;
use crate::traits::{
    enricher::Enricher,
    fetcher::{FetchQuery, Fetcher},
    store::SeenStore,
};
use crate::types::{
    config::{AggregatorConfig, ScoringConfig},
    paper::Paper,
    report::{EnrichmentFailure, RunReport, RunSummary},
    scored::CuratedPaper,
};

/// Orchestrates one curation run over its collaborators.
///
/// Holds no state between runs; the seen-store is the only thing that
/// persists.
pub struct Aggregator {
    fetcher: Arc<dyn Fetcher>,
    enrichers: Vec<Arc<dyn Enricher>>,
    store: Arc<dyn SeenStore>,
    summarizer: Summarizer,
    registry: ScorerRegistry,
    scoring: ScoringConfig,
    config: AggregatorConfig,
}

impl Aggregator {
    /// Create an aggregator with default scoring and run settings.
    pub fn new(fetcher: Arc<dyn Fetcher>, store: Arc<dyn SeenStore>, summarizer: Summarizer) -> Self {
        Self {
            fetcher,
            enrichers: Vec::new(),
            store,
            summarizer,
            registry: ScorerRegistry::builtin(),
            scoring: ScoringConfig::default(),
            config: AggregatorConfig::default(),
        }
    }

    /// Add an enrichment source. Sources run in the order added.
    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enrichers.push(enricher);
        self
    }

    pub fn with_config(mut self, config: AggregatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Use a custom scorer registry.
    pub fn with_registry(mut self, registry: ScorerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Names of the configured enrichment sources.
    pub fn enricher_sources(&self) -> Vec<&str> {
        self.enrichers.iter().map(|e| e.source()).collect()
    }

    /// Validate run settings and build the scoring pipeline once.
    pub fn check_config(&self) -> std::result::Result<(), ConfigError> {
        self.config.validate()?;
        self.summarizer.config().validate()?;
        self.registry.build(&self.scoring, Utc::now()).map(|_| ())
    }

    /// Run the pipeline as of `now`.
    ///
    /// Fails only on fetch, dedup store, LLM auth or config errors. Every
    /// other failure is recorded in the report's [`RunSummary`]. Papers are
    /// marked seen only after everything else succeeded.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunReport> {
        self.config.validate()?;
        self.summarizer.config().validate()?;
        let pipeline = self.registry.build(&self.scoring, now)?;
        let mut summary = RunSummary::new();

        // 1. Fetch
        let query = FetchQuery::new(
            self.config.categories.clone(),
            now - Duration::days(i64::from(self.config.lookback_days)),
            now,
        )
        .with_max_results(self.config.max_results);
        info!(
            categories = ?query.categories,
            since = %query.since,
            max_results = query.max_results,
            "Fetching papers"
        );
        let fetched = self.fetcher.fetch(&query).await?;
        summary.fetched = fetched.len();

        // 2. Dedup against this run and earlier runs
        let mut ids_this_run = HashSet::new();
        let mut candidates = Vec::new();
        for paper in fetched {
            if !ids_this_run.insert(paper.id.clone()) {
                debug!(paper_id = %paper.id, "Duplicate id in fetch result");
                continue;
            }
            if self.store.has_seen(&paper.id).await? {
                summary.skipped_seen += 1;
                continue;
            }
            candidates.push(paper);
        }
        summary.new = candidates.len();
        let new_ids: Vec<String> = candidates.iter().map(|p| p.id.clone()).collect();
        info!(
            fetched = summary.fetched,
            new = summary.new,
            skipped_seen = summary.skipped_seen,
            "Deduplicated papers"
        );

        if candidates.is_empty() {
            info!("No new papers this run");
            return Ok(RunReport::empty(now, summary));
        }

        // 3. Narrow by research interests or keywords
        let candidates = self.narrow(candidates, &mut summary).await?;

        // 4. Enrich
        let (enriched, failures) = self.enrich_all(candidates).await;
        summary.enrichment_failures = failures;

        // 5. Rank
        let ranked = pipeline.rank(&enriched);
        if let Some(best) = ranked.first() {
            info!(
                candidates = ranked.len(),
                best_id = %best.paper.id,
                best_total = best.total,
                "Ranked papers"
            );
        }

        // 6. Summarize top-N
        let mut papers = Vec::with_capacity(self.config.top_n.min(ranked.len()));
        for scored in ranked.iter().take(self.config.top_n) {
            let paper_summary = self.summarizer.summarize(&scored.paper).await?;
            if !paper_summary.structured_by_llm {
                summary.structuring_fallbacks += 1;
            }
            if !paper_summary.compressed_by_llm {
                summary.compression_fallbacks += 1;
            }
            papers.push(CuratedPaper {
                scored: scored.clone(),
                summary: paper_summary,
            });
        }

        // 7. Persist seen-state last
        self.store.mark_all_seen(&new_ids).await?;

        info!(
            selected = papers.len(),
            enrichment_failures = summary.enrichment_failures.len(),
            structuring_fallbacks = summary.structuring_fallbacks,
            compression_fallbacks = summary.compression_fallbacks,
            "Run complete"
        );

        Ok(RunReport {
            run_at: now,
            ranked,
            papers,
            summary,
        })
    }

    /// Apply the relevance filter when interests are set, else the
    /// optional keyword prefilter.
    ///
    /// Only an LLM auth failure escapes; any other relevance failure falls
    /// back to keywords.
    async fn narrow(&self, candidates: Vec<Paper>, summary: &mut RunSummary) -> Result<Vec<Paper>> {
        let Some(interests) = self.config.interests() else {
            return Ok(self.prefilter(candidates, self.config.prefilter_limit, summary));
        };

        let limit = self.config.relevance_limit;
        let fallback_limit = self.config.prefilter_limit.unwrap_or(limit);
        let Some(llm) = self.summarizer.llm() else {
            warn!("Research interests set but no LLM configured, using keyword prefilter");
            summary.relevance_fallback = true;
            return Ok(self.prefilter(candidates, Some(fallback_limit), summary));
        };

        match select_relevant(llm, interests, &candidates, limit).await {
            Ok(ids) if !ids.is_empty() => {
                let total = candidates.len();
                let mut by_id: HashMap<String, Paper> =
                    candidates.into_iter().map(|p| (p.id.clone(), p)).collect();
                let kept: Vec<Paper> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
                summary.prefiltered_out = total - kept.len();
                info!(kept = kept.len(), dropped = summary.prefiltered_out, "Relevance filter");
                Ok(kept)
            }
            Ok(_) => {
                warn!("Relevance reply named no fetched paper, using keyword prefilter");
                summary.relevance_fallback = true;
                Ok(self.prefilter(candidates, Some(fallback_limit), summary))
            }
            Err(e) if e.is_auth() => Err(CurationError::LlmAuth(e.to_string())),
            Err(e) => {
                warn!(error = %e, "Relevance filter failed, using keyword prefilter");
                summary.relevance_fallback = true;
                Ok(self.prefilter(candidates, Some(fallback_limit), summary))
            }
        }
    }

    /// Keep the `limit` papers with the most keyword hits.
    ///
    /// Stable, so equal hit counts keep fetch order.
    fn prefilter(
        &self,
        candidates: Vec<Paper>,
        limit: Option<usize>,
        summary: &mut RunSummary,
    ) -> Vec<Paper> {
        let Some(limit) = limit else {
            return candidates;
        };
        if candidates.len() <= limit {
            return candidates;
        }

        let keywords = normalize_keywords(&self.scoring.keyword.keywords);
        let mut with_hits: Vec<(usize, Paper)> = candidates
            .into_iter()
            .map(|p| (count_hits(&keywords, &p.searchable_text()), p))
            .collect();
        with_hits.sort_by(|a, b| b.0.cmp(&a.0));

        summary.prefiltered_out = with_hits.len() - limit;
        info!(kept = limit, dropped = summary.prefiltered_out, "Keyword prefilter");
        with_hits.into_iter().take(limit).map(|(_, p)| p).collect()
    }

    /// Enrich every paper with every source, preserving input order.
    async fn enrich_all(&self, papers: Vec<Paper>) -> (Vec<Paper>, Vec<EnrichmentFailure>) {
        if self.enrichers.is_empty() {
            return (papers, Vec::new());
        }

        let results: Vec<(Paper, Vec<EnrichmentFailure>)> = stream::iter(papers)
            .map(|paper| self.enrich_one(paper))
            .buffered(self.config.enrichment_concurrency.max(1))
            .collect()
            .await;

        let mut enriched = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (paper, paper_failures) in results {
            enriched.push(paper);
            failures.extend(paper_failures);
        }
        (enriched, failures)
    }

    async fn enrich_one(&self, paper: Paper) -> (Paper, Vec<EnrichmentFailure>) {
        let mut current = paper;
        let mut failures = Vec::new();

        for enricher in &self.enrichers {
            match enricher.enrich(&current).await {
                Ok(patch) => {
                    current = current.enriched(&patch);
                }
                Err(e) => {
                    warn!(
                        paper_id = %current.id,
                        source = enricher.source(),
                        error = %e,
                        "Enrichment failed"
                    );
                    failures.push(EnrichmentFailure {
                        paper_id: current.id.clone(),
                        source: enricher.source().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        (current, failures)
    }
}
