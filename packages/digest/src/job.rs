//! One digest run: curate, write the report, deliver.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use curation::{
    deliver, render_markdown, render_message, report_caption, Aggregator, ArxivFetcher,
    CrossrefEnricher, DeliveryChannel, OpenAiLlm, RunReport, RunSummary, SemanticScholarEnricher,
    SqliteSeenStore, Summarizer, TelegramChannel,
};
use scholar_client::{
    ArxivClient, CrossrefClient, SemanticScholarClient, SourceLimiter, ARXIV_MIN_INTERVAL,
};
use telegram::{TelegramOptions, TelegramService};

use crate::config::{DigestConfig, Secrets};

/// Everything needed to produce and send one digest.
pub struct DigestJob {
    aggregator: Aggregator,
    channel: Option<Arc<dyn DeliveryChannel>>,
    report_dir: PathBuf,
}

impl DigestJob {
    pub fn new(
        aggregator: Aggregator,
        channel: Option<Arc<dyn DeliveryChannel>>,
        report_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            aggregator,
            channel,
            report_dir: report_dir.into(),
        }
    }

    /// Wire the real clients from configuration and environment.
    pub async fn from_config(config: &DigestConfig, secrets: &Secrets) -> Result<Self> {
        let summarizer = if secrets.has_openai_key {
            let llm = OpenAiLlm::from_env().context("Invalid OpenAI configuration")?;
            info!(model = llm.model(), "LLM summarization enabled");
            Summarizer::new(Arc::new(llm), config.summarizer.clone())
        } else {
            warn!("OPENAI_API_KEY not set, summaries will be extractive only");
            Summarizer::extractive_only(config.summarizer.clone())
        };

        let store = SqliteSeenStore::new(&secrets.database_url)
            .await
            .context("Failed to open dedup store")?;

        let arxiv = ArxivClient::new(SourceLimiter::min_interval("arxiv", ARXIV_MIN_INTERVAL))?;
        let has_s2_key = secrets.s2_api_key.is_some();
        let s2 = SemanticScholarClient::new(
            secrets.s2_api_key.clone(),
            SemanticScholarClient::default_limiter(has_s2_key),
        )?;
        let crossref = CrossrefClient::new(
            secrets.crossref_mailto.clone(),
            CrossrefClient::default_limiter(),
        )?;

        let aggregator = Aggregator::new(
            Arc::new(ArxivFetcher::new(arxiv)),
            Arc::new(store),
            summarizer,
        )
        .with_enricher(Arc::new(SemanticScholarEnricher::new(s2)))
        .with_enricher(Arc::new(CrossrefEnricher::new(crossref)))
        .with_config(config.aggregator.clone())
        .with_scoring(config.scoring.clone());
        aggregator
            .check_config()
            .context("Invalid scoring configuration")?;

        let channel: Option<Arc<dyn DeliveryChannel>> = if secrets.has_telegram() {
            let service = TelegramService::new(TelegramOptions {
                bot_token: secrets.telegram_bot_token.clone().unwrap_or_default(),
                chat_id: secrets.telegram_chat_id.clone().unwrap_or_default(),
            });
            Some(Arc::new(TelegramChannel::new(service)))
        } else {
            warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set, digest will only be logged");
            None
        };

        Ok(Self::new(aggregator, channel, &config.output.report_dir))
    }

    pub async fn run_once(&self) -> Result<RunSummary> {
        self.run_at(Utc::now()).await
    }

    /// Run as of `now`. Fails only when the curation run itself aborts.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        info!(run_at = %now, "Starting digest run");
        let report = self
            .aggregator
            .run(now)
            .await
            .context("Digest run aborted")?;
        let date = now.date_naive();

        let report_file = if report.is_empty() {
            None
        } else {
            match self.write_report(&report, date).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(error = %format!("{:#}", e), "Report file not written, delivering text only");
                    None
                }
            }
        };

        let mut summary = report.summary.clone();
        let message = render_message(&report, date);
        match &self.channel {
            Some(channel) => {
                let caption = report_caption(&report, date);
                let file = report_file.as_deref().map(|p| (p, caption.as_str()));
                let delivery = deliver(channel.as_ref(), &message, file).await;
                delivery.record(&mut summary);
            }
            None => info!(digest = %message, "Digest (no delivery channel)"),
        }

        log_summary(&summary, report.papers.len());
        Ok(summary)
    }

    async fn write_report(&self, report: &RunReport, date: NaiveDate) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.report_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.report_dir.display()))?;
        let path = report_path(&self.report_dir, date);
        tokio::fs::write(&path, render_markdown(report, date))
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Report saved");
        Ok(path)
    }
}

/// `report_YYYYMMDD.md` inside `dir`.
pub fn report_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("report_{}.md", date.format("%Y%m%d")))
}

fn log_summary(summary: &RunSummary, delivered: usize) {
    info!(
        fetched = summary.fetched,
        new = summary.new,
        skipped_seen = summary.skipped_seen,
        prefiltered_out = summary.prefiltered_out,
        selected = delivered,
        enrichment_failures = summary.enrichment_failures.len(),
        structuring_fallbacks = summary.structuring_fallbacks,
        compression_fallbacks = summary.compression_fallbacks,
        delivery_failures = summary.delivery_failures.len(),
        "Digest run finished"
    );
    if summary.is_degraded() {
        for failure in &summary.enrichment_failures {
            warn!(paper_id = %failure.paper_id, source = %failure.source, error = %failure.message, "Enrichment failure");
        }
        for failure in &summary.delivery_failures {
            warn!(error = %failure, "Delivery failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curation::testing::{test_paper, test_time, MockChannel, MockDelivery, MockFetcher, MockLlm};
    use curation::{AggregatorConfig, MemorySeenStore, SummarizerConfig};

    fn job(channel: Arc<MockChannel>, dir: &Path, fetcher: MockFetcher) -> DigestJob {
        let aggregator = Aggregator::new(
            Arc::new(fetcher),
            Arc::new(MemorySeenStore::new()),
            Summarizer::new(Arc::new(MockLlm::new()), SummarizerConfig::default()),
        )
        .with_config(AggregatorConfig::new().with_top_n(2));
        DigestJob::new(aggregator, Some(channel), dir)
    }

    #[tokio::test]
    async fn test_run_writes_report_and_delivers() {
        let dir = tempfile::tempdir().unwrap();
        let channel = Arc::new(MockChannel::new());
        let papers = vec![test_paper("a"), test_paper("b"), test_paper("c")];
        let job = job(channel.clone(), dir.path(), MockFetcher::new(papers));

        let summary = job.run_at(test_time()).await.unwrap();
        assert_eq!(summary.new, 3);
        assert!(summary.delivery_failures.is_empty());

        let path = report_path(dir.path(), test_time().date_naive());
        assert!(path.ends_with("report_20240220.md"));
        let markdown = std::fs::read_to_string(&path).unwrap();
        assert!(markdown.contains("## 2. Paper b"));

        let sent = channel.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[0], MockDelivery::Text(t) if t.contains("2 papers selected")));
        assert!(matches!(&sent[1], MockDelivery::File { path: p, .. } if *p == path));
    }

    #[tokio::test]
    async fn test_empty_run_sends_notice_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let channel = Arc::new(MockChannel::new());
        let job = job(channel.clone(), dir.path(), MockFetcher::new(Vec::new()));

        job.run_at(test_time()).await.unwrap();

        let sent = channel.sent();
        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], MockDelivery::Text(t) if t.contains("No new papers today")));
        assert!(!report_path(dir.path(), test_time().date_naive()).exists());
    }

    #[tokio::test]
    async fn test_delivery_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let channel = Arc::new(MockChannel::new().failing_text().failing_files());
        let job = job(channel, dir.path(), MockFetcher::new(vec![test_paper("a")]));

        let summary = job.run_at(test_time()).await.unwrap();
        assert_eq!(summary.delivery_failures.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let channel = Arc::new(MockChannel::new());
        let job = job(channel.clone(), dir.path(), MockFetcher::failing());

        assert!(job.run_at(test_time()).await.is_err());
        assert!(channel.sent().is_empty());
    }
}
