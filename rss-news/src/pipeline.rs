use crate::classifier::{Classifier, ClassifierConfig, Verdict};
use crate::dedup::deduplicate;
use crate::fetcher::{FeedFetcher, HttpFeedFetcher};
use crate::normalizer::Normalizer;
use crate::options::{FetchConfig, FetchOptions};
use crate::ordering::order_and_limit;
use crate::summarization::SummarizationStage;
use crate::summarizer::{build_summarizer, Summarizer};
use crate::timestamp::resolve_published_at;
use crate::types::{FeedOutcome, NewsItem, RawEntry, Result};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetch → classify → normalize → deduplicate → order → (summarize).
///
/// Each call to [`NewsPipeline::fetch`] is independent; nothing is remembered
/// between calls.
pub struct NewsPipeline {
    options: FetchOptions,
    fetcher: Arc<dyn FeedFetcher>,
    classifier: Classifier,
    normalizer: Normalizer,
    summarization: Option<SummarizationStage>,
    max_concurrent_feeds: usize,
}

impl NewsPipeline {
    /// HTTP fetcher with default settings and the provider named in `options`.
    pub fn new(options: FetchOptions) -> Result<Self> {
        PipelineBuilder::new(options).build()
    }

    pub fn builder(options: FetchOptions) -> PipelineBuilder {
        PipelineBuilder::new(options)
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetch every URL and return the accepted news items, newest first.
    ///
    /// Failing URLs contribute nothing. The result may be empty.
    pub async fn fetch<S: AsRef<str>>(&self, urls: &[S]) -> Vec<NewsItem> {
        let outcomes = self.fetch_outcomes(urls).await;

        let entries: Vec<RawEntry> = outcomes
            .into_iter()
            .filter_map(|outcome| outcome.result.ok())
            .flatten()
            .collect();

        self.process_entries(entries).await
    }

    /// One outcome per URL, in input order, whatever the completion order was.
    pub async fn fetch_outcomes<S: AsRef<str>>(&self, urls: &[S]) -> Vec<FeedOutcome> {
        let outcomes: Vec<FeedOutcome> = stream::iter(urls.iter().map(|u| u.as_ref().to_string()))
            .map(|url| async move {
                let result = self.fetcher.fetch_entries(&url).await.map_err(|e| {
                    warn!("Skipping feed {}: {}", url, e);
                    e.to_string()
                });
                FeedOutcome { url, result }
            })
            .buffered(self.max_concurrent_feeds)
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        let pooled: usize = outcomes.iter().map(FeedOutcome::entry_count).sum();
        info!(
            "Fetched {} feeds ({} failed), pooled {} entries",
            outcomes.len(),
            failed,
            pooled
        );

        outcomes
    }

    /// Run already pooled entries through every stage after fetching.
    pub async fn process_entries(&self, entries: Vec<RawEntry>) -> Vec<NewsItem> {
        let selected = self.select(&entries);

        match &self.summarization {
            Some(stage) if !selected.is_empty() => {
                debug!("Running {}", stage.stage_name());
                stage.process(selected).await
            }
            _ => selected,
        }
    }

    /// Classification, normalization, deduplication and ordering. No I/O.
    pub fn select(&self, entries: &[RawEntry]) -> Vec<NewsItem> {
        let mut rejected: HashMap<&'static str, usize> = HashMap::new();
        let mut accepted = Vec::with_capacity(entries.len());

        for entry in entries {
            let published_at = resolve_published_at(entry);
            match self.classifier.classify(entry, published_at, &self.options) {
                Verdict::Pass => {
                    if let Some(published_at) = published_at {
                        accepted.push(self.normalizer.normalize(entry, published_at));
                    }
                }
                Verdict::Reject(reason) => {
                    debug!("Rejected {:?}: {}", entry.title(), reason);
                    *rejected.entry(reason.code()).or_default() += 1;
                }
            }
        }

        info!(
            "Classified {} entries: {} accepted, {} rejected {:?}",
            entries.len(),
            accepted.len(),
            entries.len() - accepted.len(),
            rejected
        );

        let unique_items = deduplicate(accepted);
        order_and_limit(unique_items, self.options.effective_limit())
    }
}

/// Builder for swapping in collaborators and heuristics.
pub struct PipelineBuilder {
    options: FetchOptions,
    fetch_config: FetchConfig,
    fetcher: Option<Arc<dyn FeedFetcher>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    classifier_config: ClassifierConfig,
    normalizer: Normalizer,
}

impl PipelineBuilder {
    pub fn new(options: FetchOptions) -> Self {
        Self {
            options,
            fetch_config: FetchConfig::default(),
            fetcher: None,
            summarizer: None,
            classifier_config: ClassifierConfig::default(),
            normalizer: Normalizer::default(),
        }
    }

    pub fn fetch_config(mut self, config: FetchConfig) -> Self {
        self.fetch_config = config;
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn FeedFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Used instead of the provider from `SummarizeOptions` when summarization is on.
    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn classifier_config(mut self, config: ClassifierConfig) -> Self {
        self.classifier_config = config;
        self
    }

    pub fn default_source(mut self, source: impl Into<String>) -> Self {
        self.normalizer = Normalizer::new(source);
        self
    }

    /// Validates the options; configuration mistakes are reported here.
    pub fn build(self) -> Result<NewsPipeline> {
        self.options.validate()?;

        let max_concurrent_feeds = self.fetch_config.max_concurrent_feeds.max(1);

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFeedFetcher::new(self.fetch_config)?),
        };

        let summarization = if self.options.summarize {
            let summarizer = match self.summarizer {
                Some(summarizer) => summarizer,
                None => build_summarizer(&self.options.summarize_options)?,
            };
            Some(SummarizationStage::new(
                summarizer,
                self.options.summarize_options.clone(),
                self.options.language.clone(),
            )?)
        } else {
            None
        };

        Ok(NewsPipeline {
            options: self.options,
            fetcher,
            classifier: Classifier::new(self.classifier_config),
            normalizer: self.normalizer,
            summarization,
            max_concurrent_feeds,
        })
    }
}
