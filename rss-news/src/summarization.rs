use crate::options::{SummarizeOptions, SummaryStrategy};
use crate::summarizer::{Summarizer, SummaryRequest};
use crate::types::{NewsError, NewsItem, Result};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const APPEND_DELIMITER: &str = "\n\n[AI Summary]\n";

/// Rewrites or extends item summaries through a `Summarizer`.
///
/// Runs on the final ordered list. At most `max_workers` calls are in flight,
/// each bounded by `timeout_sec`. A failed, empty or timed-out call leaves the
/// item's summary as it was. Output order always matches input order.
pub struct SummarizationStage {
    summarizer: Arc<dyn Summarizer>,
    options: SummarizeOptions,
    timeout: Duration,
    language: Option<String>,
}

impl SummarizationStage {
    /// `language` is the fallback hint used when `options.language` is unset.
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        options: SummarizeOptions,
        language: Option<String>,
    ) -> Result<Self> {
        options.validate()?;
        let timeout = options.timeout()?;
        Ok(Self {
            summarizer,
            options,
            timeout,
            language,
        })
    }

    pub fn stage_name(&self) -> String {
        format!("summarizer[{}]", self.summarizer.name())
    }

    pub async fn process(&self, items: Vec<NewsItem>) -> Vec<NewsItem> {
        if items.is_empty() {
            return items;
        }

        debug!(
            "Summarizing {} items with {} (max_workers={})",
            items.len(),
            self.summarizer.name(),
            self.options.max_workers
        );

        // `buffered` keeps at most `max_workers` futures alive and yields them in input order.
        let results: Vec<(NewsItem, bool)> = stream::iter(items)
            .map(|item| self.summarize_item(item))
            .buffered(self.options.max_workers)
            .collect()
            .await;

        let changed = results.iter().filter(|(_, changed)| *changed).count();
        info!(
            "Summarization stage updated {} of {} items",
            changed,
            results.len()
        );

        results.into_iter().map(|(item, _)| item).collect()
    }

    async fn summarize_item(&self, item: NewsItem) -> (NewsItem, bool) {
        let request = self.build_request(&item);

        let generated = match self.call_with_timeout(&request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                debug!("Empty summary for {}, keeping original", item.link);
                return (item, false);
            }
            Err(e) => {
                warn!("Summarization failed for {}: {}", item.link, e);
                return (item, false);
            }
        };

        let summary = apply_strategy(self.options.strategy, &item.summary, &generated);
        (item.with_summary(summary), true)
    }

    async fn call_with_timeout(&self, request: &SummaryRequest) -> Result<String> {
        match tokio::time::timeout(self.timeout, self.summarizer.summarize(request)).await {
            Ok(result) => result,
            Err(_) => Err(NewsError::Timeout {
                seconds: self.timeout.as_secs_f64(),
            }),
        }
    }

    fn build_request(&self, item: &NewsItem) -> SummaryRequest {
        let base = format!("{}\n\n{}", item.title, item.summary);
        SummaryRequest {
            title: item.title.clone(),
            text: truncate_chars(&base, self.options.max_input_chars),
            link: item.link.clone(),
            language: self
                .options
                .language
                .clone()
                .or_else(|| self.language.clone()),
        }
    }
}

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

pub fn apply_strategy(strategy: SummaryStrategy, original: &str, generated: &str) -> String {
    match strategy {
        SummaryStrategy::Replace => generated.to_string(),
        SummaryStrategy::Append if original.is_empty() => generated.to_string(),
        SummaryStrategy::Append => format!("{}{}{}", original, APPEND_DELIMITER, generated),
    }
}
