use crate::types::{NewsError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// User-facing filter and post-processing options for one pipeline.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub language: Option<String>,
    pub categories: Vec<String>,
    pub include_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    /// `None` or `Some(0)` means unbounded.
    pub limit: Option<usize>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub summarize: bool,
    pub summarize_options: SummarizeOptions,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_include_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclude_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_date_range(
        mut self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    pub fn with_summarization(mut self, options: SummarizeOptions) -> Self {
        self.summarize = true;
        self.summarize_options = options;
        self
    }

    /// Effective limit after treating zero as unbounded.
    pub fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|&limit| limit > 0)
    }

    /// Language hint handed to the summarizer.
    pub fn summary_language(&self) -> Option<&str> {
        self.summarize_options
            .language
            .as_deref()
            .or(self.language.as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(NewsError::Config(format!(
                    "start_date {} is after end_date {}",
                    start, end
                )));
            }
        }

        if self.summarize {
            self.summarize_options.validate()?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Provider {
    #[default]
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" | "google" | "googleai" => Ok(Provider::Gemini),
            other => Err(NewsError::Config(format!("unknown summarization provider '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SummaryStrategy {
    #[default]
    Replace,
    Append,
}

impl FromStr for SummaryStrategy {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(SummaryStrategy::Replace),
            "append" => Ok(SummaryStrategy::Append),
            other => Err(NewsError::Config(format!("unknown summary strategy '{}'", other))),
        }
    }
}

pub const MAX_TIMEOUT_SEC: f64 = 3600.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SummarizeOptions {
    pub provider: Provider,
    pub model: Option<String>,
    pub strategy: SummaryStrategy,
    pub max_input_chars: usize,
    pub max_workers: usize,
    pub timeout_sec: f64,
    pub language: Option<String>,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAi,
            model: None,
            strategy: SummaryStrategy::Replace,
            max_input_chars: 4000,
            max_workers: 4,
            timeout_sec: 15.0,
            language: None,
        }
    }
}

impl SummarizeOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_input_chars == 0 {
            return Err(NewsError::Config("max_input_chars must be positive".to_string()));
        }
        if self.max_workers == 0 {
            return Err(NewsError::Config("max_workers must be positive".to_string()));
        }
        self.timeout()?;
        Ok(())
    }

    /// Per-call timeout; `timeout_sec` must be positive and at most an hour.
    pub fn timeout(&self) -> Result<Duration> {
        if !(self.timeout_sec > 0.0 && self.timeout_sec <= MAX_TIMEOUT_SEC) {
            return Err(NewsError::Config(format!(
                "timeout_sec must be in (0, {}], got {}",
                MAX_TIMEOUT_SEC, self.timeout_sec
            )));
        }
        Duration::try_from_secs_f64(self.timeout_sec)
            .map_err(|e| NewsError::Config(format!("invalid timeout_sec {}: {}", self.timeout_sec, e)))
    }
}

/// Settings for the HTTP feed fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
    pub max_concurrent_feeds: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "rss-news/0.1".to_string(),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_seconds: 1,
            max_feed_size_mb: 10,
            max_redirects: 5,
            max_concurrent_feeds: 8,
        }
    }
}
