use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One date representation as it arrived from a feed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDate {
    /// Already parsed and carrying its own offset.
    Instant(DateTime<FixedOffset>),
    /// Wall-clock time; `offset` is applied when the source told us one.
    Naive {
        value: NaiveDateTime,
        offset: Option<FixedOffset>,
    },
    /// Unparsed text, e.g. an RFC 2822 `pubDate`.
    Text(String),
}

/// A loosely structured feed item, exactly as the fetcher produced it.
///
/// Every field may be absent. Nothing downstream assumes a default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub source: Option<String>,
    pub published: Option<RawDate>,
    pub updated: Option<RawDate>,
    pub created: Option<RawDate>,
    pub date: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub guid: Option<String>,
}

impl RawEntry {
    pub fn title(&self) -> &str {
        non_blank(self.title.as_deref()).unwrap_or("")
    }

    pub fn summary(&self) -> &str {
        non_blank(self.summary.as_deref()).unwrap_or("")
    }

    pub fn link(&self) -> Option<&str> {
        non_blank(self.link.as_deref())
    }

    pub fn source(&self) -> Option<&str> {
        non_blank(self.source.as_deref())
    }

    pub fn category(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }

    pub fn guid(&self) -> Option<&str> {
        non_blank(self.guid.as_deref())
    }

    /// Lower-cased language hint, if any.
    pub fn language(&self) -> Option<String> {
        non_blank(self.language.as_deref()).map(|lang| lang.to_lowercase())
    }
}

/// Trimmed view of an optional string; blank counts as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A normalized news story. This is the public output contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub guid: Option<String>,
}

impl NewsItem {
    /// Same item with a different summary. The only sanctioned change after construction.
    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = summary;
        self
    }
}

/// Per-URL result kept for observability before entries are pooled.
#[derive(Debug)]
pub struct FeedOutcome {
    pub url: String,
    pub result: std::result::Result<Vec<RawEntry>, String>,
}

impl FeedOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn entry_count(&self) -> usize {
        self.result.as_ref().map(Vec::len).unwrap_or(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{provider} credential missing: set {var}")]
    MissingCredential { provider: String, var: String },

    #[error("Summarizer error: {0}")]
    Summarizer(String),

    #[error("Timed out after {seconds}s")]
    Timeout { seconds: f64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, NewsError>;
