use crate::types::{NewsItem, RawEntry};
use chrono::{DateTime, Utc};
use url::Url;

pub const DEFAULT_SOURCE: &str = "unknown";

/// Maps classified entries onto the `NewsItem` contract.
#[derive(Debug, Clone)]
pub struct Normalizer {
    default_source: String,
}

impl Normalizer {
    pub fn new(default_source: impl Into<String>) -> Self {
        Self {
            default_source: default_source.into(),
        }
    }

    /// Total: missing optional fields become `None`, a missing source falls
    /// back to the link host and then to the configured default.
    pub fn normalize(&self, entry: &RawEntry, published_at: DateTime<Utc>) -> NewsItem {
        NewsItem {
            title: entry.title().to_string(),
            summary: entry.summary().to_string(),
            link: entry.link().unwrap_or_default().to_string(),
            source: self.resolve_source(entry),
            published_at,
            language: entry.language(),
            category: entry.category().map(str::to_string),
            guid: entry.guid().map(str::to_string),
        }
    }

    fn resolve_source(&self, entry: &RawEntry) -> String {
        entry
            .source()
            .map(str::to_string)
            .or_else(|| entry.link().and_then(link_host))
            .unwrap_or_else(|| self.default_source.clone())
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE)
    }
}

fn link_host(link: &str) -> Option<String> {
    Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .filter(|host| !host.is_empty())
}
