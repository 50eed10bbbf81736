#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rss_news::{FeedFetcher, NewsError, NewsItem, RawDate, RawEntry, Result};
use std::collections::HashMap;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init()
            .ok();
    });
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

/// A valid news entry published at `when`.
pub fn entry(title: &str, link: &str, when: DateTime<Utc>) -> RawEntry {
    RawEntry {
        title: Some(title.to_string()),
        summary: Some(format!("Details about {}", title)),
        link: Some(link.to_string()),
        source: Some("Test Wire".to_string()),
        published: Some(RawDate::Instant(when.into())),
        ..Default::default()
    }
}

pub fn item(title: &str, link: &str, when: DateTime<Utc>) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        summary: format!("Details about {}", title),
        link: link.to_string(),
        source: "Test Wire".to_string(),
        published_at: when,
        language: None,
        category: None,
        guid: None,
    }
}

/// Serves canned entries per URL; unknown URLs fail like a broken feed.
#[derive(Default)]
pub struct StaticFetcher {
    feeds: HashMap<String, Vec<RawEntry>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, url: &str, entries: Vec<RawEntry>) -> Self {
        self.feeds.insert(url.to_string(), entries);
        self
    }
}

#[async_trait]
impl FeedFetcher for StaticFetcher {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<RawEntry>> {
        self.feeds
            .get(url)
            .cloned()
            .ok_or_else(|| NewsError::Parse(format!("Invalid RSS/Atom feed: {}", url)))
    }
}
