use crate::types::{NewsError, RawDate, RawEntry, Result};
use feed_rs::parser;
use tracing::{debug, info};

/// Turns RSS/Atom documents into `RawEntry` records.
#[derive(Debug, Clone, Default)]
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_feed(&self, content: &str) -> Result<Vec<RawEntry>> {
        let content = Self::normalize_encoding(content)?;
        if !Self::is_valid_feed_content(&content) {
            return Err(NewsError::Parse("Content does not look like an RSS/Atom feed".to_string()));
        }

        debug!("Parsing feed content ({} bytes)", content.len());

        // Keep missing guids empty so dedup falls back to the link.
        let feed = parser::Builder::new()
            .id_generator(|_, _, _| String::new())
            .build()
            .parse(content.as_bytes())
            .map_err(|e| NewsError::Parse(format!("Failed to parse feed: {}", e)))?;

        let feed_title = feed
            .title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty());
        let feed_language = feed.language.clone();

        let entries: Vec<RawEntry> = feed
            .entries
            .into_iter()
            .map(|entry| Self::parse_entry(entry, feed_title.as_deref(), feed_language.as_deref()))
            .collect();

        info!("Parsed feed with {} entries", entries.len());
        Ok(entries)
    }

    fn parse_entry(
        entry: feed_rs::model::Entry,
        feed_title: Option<&str>,
        feed_language: Option<&str>,
    ) -> RawEntry {
        let guid = Some(entry.id.trim().to_string()).filter(|id| !id.is_empty());

        let summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body));

        RawEntry {
            title: entry.title.map(|t| t.content),
            summary,
            link: entry.links.first().map(|l| l.href.clone()),
            source: feed_title.map(str::to_string),
            published: entry.published.map(|dt| RawDate::Instant(dt.into())),
            updated: entry.updated.map(|dt| RawDate::Instant(dt.into())),
            created: None,
            date: None,
            language: feed_language.map(str::to_string),
            category: entry.categories.into_iter().map(|c| c.term).next(),
            guid,
        }
    }

    pub fn is_valid_feed_content(content: &str) -> bool {
        let content_lower = content.to_lowercase();

        content_lower.contains("<rss")
            || content_lower.contains("<feed")
            || content_lower.contains("<rdf:rdf")
            || content_lower.contains("<channel")
    }

    pub fn normalize_encoding(content: &str) -> Result<String> {
        let normalized = content
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .trim()
            .to_string();

        if normalized.is_empty() {
            return Err(NewsError::Parse("Empty content after normalization".to_string()));
        }

        Ok(normalized)
    }
}
