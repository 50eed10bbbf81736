use crate::types::NewsItem;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use tracing::{debug, info};

/// Identity used to recognise the same story across feeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Guid(String),
    Link(String),
    TitleSource(u64),
}

impl IdentityKey {
    /// guid, then link, then a hash of (title, source).
    pub fn of(item: &NewsItem) -> Self {
        if let Some(guid) = item.guid.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
            return IdentityKey::Guid(guid.to_string());
        }

        let link = item.link.trim();
        if !link.is_empty() {
            return IdentityKey::Link(link.to_string());
        }

        let mut hasher = DefaultHasher::new();
        (item.title.as_str(), item.source.as_str()).hash(&mut hasher);
        IdentityKey::TitleSource(hasher.finish())
    }
}

/// Drop later duplicates, keeping the first occurrence in input order.
pub fn deduplicate(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let total = items.len();
    let mut seen = HashSet::with_capacity(total);
    let mut unique_items = Vec::with_capacity(total);

    for item in items {
        if seen.insert(IdentityKey::of(&item)) {
            unique_items.push(item);
        } else {
            debug!("Removing duplicate entry: {} ({})", item.title, item.link);
        }
    }

    let removed_count = total - unique_items.len();
    if removed_count > 0 {
        info!("Removed {} duplicate entries", removed_count);
    }

    unique_items
}
