use crate::types::NewsItem;

/// Newest first. `sort_by` is stable, so equal timestamps keep their input order.
pub fn sort_newest_first(items: &mut [NewsItem]) {
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

/// Sort, then keep at most `limit` items. `None` and `Some(0)` are unbounded.
pub fn order_and_limit(mut items: Vec<NewsItem>, limit: Option<usize>) -> Vec<NewsItem> {
    sort_newest_first(&mut items);

    if let Some(limit) = limit.filter(|&limit| limit > 0) {
        items.truncate(limit);
    }

    items
}
