mod common;

use common::{at, entry, init_tracing, StaticFetcher};
use rss_news::{
    FeedParser, FetchOptions, MockBehavior, MockSummarizer, NewsError, NewsPipeline, RawDate, RawEntry,
    SummarizeOptions, SummaryStrategy,
};
use std::sync::Arc;

const FEED_A: &str = "https://a.example/rss";
const FEED_B: &str = "https://b.example/rss";

fn pipeline(options: FetchOptions, fetcher: StaticFetcher) -> NewsPipeline {
    NewsPipeline::builder(options)
        .fetcher(Arc::new(fetcher))
        .build()
        .expect("valid pipeline")
}

#[tokio::test]
async fn test_failed_url_is_skipped() {
    init_tracing();

    let fetcher = StaticFetcher::new().with_feed(
        FEED_B,
        vec![
            entry("Central Bank Raises Interest Rates Sharply", "https://b.example/1", at(3, 0)),
            entry("Parliament Approves Annual Budget Plan", "https://b.example/2", at(2, 0)),
            entry("Heavy Rain Floods Several Coastal Towns", "https://b.example/3", at(1, 0)),
        ],
    );
    let pipeline = pipeline(FetchOptions::default(), fetcher);

    let items = pipeline.fetch(&[FEED_A, FEED_B]).await;

    let links: Vec<_> = items.iter().map(|i| i.link.as_str()).collect();
    assert_eq!(links, vec!["https://b.example/1", "https://b.example/2", "https://b.example/3"]);
}

#[tokio::test]
async fn test_outcomes_report_each_url_in_order() {
    init_tracing();

    let fetcher = StaticFetcher::new().with_feed(
        FEED_B,
        vec![entry("Central Bank Raises Interest Rates Sharply", "https://b.example/1", at(3, 0))],
    );
    let pipeline = pipeline(FetchOptions::default(), fetcher);

    let outcomes = pipeline.fetch_outcomes(&[FEED_A, FEED_B]).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].url, FEED_A);
    assert!(!outcomes[0].is_success());
    assert!(outcomes[0].result.as_ref().unwrap_err().contains("Invalid RSS/Atom feed"));
    assert_eq!(outcomes[1].url, FEED_B);
    assert_eq!(outcomes[1].entry_count(), 1);
}

#[tokio::test]
async fn test_all_failures_yield_empty_list() {
    init_tracing();

    let pipeline = pipeline(FetchOptions::default(), StaticFetcher::new());
    assert!(pipeline.fetch(&[FEED_A, FEED_B]).await.is_empty());
    assert!(pipeline.fetch::<&str>(&[]).await.is_empty());
}

#[tokio::test]
async fn test_non_news_is_filtered() {
    init_tracing();

    let fetcher = StaticFetcher::new().with_feed(
        FEED_A,
        vec![
            entry("Ministry Notice: Office Closed", "https://a.example/notice", at(2, 0)),
            entry("Central Bank Raises Interest Rates Sharply", "https://a.example/rates", at(1, 0)),
        ],
    );
    let pipeline = pipeline(FetchOptions::default(), fetcher);

    let items = pipeline.fetch(&[FEED_A]).await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Central Bank Raises Interest Rates Sharply");
}

#[tokio::test]
async fn test_duplicates_across_feeds_keep_first_seen() {
    init_tracing();

    let mut from_a = entry("Central Bank Raises Interest Rates Sharply", "https://a.example/rates", at(1, 0));
    from_a.guid = Some("wire-123".to_string());
    from_a.source = Some("Feed A".to_string());
    let mut from_b = entry("Central bank lifts rates (wire copy)", "https://b.example/rates", at(1, 5));
    from_b.guid = Some("wire-123".to_string());
    from_b.source = Some("Feed B".to_string());

    let fetcher = StaticFetcher::new()
        .with_feed(FEED_A, vec![from_a])
        .with_feed(FEED_B, vec![from_b]);
    let pipeline = pipeline(FetchOptions::default(), fetcher);

    let items = pipeline.fetch(&[FEED_A, FEED_B]).await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].source, "Feed A");
}

#[tokio::test]
async fn test_ordering_limit_and_date_range() {
    init_tracing();

    let entries: Vec<RawEntry> = (1..=6)
        .map(|day| entry(&format!("Daily market report for day {}", day), &format!("https://a.example/{}", day), at(day, 0)))
        .collect();
    let fetcher = StaticFetcher::new().with_feed(FEED_A, entries);

    let options = FetchOptions::new()
        .with_date_range(Some(at(2, 0)), Some(at(5, 0)))
        .with_limit(3);
    let pipeline = pipeline(options, fetcher);

    let items = pipeline.fetch(&[FEED_A]).await;

    let days: Vec<_> = items.iter().map(|i| i.published_at).collect();
    assert_eq!(days, vec![at(5, 0), at(4, 0), at(3, 0)]);
}

#[tokio::test]
async fn test_entries_without_usable_dates_are_dropped() {
    init_tracing();

    let mut undated = entry("Storm hits the northern coast overnight", "https://a.example/u", at(1, 0));
    undated.published = Some(RawDate::Text("sometime last week".to_string()));
    let mut text_dated = entry("Storm leaves thousands without power", "https://a.example/t", at(1, 0));
    text_dated.published = None;
    text_dated.date = Some("2024-05-02 06:00:00".to_string());

    let fetcher = StaticFetcher::new().with_feed(FEED_A, vec![undated, text_dated]);
    let pipeline = pipeline(FetchOptions::default(), fetcher);

    let items = pipeline.fetch(&[FEED_A]).await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].link, "https://a.example/t");
    assert_eq!(items[0].published_at, at(2, 6));
}

#[tokio::test]
async fn test_summarization_runs_only_on_limited_output() {
    init_tracing();

    let entries: Vec<RawEntry> = (1..=5)
        .map(|day| entry(&format!("Daily market report for day {}", day), &format!("https://a.example/{}", day), at(day, 0)))
        .collect();
    let fetcher = StaticFetcher::new().with_feed(FEED_A, entries);
    let summarizer = Arc::new(MockSummarizer::new("pipeline"));

    let options = FetchOptions::new()
        .with_limit(2)
        .with_summarization(SummarizeOptions {
            strategy: SummaryStrategy::Replace,
            max_workers: 2,
            ..Default::default()
        });
    let pipeline = NewsPipeline::builder(options)
        .fetcher(Arc::new(fetcher))
        .summarizer(summarizer.clone())
        .build()
        .unwrap();

    let items = pipeline.fetch(&[FEED_A]).await;

    assert_eq!(summarizer.calls(), 2);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].summary, "Summary: Daily market report for day 5");
    assert_eq!(items[1].summary, "Summary: Daily market report for day 4");
}

#[tokio::test]
async fn test_summarization_disabled_makes_no_calls() {
    init_tracing();

    let fetcher = StaticFetcher::new().with_feed(
        FEED_A,
        vec![entry("Central Bank Raises Interest Rates Sharply", "https://a.example/1", at(1, 0))],
    );
    let summarizer = Arc::new(MockSummarizer::new("idle").with_behavior(MockBehavior::Fail));

    let pipeline = NewsPipeline::builder(FetchOptions::default())
        .fetcher(Arc::new(fetcher))
        .summarizer(summarizer.clone())
        .build()
        .unwrap();

    let items = pipeline.fetch(&[FEED_A]).await;

    assert_eq!(items.len(), 1);
    assert_eq!(summarizer.calls(), 0);
}

#[test]
fn test_invalid_configuration_surfaces_at_build() {
    let reversed = FetchOptions::new().with_date_range(Some(at(5, 0)), Some(at(1, 0)));
    let result = NewsPipeline::builder(reversed)
        .fetcher(Arc::new(StaticFetcher::new()))
        .build();
    assert!(matches!(result, Err(NewsError::Config(_))));

    let zero_workers = FetchOptions::new().with_summarization(SummarizeOptions {
        max_workers: 0,
        ..Default::default()
    });
    let result = NewsPipeline::builder(zero_workers)
        .fetcher(Arc::new(StaticFetcher::new()))
        .summarizer(Arc::new(MockSummarizer::new("unused")))
        .build();
    assert!(matches!(result, Err(NewsError::Config(_))));
}

fn channel(title: &str, item_title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>{}</title>
    <link>https://wire.example</link>
    <description>Wire copy</description>
    <item>
      <title>{}</title>
      <link>https://wire.example/story/1</link>
      <description>Same story, different headline.</description>
      <pubDate>Tue, 07 May 2024 09:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#,
        title, item_title
    )
}

#[tokio::test]
async fn test_guidless_items_with_same_link_collapse() {
    init_tracing();

    let parser = FeedParser::new();
    let first = parser
        .parse_feed(&channel("Morning Wire", "Central Bank Raises Interest Rates Sharply"))
        .unwrap();
    let second = parser
        .parse_feed(&channel("Evening Wire", "Central bank lifts rates by half a point"))
        .unwrap();

    let fetcher = StaticFetcher::new()
        .with_feed(FEED_A, first)
        .with_feed(FEED_B, second);
    let pipeline = pipeline(FetchOptions::default(), fetcher);

    let items = pipeline.fetch(&[FEED_A, FEED_B]).await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].source, "Morning Wire");
    assert_eq!(items[0].guid, None);
}
