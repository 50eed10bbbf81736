use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use rss_news::{FetchOptions, NewsPipeline, Provider, SummarizeOptions, SummaryStrategy};
use tracing::{info, warn};

/// Fetch RSS/Atom feeds and print the news items they contain, newest first.
#[derive(Parser, Debug)]
#[command(name = "rss-news", version)]
struct Cli {
    /// Feed URLs
    #[arg(required = true)]
    urls: Vec<String>,

    #[arg(long)]
    language: Option<String>,

    #[arg(long = "category")]
    categories: Vec<String>,

    #[arg(long = "include")]
    include_keywords: Vec<String>,

    #[arg(long = "exclude")]
    exclude_keywords: Vec<String>,

    #[arg(long)]
    limit: Option<usize>,

    /// RFC 3339, inclusive
    #[arg(long)]
    since: Option<DateTime<Utc>>,

    /// RFC 3339, inclusive
    #[arg(long)]
    until: Option<DateTime<Utc>>,

    #[arg(long)]
    summarize: bool,

    #[arg(long, default_value = "openai")]
    provider: String,

    #[arg(long)]
    model: Option<String>,

    #[arg(long, default_value = "replace")]
    strategy: String,

    #[arg(long, default_value_t = 4)]
    max_workers: usize,

    /// Per-call summarizer timeout in seconds
    #[arg(long, default_value_t = 15.0)]
    timeout_sec: f64,

    /// Characters of title and summary sent to the summarizer
    #[arg(long, default_value_t = 4000)]
    max_input_chars: usize,

    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn fetch_options(&self) -> anyhow::Result<FetchOptions> {
        let mut options = FetchOptions::new()
            .with_categories(self.categories.clone())
            .with_include_keywords(self.include_keywords.clone())
            .with_exclude_keywords(self.exclude_keywords.clone())
            .with_date_range(self.since, self.until);

        if let Some(language) = &self.language {
            options = options.with_language(language.clone());
        }
        if let Some(limit) = self.limit {
            options = options.with_limit(limit);
        }

        if self.summarize {
            let provider: Provider = self.provider.parse()?;
            let strategy: SummaryStrategy = self.strategy.parse()?;
            options = options.with_summarization(SummarizeOptions {
                provider,
                model: self.model.clone(),
                strategy,
                max_workers: self.max_workers,
                timeout_sec: self.timeout_sec,
                max_input_chars: self.max_input_chars,
                ..Default::default()
            });
        }

        Ok(options)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let options = cli.fetch_options().context("invalid options")?;
    let pipeline = NewsPipeline::new(options).context("failed to build pipeline")?;

    info!("Fetching {} feeds", cli.urls.len());
    let items = pipeline.fetch(&cli.urls).await;

    if items.is_empty() {
        warn!("No news items found");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for item in &items {
            println!("{}  [{}] {}", item.published_at.format("%Y-%m-%d %H:%M"), item.source, item.title);
            println!("    {}", item.link);
            if !item.summary.is_empty() {
                println!("    {}", item.summary);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_flags_reach_options() {
        let cli = Cli::try_parse_from([
            "rss-news",
            "https://wire.example/rss",
            "--summarize",
            "--timeout-sec",
            "2.5",
            "--max-input-chars",
            "800",
        ])
        .unwrap();

        let options = cli.fetch_options().unwrap();
        assert!(options.summarize);
        assert_eq!(options.summarize_options.timeout_sec, 2.5);
        assert_eq!(options.summarize_options.max_input_chars, 800);
    }

    #[test]
    fn test_summarize_flag_defaults() {
        let cli = Cli::try_parse_from(["rss-news", "https://wire.example/rss", "--summarize"]).unwrap();

        let options = cli.fetch_options().unwrap();
        assert_eq!(options.summarize_options.timeout_sec, 15.0);
        assert_eq!(options.summarize_options.max_input_chars, 4000);
    }
}
