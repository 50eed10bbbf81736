pub mod types;
pub mod options;
pub mod timestamp;
pub mod classifier;
pub mod normalizer;
pub mod dedup;
pub mod ordering;
pub mod summarizer;
pub mod summarization;
pub mod parser;
pub mod fetcher;
pub mod pipeline;

pub use types::*;
pub use options::{FetchConfig, FetchOptions, Provider, SummarizeOptions, SummaryStrategy};
pub use classifier::{Classifier, ClassifierConfig, NonNewsLexicon, RejectReason, Verdict};
pub use normalizer::Normalizer;
pub use dedup::{deduplicate, IdentityKey};
pub use ordering::order_and_limit;
pub use summarizer::{build_summarizer, GeminiSummarizer, MockBehavior, MockSummarizer, OpenAiSummarizer, Summarizer, SummaryRequest};
pub use summarization::SummarizationStage;
pub use parser::FeedParser;
pub use fetcher::{FeedFetcher, HttpFeedFetcher};
pub use pipeline::{NewsPipeline, PipelineBuilder};
