use crate::options::{Provider, SummarizeOptions};
use crate::types::{NewsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_SUMMARY_LANGUAGE: &str = "ko";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Input for one summarization call.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub title: String,
    /// Title and existing summary, already truncated.
    pub text: String,
    pub link: String,
    pub language: Option<String>,
}

impl SummaryRequest {
    fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_SUMMARY_LANGUAGE)
    }
}

/// A text generation backend that turns a news item into a short summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> String;

    async fn summarize(&self, request: &SummaryRequest) -> Result<String>;
}

/// Pick the backend for the configured provider.
///
/// Credentials are read here but only checked per call, so a missing key
/// degrades to unchanged summaries instead of failing the pipeline.
pub fn build_summarizer(options: &SummarizeOptions) -> Result<Arc<dyn Summarizer>> {
    let timeout = options.timeout()?;
    let summarizer: Arc<dyn Summarizer> = match options.provider {
        Provider::OpenAi => Arc::new(OpenAiSummarizer::from_env(options.model.clone(), timeout)?),
        Provider::Gemini => Arc::new(GeminiSummarizer::from_env(options.model.clone(), timeout)?),
    };
    debug!("Built summarizer: {}", summarizer.name());
    Ok(summarizer)
}

fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiSummarizer {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl fmt::Debug for OpenAiSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSummarizer")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiSummarizer {
    pub fn new(api_key: Option<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            model: model.into(),
            base_url: OPENAI_BASE_URL.to_string(),
        })
    }

    /// `OPENAI_API_KEY`, `OPENAI_MODEL` and `OPENAI_BASE_URL`.
    pub fn from_env(model: Option<String>, timeout: Duration) -> Result<Self> {
        let model = model
            .or_else(|| env_non_empty("OPENAI_MODEL"))
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
        let mut summarizer = Self::new(env_non_empty("OPENAI_API_KEY"), model, timeout)?;
        if let Some(base_url) = env_non_empty("OPENAI_BASE_URL") {
            summarizer = summarizer.with_base_url(base_url);
        }
        Ok(summarizer)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    fn name(&self) -> String {
        format!("openai ({})", self.model)
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| NewsError::MissingCredential {
            provider: Provider::OpenAi.to_string(),
            var: "OPENAI_API_KEY".to_string(),
        })?;

        let system = format!(
            "You are a concise news summarizer. Return a single short paragraph in {} (max ~2 sentences). \
             No preface, no title, no bullets.",
            request.language()
        );
        let user = format!(
            "Title: {}\nSummary: {}\nLink: {}\n\nTask: Provide a concise news summary (objective, no opinions).",
            request.title, request.text, request.link
        );

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("OpenAI API error {}: {}", status, error_text);
            return Err(NewsError::Summarizer(format!("OpenAI API error {}", status)));
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| NewsError::Summarizer("No response from OpenAI".to_string()))
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

pub struct GeminiSummarizer {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl fmt::Debug for GeminiSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSummarizer")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiSummarizer {
    pub fn new(api_key: Option<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// `GOOGLE_API_KEY` (or `GEMINI_API_KEY`), `GEMINI_MODEL` and `GEMINI_BASE_URL`.
    pub fn from_env(model: Option<String>, timeout: Duration) -> Result<Self> {
        let model = model
            .or_else(|| env_non_empty("GEMINI_MODEL"))
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let api_key = env_non_empty("GOOGLE_API_KEY").or_else(|| env_non_empty("GEMINI_API_KEY"));
        let mut summarizer = Self::new(api_key, model, timeout)?;
        if let Some(base_url) = env_non_empty("GEMINI_BASE_URL") {
            summarizer = summarizer.with_base_url(base_url);
        }
        Ok(summarizer)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    fn name(&self) -> String {
        format!("gemini ({})", self.model)
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| NewsError::MissingCredential {
            provider: Provider::Gemini.to_string(),
            var: "GOOGLE_API_KEY".to_string(),
        })?;

        let prompt = format!(
            "Summarize the following news in {} in one or two sentences. Keep only the essentials.\n\
             Title: {}\nExcerpt: {}\nLink: {}",
            request.language(),
            request.title,
            request.text,
            request.link
        );

        let body = GenerateRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: Some(prompt) }],
            }],
        };

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Gemini API error {}: {}", status, error_text);
            return Err(NewsError::Summarizer(format!("Gemini API error {}", status)));
        }

        let generated: GenerateResponse = response.json().await?;
        generated
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().find_map(|part| part.text))
            .map(|text| text.trim().to_string())
            .ok_or_else(|| NewsError::Summarizer("No candidates from Gemini".to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Returns `"Summary: <title>"`.
    Echo,
    Fail,
    Empty,
}

/// Test double that records how many calls ran at once.
#[derive(Debug)]
pub struct MockSummarizer {
    name: String,
    response_delay_ms: u64,
    behavior: MockBehavior,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockSummarizer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response_delay_ms: 0,
            behavior: MockBehavior::Echo,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.response_delay_ms = delay_ms;
        self
    }

    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    fn name(&self) -> String {
        format!("mock ({})", self.name)
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        // Decrements on drop, including when the caller times the call out.
        let _guard = InFlightGuard(&self.in_flight);

        if self.response_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.response_delay_ms)).await;
        }

        match self.behavior {
            MockBehavior::Echo => Ok(format!("Summary: {}", request.title)),
            MockBehavior::Fail => Err(NewsError::Summarizer(format!("{} failed", self.name))),
            MockBehavior::Empty => Ok(String::new()),
        }
    }
}
