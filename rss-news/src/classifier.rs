use crate::options::FetchOptions;
use crate::types::RawEntry;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

pub const DEFAULT_MIN_TITLE_CHARS: usize = 10;

/// Title terms that mark notices, changelogs and other non-news posts, keyed
/// by language code.
#[derive(Debug, Clone, PartialEq)]
pub struct NonNewsLexicon {
    terms: HashMap<String, BTreeSet<String>>,
}

impl NonNewsLexicon {
    pub fn empty() -> Self {
        Self {
            terms: HashMap::new(),
        }
    }

    /// Add terms for a language. Terms are stored lower-cased.
    pub fn with_terms<I, S>(mut self, language: &str, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.terms.entry(language.to_lowercase()).or_default();
        entry.extend(terms.into_iter().map(|t| t.as_ref().to_lowercase()));
        self
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut langs: Vec<&str> = self.terms.keys().map(String::as_str).collect();
        langs.sort();
        langs
    }

    /// First term found in `title`, if any.
    ///
    /// With a listed language only that language's terms apply (matched on the
    /// primary subtag, so `en-us` uses `en`). A missing or unlisted language
    /// gets every term.
    pub fn find_in(&self, title: &str, language: Option<&str>) -> Option<&str> {
        let title = title.to_lowercase();

        let listed = language.and_then(|lang| {
            let primary = lang.split(['-', '_']).next().unwrap_or(lang);
            self.terms.get(primary)
        });
        let sets: Vec<&BTreeSet<String>> = match listed {
            Some(set) => vec![set],
            None => self.terms.values().collect(),
        };

        sets.into_iter()
            .flatten()
            .find(|term| title.contains(term.as_str()))
            .map(String::as_str)
    }
}

impl Default for NonNewsLexicon {
    fn default() -> Self {
        Self::empty()
            .with_terms(
                "en",
                [
                    "notice",
                    "changelog",
                    "change log",
                    "update log",
                    "release notes",
                    "patch notes",
                    "maintenance",
                    "comment",
                ],
            )
            .with_terms("ko", ["댓글", "공지", "업데이트", "update log"])
    }
}

/// Heuristic thresholds that are not exposed as user filters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub min_title_chars: usize,
    pub lexicon: NonNewsLexicon,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_title_chars: DEFAULT_MIN_TITLE_CHARS,
            lexicon: NonNewsLexicon::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    MissingDate,
    MissingLink,
    TitleTooShort { chars: usize },
    NonNewsTerm(String),
    LanguageMismatch,
    CategoryMismatch,
    MissingIncludeKeyword,
    ExcludedKeyword(String),
    OutOfDateRange,
}

impl RejectReason {
    /// Stable short code, for counting rejections.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::MissingDate => "missing_date",
            RejectReason::MissingLink => "missing_link",
            RejectReason::TitleTooShort { .. } => "title_too_short",
            RejectReason::NonNewsTerm(_) => "non_news_term",
            RejectReason::LanguageMismatch => "language_mismatch",
            RejectReason::CategoryMismatch => "category_mismatch",
            RejectReason::MissingIncludeKeyword => "missing_include_keyword",
            RejectReason::ExcludedKeyword(_) => "excluded_keyword",
            RejectReason::OutOfDateRange => "out_of_date_range",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TitleTooShort { chars } => write!(f, "{}({})", self.code(), chars),
            RejectReason::NonNewsTerm(term) => write!(f, "{}({})", self.code(), term),
            RejectReason::ExcludedKeyword(kw) => write!(f, "{}({})", self.code(), kw),
            _ => f.write_str(self.code()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Decides whether a raw entry is a news story that satisfies the user's filters.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Rules run in a fixed order and stop at the first failure. Structural and
    /// content checks come before any user filter.
    pub fn classify(
        &self,
        entry: &RawEntry,
        published_at: Option<DateTime<Utc>>,
        options: &FetchOptions,
    ) -> Verdict {
        match self.check(entry, published_at, options) {
            Ok(()) => Verdict::Pass,
            Err(reason) => Verdict::Reject(reason),
        }
    }

    fn check(
        &self,
        entry: &RawEntry,
        published_at: Option<DateTime<Utc>>,
        options: &FetchOptions,
    ) -> Result<(), RejectReason> {
        let published_at = published_at.ok_or(RejectReason::MissingDate)?;
        entry.link().ok_or(RejectReason::MissingLink)?;

        let title = entry.title();
        let summary = entry.summary();
        let item_language = entry.language();

        let chars = title.chars().count();
        if chars < self.config.min_title_chars {
            return Err(RejectReason::TitleTooShort { chars });
        }

        if let Some(term) = self.config.lexicon.find_in(title, item_language.as_deref()) {
            return Err(RejectReason::NonNewsTerm(term.to_string()));
        }

        if let Some(wanted) = options.language.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            let matches = item_language
                .as_deref()
                .is_some_and(|lang| lang.contains(&wanted.to_lowercase()));
            if !matches {
                return Err(RejectReason::LanguageMismatch);
            }
        }

        if !options.categories.is_empty() {
            let matches = entry.category().is_some_and(|category| {
                options
                    .categories
                    .iter()
                    .any(|wanted| wanted.trim().to_lowercase() == category.to_lowercase())
            });
            if !matches {
                return Err(RejectReason::CategoryMismatch);
            }
        }

        if has_keywords(&options.include_keywords)
            && find_keyword(&options.include_keywords, title, summary).is_none()
        {
            return Err(RejectReason::MissingIncludeKeyword);
        }

        if let Some(keyword) = find_keyword(&options.exclude_keywords, title, summary) {
            return Err(RejectReason::ExcludedKeyword(keyword.to_string()));
        }

        let after_start = options.start_date.map_or(true, |start| published_at >= start);
        let before_end = options.end_date.map_or(true, |end| published_at <= end);
        if !(after_start && before_end) {
            return Err(RejectReason::OutOfDateRange);
        }

        Ok(())
    }
}

/// Blank keywords are ignored, so a list of only blanks is no filter at all.
fn has_keywords(keywords: &[String]) -> bool {
    keywords.iter().any(|kw| !kw.trim().is_empty())
}

/// First keyword contained (case-insensitively) in the title or summary.
fn find_keyword<'a>(keywords: &'a [String], title: &str, summary: &str) -> Option<&'a str> {
    let title = title.to_lowercase();
    let summary = summary.to_lowercase();

    keywords
        .iter()
        .map(|kw| kw.trim())
        .filter(|kw| !kw.is_empty())
        .find(|kw| {
            let kw = kw.to_lowercase();
            title.contains(&kw) || summary.contains(&kw)
        })
}
