//! News headline sources.
//!
//! Two interchangeable feeds: the RTVE news API (XML) and the BBC world
//! RSS feed. A fetch produces a single ticker string of up to
//! `news.count` headline titles joined by the configured separator;
//! malformed feeds surface as [`FetchError::Parse`].

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;

use crate::Config;
use crate::error::FetchError;

const RTVE_URL: &str = "https://www.rtve.es/api/noticias.xml";
const BBC_URL: &str = "https://feeds.bbci.co.uk/news/world/rss.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewsSourceId {
    Rtve,
    Bbc,
}

impl NewsSourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsSourceId::Rtve => "rtve",
            NewsSourceId::Bbc => "bbc",
        }
    }

    /// Name shown in the ticker head.
    pub fn display_name(&self) -> &'static str {
        match self {
            NewsSourceId::Rtve => "rtve",
            NewsSourceId::Bbc => "BBC",
        }
    }

    /// The source selected when none is given at startup.
    pub const fn primary() -> Self {
        NewsSourceId::Rtve
    }

    /// The other source, for alternation.
    pub fn other(&self) -> Self {
        match self {
            NewsSourceId::Rtve => NewsSourceId::Bbc,
            NewsSourceId::Bbc => NewsSourceId::Rtve,
        }
    }
}

impl std::fmt::Display for NewsSourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for NewsSourceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "rtve" => Ok(NewsSourceId::Rtve),
            "bbc" => Ok(NewsSourceId::Bbc),
            _ => Err(anyhow::anyhow!(
                "Unknown news source '{value}'. Supported sources: rtve, bbc."
            )),
        }
    }
}

/// Source of ticker headlines. Object-safe so the fetch worker can run
/// against test doubles the same way the weather worker does.
#[async_trait]
pub trait NewsSource: Send + Sync + Debug {
    /// Fetch and parse one ticker string from `id`.
    async fn fetch_titles(&self, id: NewsSourceId) -> Result<String, FetchError>;
}

/// HTTP client for both news feeds.
#[derive(Debug, Clone)]
pub struct NewsClient {
    http: Client,
    lang: String,
    count: usize,
    separator: String,
}

impl NewsClient {
    pub fn new(cfg: &Config) -> Result<Self, reqwest::Error> {
        // Feeds are slower than the weather API; give them twice the budget.
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.intervals.fetch_timeout_secs * 2))
            .build()?;

        Ok(Self {
            http,
            lang: cfg.lang.clone(),
            count: cfg.news.count,
            separator: cfg.news.separator.clone(),
        })
    }

    fn source_url(&self, id: NewsSourceId) -> String {
        match id {
            NewsSourceId::Rtve => {
                format!("{RTVE_URL}?lang={}&size={}", self.lang, self.count)
            }
            NewsSourceId::Bbc => BBC_URL.to_string(),
        }
    }
}

#[async_trait]
impl NewsSource for NewsClient {
    async fn fetch_titles(&self, id: NewsSourceId) -> Result<String, FetchError> {
        let url = self.source_url(id);

        let res = self.http.get(&url).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Http { status: status.as_u16(), body: truncate(&body) });
        }

        match id {
            NewsSourceId::Rtve => parse_rtve(&body, self.count, &self.separator),
            NewsSourceId::Bbc => parse_bbc(&body, self.count, &self.separator),
        }
    }
}

/// Titles live in `<longTitle>` elements of the RTVE news document.
pub fn parse_rtve(xml: &str, count: usize, separator: &str) -> Result<String, FetchError> {
    collect_titles(xml, count, separator, |stack| {
        stack.last().is_some_and(|name| name == "longTitle")
    })
}

/// Titles live in `<item><title>` elements of the RSS channel; the
/// channel itself also has a `<title>`, which must not be picked up.
pub fn parse_bbc(xml: &str, count: usize, separator: &str) -> Result<String, FetchError> {
    collect_titles(xml, count, separator, |stack| {
        let n = stack.len();
        n >= 2 && stack[n - 1] == "title" && stack[n - 2] == "item"
    })
}

fn collect_titles(
    xml: &str,
    count: usize,
    separator: &str,
    is_title: impl Fn(&[String]) -> bool,
) -> Result<String, FetchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut titles = String::new();
    let mut found = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(name);
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(t)) if found < count && is_title(&stack) => {
                let text = t.unescape().map_err(|e| FetchError::Parse(e.to_string()))?;
                if !text.trim().is_empty() {
                    titles.push_str(text.trim());
                    titles.push_str(separator);
                    found += 1;
                }
            }
            Ok(Event::CData(t)) if found < count && is_title(&stack) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                if !text.trim().is_empty() {
                    titles.push_str(text.trim());
                    titles.push_str(separator);
                    found += 1;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FetchError::Parse(e.to_string())),
            Ok(_) => {}
        }
    }

    Ok(titles)
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
