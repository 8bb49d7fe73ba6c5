//! DuckDuckGo search over the HTML endpoint

use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::debug;

use super::{SearchProvider, Snippet};
use crate::error::{Result, ZetesisError};

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Longest snippet body kept, in characters
pub const MAX_BODY_CHARS: usize = 500;

/// Web search against DuckDuckGo's no-JavaScript result page.
///
/// One GET per query, parsed with regular expressions. Anything other than a
/// 2xx page with at least one result is reported as an error.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl DuckDuckGoSearch {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_page(&self, query: &str) -> Result<String> {
        let url = format!("{}?q={}", self.base_url, urlencoding::encode(query));
        debug!(%url, "Fetching search page");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ZetesisError::Search(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(ZetesisError::Search(format!(
                "HTTP error {} for {}",
                response.status(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ZetesisError::Search(format!("Failed to read search page: {}", e)))
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Snippet>> {
        let html = self.fetch_page(query).await?;
        let results = parse_results(&html, max_results)?;

        if results.is_empty() {
            return Err(ZetesisError::Search(format!(
                "No search results found for query: '{}'",
                query
            )));
        }

        Ok(results)
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

fn regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ZetesisError::Search(format!("Invalid pattern: {}", e)))
}

/// Extract up to `max_results` snippets from a result page.
pub fn parse_results(html: &str, max_results: usize) -> Result<Vec<Snippet>> {
    let title_re = regex(r#"(?s)<a([^>]*class="result__a"[^>]*)>(.*?)</a>"#)?;
    let snippet_re = regex(r#"(?s)<a[^>]*class="result__snippet"[^>]*>(.*?)</a>"#)?;
    let href_re = regex(r#"href="([^"]*)""#)?;
    let tag_re = regex(r"<[^>]+>")?;
    let space_re = regex(r"\s+")?;

    let clean = |fragment: &str| -> String {
        let text = tag_re.replace_all(fragment, " ");
        let text = decode_entities(&text);
        space_re.replace_all(&text, " ").trim().to_string()
    };

    let titles: Vec<_> = title_re.captures_iter(html).collect();
    let bodies: Vec<(usize, String)> = snippet_re
        .captures_iter(html)
        .filter_map(|c| Some((c.get(0)?.start(), clean(c.get(1)?.as_str()))))
        .collect();

    let mut results = Vec::new();

    for (index, caps) in titles.iter().enumerate() {
        if results.len() >= max_results {
            break;
        }

        let (Some(whole), Some(attrs), Some(inner)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };

        let title = clean(inner.as_str());
        if title.is_empty() {
            continue;
        }

        let Some(url) = href_re
            .captures(attrs.as_str())
            .and_then(|h| h.get(1))
            .and_then(|h| resolve_href(h.as_str()))
        else {
            continue;
        };

        let block_end = titles
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(html.len(), |m| m.start());
        let body = bodies
            .iter()
            .find(|(start, _)| *start >= whole.end() && *start < block_end)
            .map(|(_, text)| truncate_chars(text, MAX_BODY_CHARS))
            .unwrap_or_default();

        results.push(Snippet::new(title, body).with_url(url));
    }

    Ok(results)
}

/// Turn a result link into a target URL, unwrapping DuckDuckGo redirects.
fn resolve_href(raw: &str) -> Option<String> {
    let href = decode_entities(raw);

    let url = if let Some(start) = href.find("uddg=") {
        let param = &href[start + 5..];
        let param = param.split('&').next().unwrap_or(param);
        urlencoding::decode(param).ok()?.into_owned()
    } else if href.starts_with("http://") || href.starts_with("https://") {
        href
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        return None;
    };

    // Sponsored results point back into duckduckgo.com
    if url.contains("duckduckgo.com") {
        return None;
    }

    Some(url)
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
