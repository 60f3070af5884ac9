use crate::error::AnimeItemError;
use anyhow::Result;
use log::debug;
use serde_json::Value;

/// Resolves free-text names to canonical Chinese Wikipedia article titles.
#[derive(Debug, Clone)]
pub struct TitleResolver {
    client: reqwest::Client,
    api_url: String,
}

impl TitleResolver {
    pub fn new(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
        }
    }

    /// Looks up `name`, following redirects and variant conversion.
    /// Returns the canonical title with underscores, or `None` if there is no such page.
    pub async fn resolve_title(&self, name: &str) -> Result<Option<String>> {
        let params = [
            ("action", "query"),
            ("format", "json"),
            ("titles", name),
            ("redirects", "1"),
            ("converttitles", "1"),
            ("utf8", "1"),
            ("formatversion", "2"),
        ];
        let fetch_failure =
            |e: reqwest::Error| AnimeItemError::FetchFailure(format!("{} ({e})", self.api_url));
        let json = self
            .client
            .post(&self.api_url)
            .form(&params)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(fetch_failure)?
            .json::<Value>()
            .await
            .map_err(fetch_failure)?;
        let ret = Self::title_from_response(&json);
        debug!("zhwp title for '{name}': {ret:?}");
        Ok(ret)
    }

    /// Only the first page counts.
    pub fn title_from_response(json: &Value) -> Option<String> {
        let page = json["query"]["pages"].as_array()?.first()?;
        if Self::is_flagged(page, "missing") || Self::is_flagged(page, "invalid") {
            return None;
        }
        let title = page["title"].as_str()?.trim();
        if title.is_empty() {
            return None;
        }
        Some(title.replace(' ', "_"))
    }

    // formatversion=2 uses `true`, older responses an empty string
    fn is_flagged(page: &Value, key: &str) -> bool {
        match page.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }
}
