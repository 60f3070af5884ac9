use crate::error::AnimeItemError;
use anyhow::Result;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use reqwest::Url;
use urlencoding::encode;

lazy_static! {
    static ref RE_SEARCH_ANIME_LINK: Regex =
        Regex::new(r#"\[ 動畫 \]\r?\n<a target="_blank" href="([^"]+?)""#).unwrap();
    static ref RE_RUN_DATE: Regex =
        Regex::new(r"當地(?:首播|發售)：(\d{4})-(\d{2})-(\d{2})").unwrap();
    static ref RE_AGE_RATING: Regex =
        Regex::new(r"TW-(ALL|6TO12|12TO18|15TO18|18UP)\.gif").unwrap();
    static ref RE_SEASON_VIDEO: Regex =
        Regex::new(r#"<div class="seasonACG"><ul><li><a href="([^"]*?)""#).unwrap();
}

/// Taiwanese age rating, as shown by the rating badge on a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeRating {
    All,
    Protected,
    ParentalGuidance12,
    ParentalGuidance15,
    Restricted,
}

impl AgeRating {
    /// `code` is the part of the badge filename after `TW-`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ALL" => Some(Self::All),
            "6TO12" => Some(Self::Protected),
            "12TO18" => Some(Self::ParentalGuidance12),
            "15TO18" => Some(Self::ParentalGuidance15),
            "18UP" => Some(Self::Restricted),
            _ => None,
        }
    }

    /// Minimum age.
    pub const fn level(&self) -> u8 {
        match self {
            Self::All => 0,
            Self::Protected => 6,
            Self::ParentalGuidance12 => 12,
            Self::ParentalGuidance15 => 15,
            Self::Restricted => 18,
        }
    }
}

/// Whatever could be scraped from a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamerInfo {
    /// YYYY-MM-DD
    pub run_date: Option<String>,
    pub age_rating: Option<AgeRating>,
    /// Companion video page on ani.gamer.com.tw
    pub video: Option<String>,
}

/// Client for the Bahamut ACG database (acg.gamer.com.tw).
#[derive(Debug, Clone)]
pub struct Gamer {
    client: reqwest::Client,
    search_url: String,
}

impl Gamer {
    pub fn new(client: reqwest::Client, search_url: &str) -> Self {
        Self {
            client,
            search_url: search_url.to_string(),
        }
    }

    fn keyword_search_url(&self, name: &str) -> String {
        format!("{}?kw={}&s=1", self.search_url, encode(name))
    }

    async fn load_text_from_url(&self, url: &str) -> Result<String> {
        let fetch_failure = |e: reqwest::Error| AnimeItemError::FetchFailure(format!("{url} ({e})"));
        let text = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(fetch_failure)?
            .text()
            .await
            .map_err(fetch_failure)?;
        Ok(text)
    }

    /// Searches for `name` and returns the first anime detail page in the results.
    pub async fn locate_detail_page(&self, name: &str) -> Result<Option<String>> {
        let url = self.keyword_search_url(name);
        let html = self.load_text_from_url(&url).await?;
        let ret = Self::detail_page_from_search(&html, &url);
        debug!("gamer detail page for '{name}': {ret:?}");
        Ok(ret)
    }

    pub fn detail_page_from_search(html: &str, base_url: &str) -> Option<String> {
        let caps = RE_SEARCH_ANIME_LINK.captures(html)?;
        Self::absolute_url(base_url, caps.get(1)?.as_str())
    }

    /// Loads a detail page and scrapes run date, age rating, and companion video.
    pub async fn extract_detail_fields(&self, url: &str) -> Result<GamerInfo> {
        let html = self.load_text_from_url(url).await?;
        let ret = Self::info_from_detail_page(&html, url);
        debug!("gamer info for {url}: {ret:?}");
        Ok(ret)
    }

    pub fn info_from_detail_page(html: &str, page_url: &str) -> GamerInfo {
        GamerInfo {
            run_date: Self::run_date_from_html(html),
            age_rating: Self::age_rating_from_html(html),
            video: Self::video_from_html(html, page_url),
        }
    }

    fn run_date_from_html(html: &str) -> Option<String> {
        let caps = RE_RUN_DATE.captures(html)?;
        let date = format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]);
        // Placeholders like 0000-00-00 show up for unannounced dates
        NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok()?;
        Some(date)
    }

    fn age_rating_from_html(html: &str) -> Option<AgeRating> {
        let caps = RE_AGE_RATING.captures(html)?;
        AgeRating::from_code(&caps[1])
    }

    fn video_from_html(html: &str, page_url: &str) -> Option<String> {
        let caps = RE_SEASON_VIDEO.captures(html)?;
        Self::absolute_url(page_url, caps.get(1)?.as_str())
    }

    /// Links on the site are protocol-relative (`//ani.gamer.com.tw/...`) or path-relative.
    /// Both come out as https, whatever scheme the page was fetched with.
    fn absolute_url(base_url: &str, href: &str) -> Option<String> {
        let href = html_escape::decode_html_entities(href.trim());
        if href.is_empty() {
            return None;
        }
        if href.starts_with("//") {
            return Some(format!("https:{href}"));
        }
        if let Ok(url) = Url::parse(&href) {
            return Some(url.to_string());
        }
        let mut url = Url::parse(base_url).ok()?.join(&href).ok()?;
        url.set_scheme("https").ok()?;
        Some(url.to_string())
    }
}
