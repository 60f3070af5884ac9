use crate::error::AnimeItemError;
use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::time::Duration;

pub const ZHWP_API_URL: &str = "https://zh.wikipedia.org/w/api.php";
pub const GAMER_SEARCH_URL: &str = "https://acg.gamer.com.tw/search.php";
pub const DEFAULT_TIMEOUT_SEC: u64 = 10;
pub const DEFAULT_LANGUAGE: &str = "zh-tw";
const USER_AGENT: &str = concat!("anime_item/", env!("CARGO_PKG_VERSION"));

/*
A minimal config.json:
{
    "wikibase": {"api": "https://anime.example.org/w/api.php", "token": ".."},
    "properties": {"instance_of": "P1", "episodes_seen": "P2", ...},
    "items": {"anime": "Q1", "status_playing": "Q3", "minute_unit": "https://anime.example.org/entity/Q9", ...}
}
*/

#[derive(Debug, Clone, Deserialize)]
pub struct WikibaseConfig {
    pub api: String,
    pub token: String,
}

/// Property IDs of the statements written to a new item.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyIds {
    pub instance_of: String,
    pub episodes_seen: String,
    pub episodes_all: String,
    pub status: String,
    pub length: String,
    pub zhwp_title: String,
    pub gamer_link: String,
    pub gamer_video: String,
    pub anime1_video: String,
    pub run_date: String,
    pub age_rating: String,
}

/// Item IDs (and the length unit) used as statement values.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemIds {
    pub anime: String,
    pub status_not_started: String,
    pub status_playing: String,
    pub status_finished: String,
    /// Full concept URI, eg `https://anime.example.org/entity/Q9`
    pub minute_unit: String,
    pub rating_0: String,
    pub rating_6: String,
    pub rating_12: String,
    pub rating_15: String,
    pub rating_18: String,
}

impl ItemIds {
    /// The rating item for an age level (0, 6, 12, 15, 18).
    pub fn rating_item(&self, level: u8) -> Option<&str> {
        let item = match level {
            0 => &self.rating_0,
            6 => &self.rating_6,
            12 => &self.rating_12,
            15 => &self.rating_15,
            18 => &self.rating_18,
            _ => return None,
        };
        if item.is_empty() { None } else { Some(item) }
    }

    /// Whether `item` is one of the three watch states.
    pub fn is_status(&self, item: &str) -> bool {
        [
            &self.status_not_started,
            &self.status_playing,
            &self.status_finished,
        ]
        .iter()
        .any(|status| !status.is_empty() && status.as_str() == item)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub wikibase: Option<WikibaseConfig>,
    #[serde(default = "Config::default_language")]
    pub language: String,
    #[serde(default = "Config::default_zhwp_api")]
    pub zhwp_api: String,
    #[serde(default = "Config::default_gamer_search")]
    pub gamer_search: String,
    #[serde(default = "Config::default_timeout_sec")]
    pub timeout_sec: u64,
    #[serde(default = "Config::default_user_agent")]
    pub user_agent: String,
    pub properties: PropertyIds,
    pub items: ItemIds,
}

impl Config {
    /// Create a Config object from a config JSON file, relative to the CWD
    pub fn from_config_file(filename: &str) -> Result<Self> {
        let mut path = env::current_dir()?;
        path.push(filename);
        let file = File::open(&path).map_err(|e| {
            AnimeItemError::BadConfig(format!("can not open {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_reader(file)
            .map_err(|e| AnimeItemError::BadConfig(e.to_string()))?;
        Ok(config)
    }

    pub fn wikibase(&self) -> Result<&WikibaseConfig> {
        self.wikibase
            .as_ref()
            .ok_or_else(|| AnimeItemError::BadConfig("no 'wikibase' section".into()).into())
    }

    /// The one HTTP client used for all outbound fetches of a submission.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(Duration::from_secs(self.timeout_sec))
            .build()?;
        Ok(client)
    }

    fn default_language() -> String {
        DEFAULT_LANGUAGE.to_string()
    }

    fn default_zhwp_api() -> String {
        ZHWP_API_URL.to_string()
    }

    fn default_gamer_search() -> String {
        GAMER_SEARCH_URL.to_string()
    }

    const fn default_timeout_sec() -> u64 {
        DEFAULT_TIMEOUT_SEC
    }

    fn default_user_agent() -> String {
        USER_AGENT.to_string()
    }
}

#[cfg(test)]
pub(crate) fn get_test_config_json() -> serde_json::Value {
    serde_json::json!({
        "properties": {
            "instance_of": "P1",
            "episodes_seen": "P2",
            "episodes_all": "P3",
            "status": "P4",
            "length": "P5",
            "zhwp_title": "P6",
            "gamer_link": "P7",
            "gamer_video": "P8",
            "anime1_video": "P9",
            "run_date": "P10",
            "age_rating": "P11"
        },
        "items": {
            "anime": "Q1",
            "status_not_started": "Q2",
            "status_playing": "Q3",
            "status_finished": "Q4",
            "minute_unit": "https://anime.example.org/entity/Q5",
            "rating_0": "Q10",
            "rating_6": "Q11",
            "rating_12": "Q12",
            "rating_15": "Q13",
            "rating_18": "Q14"
        }
    })
}

#[cfg(test)]
pub(crate) fn get_test_config() -> Config {
    serde_json::from_value(get_test_config_json()).unwrap()
}
