use crate::{config::WikibaseConfig, error::AnimeItemError};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::info;
use mediawiki::Api;
use serde_json::Value;

/// What the submission handler needs from the wiki it writes to.
#[async_trait]
pub trait WikibasePlatform: Send + Sync {
    async fn is_read_only(&self) -> Result<bool>;
    async fn user_can(&self, right: &str) -> Result<bool>;
    /// Label of an item or property in `language`, if there is one.
    async fn get_label(&self, entity_id: &str, language: &str) -> Option<String>;
    /// Creates a new item from `wbeditentity` data, returns its ID.
    async fn create_item(&mut self, data: &Value, summary: &str) -> Result<String>;
}

/*
This requires config.json to have a section like:
"wikibase": {"api": "https://anime.example.org/w/api.php","token":".."},
*/

#[derive(Debug, Clone)]
pub struct WikiBase {
    api: Api,
}

impl WikiBase {
    pub async fn new(config: &WikibaseConfig) -> Result<Self> {
        let mut api = Api::new(&config.api).await?;
        api.set_oauth2(&config.token);
        Ok(Self { api })
    }

    fn check_api_error(result: &Value) -> Result<()> {
        match result.get("error") {
            Some(error) => Err(anyhow!(
                "API error {}: {}",
                error["code"].as_str().unwrap_or("unknown"),
                error["info"].as_str().unwrap_or_default()
            )),
            None => Ok(()),
        }
    }

    fn read_only_from_response(result: &Value) -> bool {
        match result["query"]["general"].get("readonly") {
            Some(Value::Bool(b)) => *b,
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }

    fn rights_from_response(result: &Value) -> Vec<String> {
        result["query"]["userinfo"]["rights"]
            .as_array()
            .map(|rights| {
                rights
                    .iter()
                    .filter_map(|r| r.as_str())
                    .map(|r| r.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn label_from_response(result: &Value, entity_id: &str, language: &str) -> Option<String> {
        let label = result["entities"][entity_id]["labels"][language]["value"].as_str()?;
        Some(label.to_string())
    }

    fn entity_id_from_response(result: &Value) -> Result<String> {
        Self::check_api_error(result)?;
        let id = result["entity"]["id"]
            .as_str()
            .ok_or(AnimeItemError::MissingEntityId)?;
        Ok(id.to_string())
    }
}

#[async_trait]
impl WikibasePlatform for WikiBase {
    async fn is_read_only(&self) -> Result<bool> {
        let params = self.api.params_into(&[
            ("action", "query"),
            ("meta", "siteinfo"),
            ("siprop", "general"),
        ]);
        let result = self.api.get_query_api_json(&params).await?;
        Self::check_api_error(&result)?;
        Ok(Self::read_only_from_response(&result))
    }

    async fn user_can(&self, right: &str) -> Result<bool> {
        let params = self.api.params_into(&[
            ("action", "query"),
            ("meta", "userinfo"),
            ("uiprop", "rights"),
        ]);
        let result = self.api.get_query_api_json(&params).await?;
        Self::check_api_error(&result)?;
        Ok(Self::rights_from_response(&result).iter().any(|r| r == right))
    }

    async fn get_label(&self, entity_id: &str, language: &str) -> Option<String> {
        if entity_id.is_empty() {
            return None;
        }
        let params = self.api.params_into(&[
            ("action", "wbgetentities"),
            ("ids", entity_id),
            ("props", "labels"),
            ("languages", language),
        ]);
        let result = self.api.get_query_api_json(&params).await.ok()?;
        Self::label_from_response(&result, entity_id, language)
    }

    async fn create_item(&mut self, data: &Value, summary: &str) -> Result<String> {
        let token = self.api.get_token("csrf").await?;
        let data = serde_json::to_string(data)?;
        let params = self.api.params_into(&[
            ("action", "wbeditentity"),
            ("new", "item"),
            ("summary", summary),
            ("token", &token),
            ("data", data.as_str()),
        ]);
        let result = self.api.post_query_api_json_mut(&params).await?;
        let id = Self::entity_id_from_response(&result)?;
        info!("Created {id}");
        Ok(id)
    }
}
