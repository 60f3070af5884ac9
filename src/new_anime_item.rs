use crate::{
    anime_form::{AnimeForm, EnrichedRecord},
    config::Config,
    enrich::Enricher,
    error::AnimeItemError,
    item_payload::ItemPayload,
    wikibase::WikibasePlatform,
};
use anyhow::Result;
use log::info;

pub const CREATE_RIGHT: &str = "createpage";
pub const ZHWP_ARTICLE_URL: &str = "https://zh.wikipedia.org/wiki/";
const NAME_LABEL: &str = "動畫名稱";
const PREVIEW_HEADING: &str = "預覽結果：";

/// Creates new anime items on a Wikibase, after enriching the submitted form.
#[derive(Debug)]
pub struct NewAnimeItem<P: WikibasePlatform> {
    config: Config,
    enricher: Enricher,
    platform: P,
}

impl<P: WikibasePlatform> NewAnimeItem<P> {
    pub fn new(config: &Config, platform: P) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            enricher: Enricher::new(config)?,
            platform,
        })
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// A status left empty (or cleared with "-") falls back to "playing".
    pub async fn enrich(&self, form: &AnimeForm) -> EnrichedRecord {
        let mut record = self.enricher.enrich(form).await;
        if record.form.status.is_empty() {
            record.form.status = self.config.items.status_playing.to_owned();
        }
        record
    }

    /// Enriches the form and renders what would be saved, as wikitext.
    pub async fn preview(&self, form: &AnimeForm) -> Result<String> {
        let record = self.enrich(form).await;
        Ok(self.render_preview(&record).await)
    }

    /// Enriches the form and creates the item. Returns the new item ID.
    pub async fn save(&mut self, form: &AnimeForm) -> Result<String> {
        if self.platform.is_read_only().await? {
            return Err(AnimeItemError::ReadOnly.into());
        }
        if !self.platform.user_can(CREATE_RIGHT).await? {
            return Err(AnimeItemError::PermissionDenied(CREATE_RIGHT.to_string()).into());
        }
        let record = self.enrich(form).await;
        if record.form.name.is_empty() {
            return Err(AnimeItemError::ValidationFailure("anime name is empty".into()).into());
        }
        if !self.config.items.is_status(&record.form.status) {
            return Err(AnimeItemError::ValidationFailure(format!(
                "'{}' is not a status item",
                record.form.status
            ))
            .into());
        }
        let payload = ItemPayload::from_record(&record, &self.config);
        let item_id = self
            .platform
            .create_item(&payload.to_json(), &payload.summary())
            .await?;
        info!("Created {item_id} for '{}'", record.form.name);
        Ok(item_id)
    }

    async fn label_or_id(&self, entity_id: &str) -> String {
        self.platform
            .get_label(entity_id, &self.config.language)
            .await
            .unwrap_or_else(|| entity_id.to_string())
    }

    async fn render_preview(&self, record: &EnrichedRecord) -> String {
        let form = &record.form;
        let props = &self.config.properties;
        let mut lines = vec![
            PREVIEW_HEADING.to_string(),
            format!("* {NAME_LABEL}：{}", form.name),
            format!("* {}：{}", self.label_or_id(&props.episodes_seen).await, form.seen),
            format!("* {}：{}", self.label_or_id(&props.episodes_all).await, form.episodes),
            format!(
                "* {}：{}",
                self.label_or_id(&props.status).await,
                self.label_or_id(&form.status).await
            ),
            format!("* {}：{}", self.label_or_id(&props.length).await, form.length),
        ];

        if !form.zhwp_title.is_empty() {
            lines.push(format!(
                "* {}：{ZHWP_ARTICLE_URL}{}",
                self.label_or_id(&props.zhwp_title).await,
                form.zhwp_title
            ));
        }
        let optional = [
            (&props.gamer_link, &form.gamer_link),
            (&props.run_date, &form.run_date),
            (&props.gamer_video, &form.gamer_video),
            (&props.anime1_video, &form.anime1_video),
        ];
        for (property, value) in optional {
            if !value.is_empty() {
                lines.push(format!("* {}：{value}", self.label_or_id(property).await));
            }
        }
        if !form.age_rating.is_empty() {
            lines.push(format!(
                "* {}：{}",
                self.label_or_id(&props.age_rating).await,
                self.label_or_id(&form.age_rating).await
            ));
        }
        lines.join("\n") + "\n"
    }
}
