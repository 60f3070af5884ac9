use crate::{
    config::Config,
    text::{clear_sentinel, normalize},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEEN: i64 = 1;
pub const DEFAULT_EPISODES: i64 = 1;
pub const DEFAULT_LENGTH: i64 = 24;

/// What an editor submits for a new anime item.
/// Empty strings mean "not supplied"; the sentinel "-" means "keep empty".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeForm {
    pub name: String,
    pub seen: i64,
    pub episodes: i64,
    /// Status item, eg "currently watching"
    pub status: String,
    /// Minutes per episode
    pub length: i64,
    pub zhwp_title: String,
    pub gamer_link: String,
    pub gamer_video: String,
    pub anime1_video: String,
    pub run_date: String,
    /// Age rating item
    pub age_rating: String,
}

impl AnimeForm {
    /// A form with the defaults the submission page starts with.
    pub fn new(name: &str, config: &Config) -> Self {
        Self {
            name: normalize(name),
            seen: DEFAULT_SEEN,
            episodes: DEFAULT_EPISODES,
            status: config.items.status_playing.to_owned(),
            length: DEFAULT_LENGTH,
            ..Default::default()
        }
    }

    fn text_fields_mut(&mut self) -> [&mut String; 8] {
        [
            &mut self.name,
            &mut self.status,
            &mut self.zhwp_title,
            &mut self.gamer_link,
            &mut self.gamer_video,
            &mut self.anime1_video,
            &mut self.run_date,
            &mut self.age_rating,
        ]
    }

    /// Trims every text field.
    pub fn normalized(&self) -> Self {
        let mut ret = self.clone();
        for field in ret.text_fields_mut() {
            *field = normalize(field);
        }
        ret
    }

    /// Empties every text field that holds the sentinel.
    pub fn sentinels_cleared(&self) -> Self {
        let mut ret = self.clone();
        for field in ret.text_fields_mut() {
            *field = clear_sentinel(field);
        }
        ret
    }
}

/// A form after external lookups filled what they could.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub form: AnimeForm,
    /// Detail page the age rating was scraped from, if it was scraped
    pub rating_source: Option<String>,
}

impl EnrichedRecord {
    pub fn new(form: AnimeForm) -> Self {
        Self {
            form,
            rating_source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::get_test_config;

    #[test]
    fn test_new_defaults() {
        let form = AnimeForm::new("  孤獨搖滾 ", &get_test_config());
        assert_eq!(form.name, "孤獨搖滾");
        assert_eq!(form.seen, 1);
        assert_eq!(form.episodes, 1);
        assert_eq!(form.length, 24);
        assert_eq!(form.status, "Q3");
        assert!(form.zhwp_title.is_empty());
        assert!(form.age_rating.is_empty());
    }

    #[test]
    fn test_normalized() {
        let form = AnimeForm {
            name: " 進擊的巨人\t".into(),
            gamer_link: "\nhttps://acg.gamer.com.tw/acgDetail.php?s=1 ".into(),
            run_date: " - ".into(),
            seen: 3,
            ..Default::default()
        };
        let form = form.normalized();
        assert_eq!(form.name, "進擊的巨人");
        assert_eq!(form.gamer_link, "https://acg.gamer.com.tw/acgDetail.php?s=1");
        assert_eq!(form.run_date, "-");
        assert_eq!(form.seen, 3);
    }

    #[test]
    fn test_sentinels_cleared() {
        let form = AnimeForm {
            name: "進擊的巨人".into(),
            zhwp_title: "-".into(),
            gamer_video: "-".into(),
            age_rating: "Q12".into(),
            ..Default::default()
        };
        let form = form.sentinels_cleared();
        assert_eq!(form.name, "進擊的巨人");
        assert_eq!(form.zhwp_title, "");
        assert_eq!(form.gamer_video, "");
        assert_eq!(form.age_rating, "Q12");
    }

    #[test]
    fn test_enriched_record_serializes_flat() {
        let record = EnrichedRecord::new(AnimeForm {
            name: "x".into(),
            ..Default::default()
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "x");
        assert!(json["rating_source"].is_null());
    }
}
