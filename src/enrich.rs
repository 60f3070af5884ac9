use crate::{
    anime_form::{AnimeForm, EnrichedRecord},
    config::{Config, ItemIds},
    gamer::Gamer,
    text::is_sentinel,
    zhwp::TitleResolver,
};
use anyhow::Result;
use log::{info, warn};

/// Fills blank form fields from zh.wikipedia and acg.gamer.com.tw.
/// Fields the editor filled in are never overwritten by scraped values.
#[derive(Debug, Clone)]
pub struct Enricher {
    titles: TitleResolver,
    gamer: Gamer,
    items: ItemIds,
}

impl Enricher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self {
            titles: TitleResolver::new(client.clone(), &config.zhwp_api),
            gamer: Gamer::new(client, &config.gamer_search),
            items: config.items.clone(),
        })
    }

    /// Never fails; every lookup that goes wrong just leaves its field(s) empty.
    pub async fn enrich(&self, form: &AnimeForm) -> EnrichedRecord {
        let mut form = form.normalized();
        let mut rating_source = None;
        if !form.name.is_empty() && !is_sentinel(&form.name) {
            self.fill_zhwp_title(&mut form).await;
            self.fill_gamer_link(&mut form).await;
            rating_source = self.fill_from_detail_page(&mut form).await;
        }

        let form = form.sentinels_cleared();
        if form.age_rating.is_empty() {
            rating_source = None;
        }
        EnrichedRecord {
            form,
            rating_source,
        }
    }

    async fn fill_zhwp_title(&self, form: &mut AnimeForm) {
        if is_sentinel(&form.zhwp_title) {
            return;
        }
        let query = if form.zhwp_title.is_empty() {
            form.name.to_owned()
        } else {
            form.zhwp_title.to_owned()
        };
        match self.titles.resolve_title(&query).await {
            Ok(Some(title)) => form.zhwp_title = title,
            Ok(None) => info!("No zhwp article for '{query}'"),
            Err(e) => warn!("zhwp lookup for '{query}' failed: {e}"),
        }
    }

    async fn fill_gamer_link(&self, form: &mut AnimeForm) {
        if !form.gamer_link.is_empty() {
            return;
        }
        match self.gamer.locate_detail_page(&form.name).await {
            Ok(Some(url)) => form.gamer_link = url,
            Ok(None) => info!("No gamer detail page for '{}'", form.name),
            Err(e) => warn!("gamer search for '{}' failed: {e}", form.name),
        }
    }

    /// Returns the detail page URL if the age rating was taken from it.
    async fn fill_from_detail_page(&self, form: &mut AnimeForm) -> Option<String> {
        if form.gamer_link.is_empty() || is_sentinel(&form.gamer_link) {
            return None;
        }
        if !form.run_date.is_empty() && !form.age_rating.is_empty() && !form.gamer_video.is_empty()
        {
            return None;
        }
        let info = match self.gamer.extract_detail_fields(&form.gamer_link).await {
            Ok(info) => info,
            Err(e) => {
                warn!("gamer detail page {} failed: {e}", form.gamer_link);
                return None;
            }
        };

        if form.run_date.is_empty() {
            if let Some(run_date) = info.run_date {
                form.run_date = run_date;
            }
        }
        if form.gamer_video.is_empty() {
            if let Some(video) = info.video {
                form.gamer_video = video;
            }
        }
        if !form.age_rating.is_empty() {
            return None;
        }
        let level = info.age_rating?.level();
        match self.items.rating_item(level) {
            Some(item) => {
                form.age_rating = item.to_string();
                Some(form.gamer_link.to_owned())
            }
            None => {
                warn!("No rating item configured for age {level}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::get_test_config;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DETAIL_HTML: &str = r#"<li>當地首播：2013-04-07</li>
<img src="https://i2.bahamut.com.tw/acg/TW-12TO18.gif">
<div class="seasonACG"><ul><li><a href="//ani.gamer.com.tw/animeRef.php?sn=111">第一季</a></li></ul></div>"#;

    struct MockSites {
        zhwp: MockServer,
        gamer: MockServer,
    }

    impl MockSites {
        async fn new() -> Self {
            Self {
                zhwp: MockServer::start().await,
                gamer: MockServer::start().await,
            }
        }

        fn config(&self) -> Config {
            let mut config = get_test_config();
            config.zhwp_api = format!("{}/w/api.php", self.zhwp.uri());
            config.gamer_search = format!("{}/search.php", self.gamer.uri());
            config
        }

        fn detail_url(&self) -> String {
            format!("{}/acgDetail.php?s=40410", self.gamer.uri())
        }

        async fn zhwp_title(&self, title: &str, times: u64) {
            Mock::given(method("POST"))
                .and(path("/w/api.php"))
                .respond_with(ResponseTemplate::new(200).set_body_json(
                    json!({"query": {"pages": [{"ns": 0, "title": title}]}}),
                ))
                .expect(times)
                .mount(&self.zhwp)
                .await;
        }

        async fn search(&self, times: u64) {
            let html = format!(
                "[ 動畫 ]\n<a target=\"_blank\" href=\"{}\">",
                self.detail_url()
            );
            Mock::given(method("GET"))
                .and(path("/search.php"))
                .respond_with(ResponseTemplate::new(200).set_body_string(html))
                .expect(times)
                .mount(&self.gamer)
                .await;
        }

        async fn detail(&self, times: u64) {
            Mock::given(method("GET"))
                .and(path("/acgDetail.php"))
                .and(query_param("s", "40410"))
                .respond_with(ResponseTemplate::new(200).set_body_string(DETAIL_HTML))
                .expect(times)
                .mount(&self.gamer)
                .await;
        }
    }

    fn named_form(name: &str) -> AnimeForm {
        AnimeForm::new(name, &get_test_config())
    }

    #[tokio::test]
    async fn test_enrich_fills_everything() {
        let sites = MockSites::new().await;
        sites.zhwp_title("進擊的巨人", 1).await;
        sites.search(1).await;
        sites.detail(1).await;
        let enricher = Enricher::new(&sites.config()).unwrap();

        let record = enricher.enrich(&named_form(" Attack on Titan ")).await;
        assert_eq!(record.form.name, "Attack on Titan");
        assert_eq!(record.form.zhwp_title, "進擊的巨人");
        assert_eq!(record.form.gamer_link, sites.detail_url());
        assert_eq!(record.form.run_date, "2013-04-07");
        assert_eq!(record.form.age_rating, "Q12");
        assert_eq!(
            record.form.gamer_video,
            "https://ani.gamer.com.tw/animeRef.php?sn=111"
        );
        assert_eq!(record.rating_source, Some(sites.detail_url()));
        assert!(record.form.anime1_video.is_empty());
    }

    #[tokio::test]
    async fn test_enrich_empty_name_makes_no_lookups() {
        let sites = MockSites::new().await;
        sites.zhwp_title("進擊的巨人", 0).await;
        sites.search(0).await;
        sites.detail(0).await;
        let enricher = Enricher::new(&sites.config()).unwrap();

        let form = AnimeForm {
            zhwp_title: "進擊的巨人".into(),
            ..named_form("  ")
        };
        let record = enricher.enrich(&form).await;
        assert_eq!(record.form.name, "");
        assert_eq!(record.form.zhwp_title, "進擊的巨人");
        assert_eq!(record.form.gamer_link, "");
        assert_eq!(record.form.run_date, "");
        assert_eq!(record.rating_source, None);
    }

    #[tokio::test]
    async fn test_enrich_sentinel_name_makes_no_lookups() {
        let sites = MockSites::new().await;
        sites.zhwp_title("進擊的巨人", 0).await;
        sites.search(0).await;
        sites.detail(0).await;
        let enricher = Enricher::new(&sites.config()).unwrap();

        let record = enricher.enrich(&named_form(" - ")).await;
        assert_eq!(record.form.name, "");
        assert_eq!(record.form.zhwp_title, "");
        assert_eq!(record.form.gamer_link, "");
    }

    #[tokio::test]
    async fn test_enrich_fully_specified_is_unchanged() {
        let sites = MockSites::new().await;
        // The supplied title is already canonical
        sites.zhwp_title("進擊的巨人", 1).await;
        sites.search(0).await;
        sites.detail(0).await;
        let enricher = Enricher::new(&sites.config()).unwrap();

        let form = AnimeForm {
            zhwp_title: "進擊的巨人".into(),
            gamer_link: sites.detail_url(),
            gamer_video: "https://ani.gamer.com.tw/animeRef.php?sn=1".into(),
            anime1_video: "https://anime1.me/category/2013/進擊的巨人".into(),
            run_date: "2013-04-06".into(),
            age_rating: "Q14".into(),
            ..named_form("進擊的巨人")
        };
        let record = enricher.enrich(&form).await;
        assert_eq!(record.form, form);
        assert_eq!(record.rating_source, None);
    }

    #[tokio::test]
    async fn test_enrich_user_values_win() {
        let sites = MockSites::new().await;
        sites.zhwp_title("進擊的巨人", 1).await;
        sites.search(1).await;
        sites.detail(1).await;
        let enricher = Enricher::new(&sites.config()).unwrap();

        let form = AnimeForm {
            run_date: "2013-04-06".into(),
            age_rating: "Q14".into(),
            ..named_form("進擊的巨人")
        };
        let record = enricher.enrich(&form).await;
        assert_eq!(record.form.run_date, "2013-04-06");
        assert_eq!(record.form.age_rating, "Q14");
        assert!(!record.form.gamer_video.is_empty());
        assert_eq!(record.rating_source, None);
    }

    #[tokio::test]
    async fn test_enrich_sentinel_clears() {
        let sites = MockSites::new().await;
        sites.zhwp_title("進擊的巨人", 0).await;
        sites.search(1).await;
        sites.detail(1).await;
        let enricher = Enricher::new(&sites.config()).unwrap();

        let form = AnimeForm {
            zhwp_title: "-".into(),
            gamer_video: " - ".into(),
            age_rating: "-".into(),
            ..named_form("進擊的巨人")
        };
        let record = enricher.enrich(&form).await;
        assert_eq!(record.form.zhwp_title, "");
        assert_eq!(record.form.gamer_video, "");
        assert_eq!(record.form.age_rating, "");
        assert_eq!(record.form.run_date, "2013-04-07");
        assert_eq!(record.rating_source, None);
    }

    #[tokio::test]
    async fn test_enrich_sentinel_gamer_link_skips_detail_page() {
        let sites = MockSites::new().await;
        sites.zhwp_title("進擊的巨人", 1).await;
        sites.search(0).await;
        sites.detail(0).await;
        let enricher = Enricher::new(&sites.config()).unwrap();

        let form = AnimeForm {
            gamer_link: "-".into(),
            ..named_form("進擊的巨人")
        };
        let record = enricher.enrich(&form).await;
        assert_eq!(record.form.gamer_link, "");
        assert_eq!(record.form.run_date, "");
        assert_eq!(record.form.zhwp_title, "進擊的巨人");
    }

    #[tokio::test]
    async fn test_enrich_title_override_is_canonicalized() {
        let sites = MockSites::new().await;
        Mock::given(method("POST"))
            .and(path("/w/api.php"))
            .and(wiremock::matchers::body_string_contains("titles=Shingeki"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"query": {"pages": [{"title": "進擊的巨人 (動畫)"}]}}),
            ))
            .expect(1)
            .mount(&sites.zhwp)
            .await;
        sites.search(1).await;
        sites.detail(1).await;
        let enricher = Enricher::new(&sites.config()).unwrap();

        let form = AnimeForm {
            zhwp_title: "Shingeki".into(),
            ..named_form("進擊的巨人")
        };
        let record = enricher.enrich(&form).await;
        assert_eq!(record.form.zhwp_title, "進擊的巨人_(動畫)");
        // Detail page is still located from the anime name
        assert_eq!(record.form.gamer_link, sites.detail_url());
    }

    #[tokio::test]
    async fn test_enrich_unknown_title_override_is_kept() {
        let sites = MockSites::new().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"query": {"pages": [{"title": "Xyzzy", "missing": true}]}}),
            ))
            .mount(&sites.zhwp)
            .await;
        let enricher = Enricher::new(&sites.config()).unwrap();

        let form = AnimeForm {
            zhwp_title: "Xyzzy".into(),
            gamer_link: "-".into(),
            ..named_form("進擊的巨人")
        };
        let record = enricher.enrich(&form).await;
        assert_eq!(record.form.zhwp_title, "Xyzzy");
    }

    #[tokio::test]
    async fn test_enrich_survives_failing_sites() {
        let sites = MockSites::new().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&sites.zhwp)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&sites.gamer)
            .await;
        let enricher = Enricher::new(&sites.config()).unwrap();

        let record = enricher.enrich(&named_form("進擊的巨人")).await;
        assert_eq!(record.form, named_form("進擊的巨人"));
        assert_eq!(record.rating_source, None);
    }

    #[tokio::test]
    async fn test_enrich_detail_page_failure_keeps_other_fields() {
        let sites = MockSites::new().await;
        sites.zhwp_title("進擊的巨人", 1).await;
        sites.search(1).await;
        Mock::given(method("GET"))
            .and(path("/acgDetail.php"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&sites.gamer)
            .await;
        let enricher = Enricher::new(&sites.config()).unwrap();

        let record = enricher.enrich(&named_form("進擊的巨人")).await;
        assert_eq!(record.form.zhwp_title, "進擊的巨人");
        assert_eq!(record.form.gamer_link, sites.detail_url());
        assert_eq!(record.form.run_date, "");
        assert_eq!(record.form.age_rating, "");
    }

    #[tokio::test]
    async fn test_enrich_unconfigured_rating_item() {
        let sites = MockSites::new().await;
        sites.zhwp_title("進擊的巨人", 1).await;
        sites.search(1).await;
        sites.detail(1).await;
        let mut config = sites.config();
        config.items.rating_12 = String::new();
        let enricher = Enricher::new(&config).unwrap();

        let record = enricher.enrich(&named_form("進擊的巨人")).await;
        assert_eq!(record.form.age_rating, "");
        assert_eq!(record.rating_source, None);
        assert_eq!(record.form.run_date, "2013-04-07");
    }

    #[tokio::test]
    async fn test_enrich_is_deterministic() {
        let sites = MockSites::new().await;
        sites.zhwp_title("進擊的巨人", 2).await;
        sites.search(2).await;
        sites.detail(2).await;
        let enricher = Enricher::new(&sites.config()).unwrap();

        let form = named_form("進擊的巨人");
        let first = enricher.enrich(&form).await;
        let second = enricher.enrich(&form).await;
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
