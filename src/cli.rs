use crate::{
    anime_form::{AnimeForm, DEFAULT_EPISODES, DEFAULT_LENGTH, DEFAULT_SEEN},
    config::Config,
    enrich::Enricher,
    new_anime_item::NewAnimeItem,
    text::normalize,
    wikibase::WikiBase,
};
use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(arg_required_else_help = true)]
#[command(name = "anime_item")]
#[command(
    about = "Creates anime items on a Wikibase, auto-filled from zh.wikipedia and acg.gamer.com.tw",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// The fields of the new-anime-item form. Pass "-" to keep a field empty.
#[derive(Args, Debug, Clone)]
struct FormArgs {
    /// Anime name, becomes the item label
    #[arg(short, long)]
    name: String,

    #[arg(long, default_value_t = DEFAULT_SEEN)]
    seen: i64,

    #[arg(long, default_value_t = DEFAULT_EPISODES)]
    episodes: i64,

    /// Status item (default: the configured "playing" item)
    #[arg(long)]
    status: Option<String>,

    /// Minutes per episode
    #[arg(long, default_value_t = DEFAULT_LENGTH)]
    length: i64,

    /// zh.wikipedia article title
    #[arg(long, default_value = "")]
    zhwp_title: String,

    /// acg.gamer.com.tw detail page
    #[arg(long, default_value = "")]
    gamer_link: String,

    /// ani.gamer.com.tw video page
    #[arg(long, default_value = "")]
    gamer_video: String,

    #[arg(long, default_value = "")]
    anime1_video: String,

    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    run_date: String,

    /// Age rating item
    #[arg(long, default_value = "")]
    age_rating: String,
}

impl FormArgs {
    fn to_form(&self, config: &Config) -> AnimeForm {
        let mut form = AnimeForm::new(&self.name, config);
        form.seen = self.seen;
        form.episodes = self.episodes;
        form.length = self.length;
        if let Some(status) = &self.status {
            form.status = normalize(status);
        }
        form.zhwp_title = self.zhwp_title.to_owned();
        form.gamer_link = self.gamer_link.to_owned();
        form.gamer_video = self.gamer_video.to_owned();
        form.anime1_video = self.anime1_video.to_owned();
        form.run_date = self.run_date.to_owned();
        form.age_rating = self.age_rating.to_owned();
        form
    }
}

#[derive(Subcommand)]
enum Commands {
    /// shows what would be saved
    Preview {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[command(flatten)]
        form: FormArgs,
    },

    /// creates the item
    Create {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[command(flatten)]
        form: FormArgs,
    },

    /// prints the enriched form as JSON, without touching the wiki
    Enrich {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[command(flatten)]
        form: FormArgs,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ShellCommands;

impl ShellCommands {
    fn path2str(path: &Option<PathBuf>) -> String {
        path.to_owned()
            .and_then(|p| p.into_os_string().into_string().ok())
            .unwrap_or("config.json".to_string())
    }

    fn path2config(path: &Option<PathBuf>) -> Result<Config> {
        Config::from_config_file(&Self::path2str(path))
    }

    async fn new_anime_item(config: &Config) -> Result<NewAnimeItem<WikiBase>> {
        let platform = WikiBase::new(config.wikibase()?).await?;
        NewAnimeItem::new(config, platform)
    }

    #[allow(clippy::print_stdout)]
    pub async fn run(&self) -> Result<()> {
        let cli = Cli::parse();
        match &cli.command {
            Some(Commands::Preview { config, form }) => {
                let config = Self::path2config(config)?;
                let page = Self::new_anime_item(&config).await?;
                print!("{}", page.preview(&form.to_form(&config)).await?);
            }
            Some(Commands::Create { config, form }) => {
                let config = Self::path2config(config)?;
                let mut page = Self::new_anime_item(&config).await?;
                let item_id = page.save(&form.to_form(&config)).await?;
                println!("{item_id}");
            }
            Some(Commands::Enrich { config, form }) => {
                let config = Self::path2config(config)?;
                let record = Enricher::new(&config)?
                    .enrich(&form.to_form(&config))
                    .await;
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            None => return Err(anyhow!("Command required: preview | create | enrich")),
        }
        Ok(())
    }
}
