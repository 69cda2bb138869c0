use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use news_feed::config::get_configuration;
use news_feed::models::NewsArticle;
use news_feed::services::{FilePreferenceStore, NewsClient, SavedArticleStore};
use news_feed::NewsFeed;
use service_core::capabilities::SessionIdentity;
use service_core::observability::init_tracing;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "news-feed")]
#[command(about = "Personalized news from the smartdocs backend")]
#[command(version)]
struct Cli {
    /// Signed-in user id; omit to browse signed out
    #[arg(long, global = true, env = "NEWS_FEED_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List articles, ranked for the user when signed in
    List {
        #[arg(long, default_value = "all")]
        category: String,
    },
    /// Show the most common categories
    Trending,
    /// Save an article, or unsave it if already saved
    Save { id: String },
    /// Show saved articles
    Saved {
        /// Remove this article from the saved list
        #[arg(long)]
        remove: Option<String>,
    },
    /// Print the URL of an article and count it as read
    Open { id: String },
}

fn print_article(article: &NewsArticle, saved: bool) {
    let marker = if saved { "*" } else { " " };
    println!(
        "{} [{}] {} ({} min read) {}",
        marker,
        article.id,
        article.title,
        article.read_time_minutes(),
        article.category.join(", ")
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = get_configuration().context("Failed to load configuration")?;

    init_tracing(
        "news-feed",
        &settings.logging.level,
        settings.logging.otlp_endpoint.as_deref(),
    )?;

    let identity = match cli.user {
        Some(user_id) => SessionIdentity::signed_in(user_id),
        None => SessionIdentity::signed_out(),
    };
    let source = Arc::new(NewsClient::new(&settings.backend)?);
    let preferences = Arc::new(FilePreferenceStore::new(&settings.storage.data_dir));
    let saved_store = SavedArticleStore::new(&settings.storage.data_dir);
    let mut feed = NewsFeed::new(
        source,
        preferences,
        saved_store,
        &identity,
        settings.feed.clone(),
    );

    match cli.command {
        Commands::List { category } => {
            feed.load().await?;
            feed.select_category(&category);
            let articles = feed.filtered();
            if articles.is_empty() {
                println!("No news available for this category.");
            }
            for article in articles {
                print_article(article, feed.is_saved(&article.id));
            }
        }
        Commands::Trending => {
            feed.load().await?;
            if feed.trending().is_empty() {
                println!("No trending topics yet.");
            }
            for entry in feed.trending() {
                println!("{} {}+", entry.name, entry.count);
            }
        }
        Commands::Save { id } => {
            feed.load().await?;
            let outcome = feed.toggle_save(&id).await?;
            println!("{}", outcome.message());
        }
        Commands::Saved { remove } => {
            if let Some(id) = remove {
                if !feed.remove_saved(&id).await? {
                    println!("{} was not saved", id);
                }
            }
            let saved = feed.saved().await?;
            if saved.is_empty() {
                println!("No saved articles yet");
            }
            for article in saved {
                print_article(article, true);
            }
        }
        Commands::Open { id } => {
            feed.load().await?;
            println!("{}", feed.read_more(&id).await?);
        }
    }

    Ok(())
}
