// Headless feed session.
// Loads the first pages of the feed, keeps the local cache warm, and falls back to it when offline.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bordado::api::{ApiClient, Post, User};
use bordado::cache::{CacheDb, CacheService};
use bordado::config::Settings;
use bordado::state::FeedController;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bordado=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn print_posts(posts: &[Post], users: &[User]) {
    for post in posts {
        let author = users
            .iter()
            .find(|u| u.id == post.user_id)
            .map(|u| u.username.as_str())
            .unwrap_or("?");
        println!("#{} [{}] {} (@{})", post.id, post.user_id, post.title, author);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "failed to load settings");
            return ExitCode::FAILURE;
        }
    };

    let database_path = match settings.database_path() {
        Ok(path) => path,
        Err(e) => {
            error!(error = %e, "failed to resolve cache database path");
            return ExitCode::FAILURE;
        }
    };
    let cache = CacheService::new(CacheDb::new(
        database_path,
        settings.seed_database_path.clone(),
    ));
    if let Err(e) = cache.warm() {
        warn!(error = %e, "cache unavailable, continuing without it");
    }

    let client = match ApiClient::from_settings(&settings) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "failed to build API client");
            return ExitCode::FAILURE;
        }
    };

    let users = match client.get_users().await {
        Ok(users) => {
            cache.save_users(&users);
            users
        }
        Err(e) => {
            warn!(error = %e, "failed to load users, using cache");
            cache.load_users().into_inner()
        }
    };

    let feed = FeedController::new(client.clone(), settings.page_size).with_cache(cache.clone());
    feed.load_initial().await;
    feed.load_more_posts().await;

    let snapshot = feed.snapshot();
    if snapshot.posts.is_empty()
        && let Some(err) = &snapshot.error
    {
        warn!(error = %err, "feed unavailable, showing cached posts");
        let cached = cache.load_posts();
        if cached.is_degraded() {
            warn!("cached posts unavailable");
        }
        print_posts(cached.value(), &users);
        return ExitCode::FAILURE;
    }

    print_posts(&snapshot.posts, &users);
    info!(
        count = snapshot.posts.len(),
        page = snapshot.page,
        has_more = snapshot.has_more,
        "feed loaded"
    );

    cache.db().close();
    ExitCode::SUCCESS
}
