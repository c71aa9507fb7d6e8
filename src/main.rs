mod app;
mod catalog;
mod config;
mod error;
mod image_cache;
mod pager;
mod player;
mod scraper;
mod search;
mod ui;

use ratatui_image::picker::Picker;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::image_cache::ImageCache;

fn setup_logging() -> Result<tracing_appender::non_blocking::WorkerGuard, Box<dyn std::error::Error>>
{
    let log_dir = config::data_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "kino.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kino=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = setup_logging()?;
    info!("Starting kino");

    let config = Config::load_or_default();

    let catalog_path = config.catalog_path()?;
    let catalog = Catalog::load(&catalog_path)?;
    info!(
        path = %catalog_path.display(),
        movies = catalog.len(),
        "Catalog loaded"
    );

    let image_cache = ImageCache::new(config.cache.directory.clone(), config.cache.enabled)?;

    let picker =
        Picker::from_query_stdio().unwrap_or_else(|_| Picker::from_fontsize((8, 16)));

    let mut terminal = app::init_terminal()?;
    let mut app = App::new(config, catalog, image_cache, picker);
    let result = app.run(&mut terminal).await;
    app::restore_terminal()?;

    if let Err(e) = &result {
        error!("Fatal: {}", e);
    }
    result.map_err(Into::into)
}
