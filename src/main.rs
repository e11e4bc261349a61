use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use tracing::{debug, info, warn};

use memoreye::application::{
    DurableThumbnailCache, LoadDirectoryUseCase, LoadReport, TieredImageCache,
};
use memoreye::domain::services::select_image_entries;
use memoreye::infrastructure::config::{CacheAction, Command};
use memoreye::infrastructure::{
    AppConfig, CliArgs, DirectoryScanner, FileImageSource, FileUrlResolver, SessionImageCache,
    SqliteThumbnailStore, StorageManager, ThumbnailGenerator,
};
use memoreye::infrastructure::logging::{init_logging, with_bootstrap_logging};

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let manager = StorageManager::new()?;
    let mut config = manager.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn open_durable(config: &AppConfig) -> Option<DurableThumbnailCache> {
    if !config.cache.persistent {
        info!("Durable cache disabled, thumbnails are kept for this run only");
        return None;
    }
    let Some(path) = config.effective_database_path() else {
        warn!("No data directory available, running session-only");
        return None;
    };

    match SqliteThumbnailStore::open(&path) {
        Ok(store) => {
            info!(path = %path.display(), "Opened durable cache");
            Some(DurableThumbnailCache::new(
                Arc::new(store),
                config.cache.to_durable_config(),
            ))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Durable cache unavailable, running session-only");
            None
        }
    }
}

async fn run_load(
    config: &AppConfig,
    session: &SessionImageCache,
    cache: Arc<TieredImageCache>,
    dir: &Path,
    max_depth: Option<usize>,
) -> Result<()> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let scanner = max_depth.map_or_else(DirectoryScanner::new, |depth| {
        DirectoryScanner::new().max_depth(depth)
    });
    let entries = select_image_entries(scanner.scan(dir));
    info!(dir = %dir.display(), images = entries.len(), "Loading directory");

    let generator = Arc::new(ThumbnailGenerator::new(
        Arc::new(FileImageSource::new()),
        config.thumbnails.format.resolve(),
    ));
    let use_case = LoadDirectoryUseCase::new(Arc::new(FileUrlResolver::new()), cache, generator)
        .with_pacing(config.loader.pacing());

    let mut progress = use_case.subscribe();
    let watcher = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let current = *progress.borrow_and_update();
            debug!(progress = %current, "Load progress");
        }
    });

    let report = use_case.execute(&entries).await;
    drop(use_case);
    if let Err(e) = watcher.await {
        warn!(error = %e, "Progress watcher stopped abnormally");
    }

    debug!(stats = %session.stats(), "Session cache");
    print_report(&report);
    Ok(())
}

fn print_report(report: &LoadReport) {
    println!(
        "{} images: {} from session, {} from durable cache, {} generated, {} failed",
        report.total,
        report.from_session,
        report.from_durable,
        report.generated,
        report.failed.len()
    );
    for url in &report.failed {
        println!("  failed: {url}");
    }
}

async fn run_cache(cache: &TieredImageCache, action: CacheAction) -> Result<()> {
    let Some(durable) = cache.durable() else {
        println!("Durable cache is disabled");
        return Ok(());
    };

    match action {
        CacheAction::Stats => {
            let (Some(entries), Some(size)) = (cache.durable_len().await, cache.durable_size().await)
            else {
                bail!("durable cache could not be read");
            };
            let limit = durable.config().max_bytes;
            println!("{entries} entries, {size} of {limit} estimated bytes");
        }
        CacheAction::Clear => {
            if !cache.clear_all().await {
                bail!("durable cache could not be cleared");
            }
            println!("Durable cache cleared");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = with_bootstrap_logging(args.log_level.unwrap_or_default(), || {
        load_config(&args)
    })?;
    init_logging(config.log_level, config.log_path.as_deref())?;

    info!(version = memoreye::VERSION, "Starting {}", memoreye::NAME);

    let session = Arc::new(SessionImageCache::new());
    let cache = Arc::new(TieredImageCache::new(session.clone(), open_durable(&config)));

    match args.command {
        Command::Load { dir, max_depth } => {
            run_load(&config, &session, cache, &dir, max_depth).await
        }
        Command::Cache { action } => run_cache(&cache, action).await,
    }
}
