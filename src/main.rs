use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use rssagg::{config::Config, fetch::Fetcher, state::MemoryStore, sync::Scheduler};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(clap::Parser)]
struct Args {
	/// The path to a configuration file. You can specify as many of these as you need to.
	#[arg(short, long)]
	config_path: Vec<PathBuf>,
	/// Fetch a single batch, print what was collected and exit.
	#[arg(long)]
	once: bool,
}

#[tokio::main]
async fn main() {
	// Parse arguments
	let args = Args::parse();
	// Load config
	let config = Config::load(&args.config_path).expect("Invalid config");
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let store = Arc::new(MemoryStore::new());
	let owner = Uuid::new_v4();
	for seed in &config.feeds {
		match store.create_feed(owner, &seed.name, &seed.url).await {
			Ok(feed) => tracing::info!(feed_id = %feed.id, feed = %feed.name, "registered feed"),
			Err(e) => tracing::warn!(feed = %seed.name, "skipping feed: {e}"),
		}
	}

	let fetcher = if config.http_cache {
		Fetcher::with_cache(config.fetch_timeout())
	} else {
		Fetcher::new(config.fetch_timeout())
	};
	let scheduler = Scheduler::new(
		store.clone(),
		Arc::new(fetcher),
		config.fetch_interval(),
		config.batch_size,
	);

	if args.once {
		scheduler.tick().await;
		let feed_ids: Vec<_> = store.feeds().await.iter().map(|feed| feed.id).collect();
		for post in store.posts_for_feeds(&feed_ids, usize::MAX).await {
			println!("{}\t{}", post.url, post.title);
		}
		return;
	}

	let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
	let task = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!("couldn't listen for shutdown signal: {e}");
	}
	if let Err(e) = shutdown_tx.send(()) {
		tracing::debug!("scheduler already stopped: {e}");
	}
	if let Err(e) = task.await {
		tracing::error!("scheduler task failed: {e}");
	}
	tracing::info!(posts = store.posts().await.len(), "stopped");
}
