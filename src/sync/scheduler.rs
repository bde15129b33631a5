use std::{sync::Arc, time::Duration};

use tokio::{sync::broadcast, task::JoinSet, time::MissedTickBehavior};

use crate::{fetch::FetchFeed, state::Store};

use super::{BatchReport, FeedOutcome, FeedWorker};

/// Periodic driver. Each tick selects up to `batch_size` stale feeds, runs one
/// worker task per feed and waits for all of them before the next tick, so at
/// most one batch is ever in flight.
pub struct Scheduler<S: ?Sized, F: ?Sized> {
	store: Arc<S>,
	worker: FeedWorker<S, F>,
	interval: Duration,
	batch_size: usize,
}

impl<S, F> Scheduler<S, F>
where
	S: Store + ?Sized + 'static,
	F: FetchFeed + ?Sized + 'static,
{
	pub fn new(store: Arc<S>, fetcher: Arc<F>, interval: Duration, batch_size: usize) -> Self {
		Self {
			worker: FeedWorker::new(Arc::clone(&store), fetcher),
			store,
			interval,
			batch_size: batch_size.max(1),
		}
	}

	#[must_use]
	pub fn batch_size(&self) -> usize {
		self.batch_size
	}

	/// Ticks until `shutdown` fires or its sender goes away. The first tick runs
	/// immediately. A batch still running at shutdown is abandoned; its feeds
	/// were already marked fetched.
	pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
		tracing::info!(
			interval = ?self.interval,
			batch_size = self.batch_size,
			"collecting feeds"
		);
		let mut ticker = tokio::time::interval(self.interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			tokio::select! {
				_ = shutdown.recv() => {
					tracing::info!("scheduler received shutdown signal");
					break;
				}
				_ = ticker.tick() => {}
			}

			tokio::select! {
				_ = shutdown.recv() => {
					tracing::info!("scheduler received shutdown signal, abandoning running batch");
					break;
				}
				_ = self.tick() => {}
			}
		}
	}

	/// Runs a single batch to completion.
	pub async fn tick(&self) -> BatchReport {
		let feeds = match self.store.feeds_due_for_fetch(self.batch_size).await {
			Ok(feeds) => feeds,
			Err(e) => {
				tracing::error!("couldn't get next feeds to fetch: {e}");
				return BatchReport::default();
			}
		};
		if feeds.is_empty() {
			tracing::debug!("no feeds to fetch");
			return BatchReport::default();
		}
		tracing::info!(count = feeds.len(), "found feeds to fetch");

		// dropping the set aborts whatever is still running
		let mut workers = JoinSet::new();
		for feed in feeds.iter().cloned() {
			let worker = self.worker.clone();
			workers.spawn(async move {
				let outcome = worker.process(&feed).await;
				(feed.id, outcome)
			});
		}

		let mut report = BatchReport::default();
		while let Some(joined) = workers.join_next().await {
			match joined {
				Ok(result) => report.outcomes.push(result),
				Err(e) => tracing::error!("feed worker task failed: {e}"),
			}
		}
		for feed in &feeds {
			if report.outcome(feed.id).is_none() {
				report.outcomes.push((
					feed.id,
					FeedOutcome::Aborted(format!("worker for {} did not finish", feed.url)),
				));
			}
		}

		tracing::info!(
			feeds = feeds.len(),
			inserted = report.inserted(),
			failed = report.failed(),
			"batch finished"
		);
		report
	}
}
