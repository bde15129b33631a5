use std::sync::Arc;

use crate::{
	feed::{Feed, NewPost},
	fetch::{FetchError, FetchFeed},
	normalize::normalize,
	state::{Store, StoreError},
};

use super::FeedOutcome;

enum ItemResult {
	Inserted,
	Skipped,
	Failed,
}

/// Runs the mark, fetch, normalize and store cycle for single feeds.
pub struct FeedWorker<S: ?Sized, F: ?Sized> {
	store: Arc<S>,
	fetcher: Arc<F>,
}

impl<S: ?Sized, F: ?Sized> Clone for FeedWorker<S, F> {
	fn clone(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
			fetcher: Arc::clone(&self.fetcher),
		}
	}
}

impl<S, F> FeedWorker<S, F>
where
	S: Store + ?Sized,
	F: FetchFeed + ?Sized,
{
	pub fn new(store: Arc<S>, fetcher: Arc<F>) -> Self {
		Self { store, fetcher }
	}

	/// Processes one feed. Failures stay inside the returned outcome; the feed is
	/// marked fetched before anything that can fail on the network.
	pub async fn process(&self, feed: &Feed) -> FeedOutcome {
		if let Err(e) = self.store.mark_feed_fetched(feed.id).await {
			tracing::error!(feed_id = %feed.id, feed = %feed.name, "couldn't mark feed fetched: {e}");
			return FeedOutcome::MarkFailed(e.to_string());
		}

		let document = match self.fetcher.fetch(&feed.url).await {
			Ok(document) => document,
			Err(FetchError::Parse(e)) => {
				tracing::error!(feed_id = %feed.id, feed = %feed.name, url = %feed.url, "couldn't parse feed: {e}");
				return FeedOutcome::ParseFailed(e.to_string());
			}
			Err(e) => {
				tracing::error!(feed_id = %feed.id, feed = %feed.name, url = %feed.url, "couldn't fetch feed: {e}");
				return FeedOutcome::FetchFailed(e.to_string());
			}
		};

		let (mut inserted, mut skipped, mut failed) = (0, 0, 0);
		for item in &document.items {
			let Some(post) = normalize(item, feed.id) else {
				tracing::debug!(feed_id = %feed.id, title = %item.title, "item has no link, skipping");
				skipped += 1;
				continue;
			};
			match self.store_post(feed, post).await {
				ItemResult::Inserted => inserted += 1,
				ItemResult::Skipped => skipped += 1,
				ItemResult::Failed => failed += 1,
			}
		}

		tracing::info!(
			feed_id = %feed.id,
			feed = %feed.name,
			found = document.items.len(),
			inserted,
			skipped,
			failed,
			"feed collected"
		);
		FeedOutcome::Synced {
			inserted,
			skipped,
			failed,
		}
	}

	async fn store_post(&self, feed: &Feed, post: NewPost) -> ItemResult {
		match self.store.post_exists(feed.id, &post.url).await {
			Ok(true) => return ItemResult::Skipped,
			Ok(false) => {}
			Err(e) => {
				tracing::error!(feed_id = %feed.id, url = %post.url, "couldn't check for existing post: {e}");
				return ItemResult::Failed;
			}
		}

		let url = post.url.clone();
		match self.store.insert_post(post).await {
			Ok(_) => ItemResult::Inserted,
			Err(StoreError::DuplicatePost { .. }) => {
				tracing::debug!(feed_id = %feed.id, %url, "post stored concurrently, skipping");
				ItemResult::Skipped
			}
			Err(e) => {
				tracing::error!(feed_id = %feed.id, %url, "couldn't store post: {e}");
				ItemResult::Failed
			}
		}
	}
}
