#![allow(dead_code)]

use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	},
	time::Duration,
};

use async_trait::async_trait;
use rssagg::{
	feed::{Feed, FeedId, NewPost, Post},
	fetch::{FetchError, FetchFeed},
	state::{MemoryStore, Store, StoreError},
	syndication::{self, RawFeedDocument},
};
use tokio::sync::Barrier;

pub const RSS: &str = include_str!("../../src/test-data/rss.xml");
pub const MALFORMED: &str = include_str!("../../src/test-data/malformed.xml");

#[derive(Clone)]
pub enum Script {
	Body(&'static str),
	Timeout,
	Panic,
}

/// Answers fetches from a url table. Optionally holds every fetch on a barrier
/// or a delay, and records how many fetches were in flight at once.
#[derive(Default)]
pub struct ScriptedFetcher {
	scripts: HashMap<String, Script>,
	barrier: Option<Arc<Barrier>>,
	delay: Option<Duration>,
	in_flight: AtomicUsize,
	pub max_in_flight: AtomicUsize,
	pub calls: AtomicUsize,
}

impl ScriptedFetcher {
	pub fn with(mut self, url: &str, script: Script) -> Self {
		self.scripts.insert(url.to_string(), script);
		self
	}

	pub fn with_barrier(mut self, parties: usize) -> Self {
		self.barrier = Some(Arc::new(Barrier::new(parties)));
		self
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);
		self
	}
}

#[async_trait]
impl FetchFeed for ScriptedFetcher {
	async fn fetch(&self, url: &str) -> Result<RawFeedDocument, FetchError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		self.max_in_flight.fetch_max(now, Ordering::SeqCst);

		if let Some(barrier) = &self.barrier {
			barrier.wait().await;
		}
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}
		self.in_flight.fetch_sub(1, Ordering::SeqCst);

		match self.scripts.get(url).cloned().unwrap_or(Script::Timeout) {
			Script::Body(body) => Ok(syndication::parse(body.as_bytes())?),
			Script::Timeout => Err(FetchError::Timeout {
				url: url.to_string(),
			}),
			Script::Panic => panic!("fetcher blew up on {url}"),
		}
	}
}

/// A store whose feed selection fails for the first `failures` calls.
pub struct UnreliableStore {
	pub inner: MemoryStore,
	failures: AtomicUsize,
	pub selections: AtomicUsize,
}

impl UnreliableStore {
	pub fn new(inner: MemoryStore, failures: usize) -> Self {
		Self {
			inner,
			failures: AtomicUsize::new(failures),
			selections: AtomicUsize::new(0),
		}
	}
}

#[async_trait]
impl Store for UnreliableStore {
	async fn feeds_due_for_fetch(&self, limit: usize) -> Result<Vec<Feed>, StoreError> {
		self.selections.fetch_add(1, Ordering::SeqCst);
		let remaining = self.failures.load(Ordering::SeqCst);
		if remaining > 0 {
			self.failures.store(remaining - 1, Ordering::SeqCst);
			return Err(StoreError::Unavailable("database is restarting".to_string()));
		}
		self.inner.feeds_due_for_fetch(limit).await
	}

	async fn mark_feed_fetched(&self, feed_id: FeedId) -> Result<Feed, StoreError> {
		self.inner.mark_feed_fetched(feed_id).await
	}

	async fn post_exists(&self, feed_id: FeedId, url: &str) -> Result<bool, StoreError> {
		self.inner.post_exists(feed_id, url).await
	}

	async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
		self.inner.insert_post(post).await
	}
}

/// Polls `check` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = bool>,
{
	for _ in 0..200 {
		if check().await {
			return true;
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
	false
}
