use std::{
	collections::{BTreeMap, BTreeSet},
	sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Store, StoreError};
use crate::feed::{Feed, FeedId, NewPost, Post, UserId};

#[derive(Default)]
struct Tables {
	feeds: BTreeMap<FeedId, Feed>,
	posts: Vec<Post>,
	post_keys: BTreeSet<(FeedId, String)>,
}

/// In-process store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
	tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn create_feed(
		&self,
		user_id: UserId,
		name: &str,
		url: &str,
	) -> Result<Feed, StoreError> {
		let mut tables = self.tables.write().await;
		if tables.feeds.values().any(|feed| feed.url == url) {
			return Err(StoreError::DuplicateFeed(url.to_string()));
		}
		let feed = Feed::new(user_id, name, url);
		tables.feeds.insert(feed.id, feed.clone());
		Ok(feed)
	}

	/// Inserts a feed as-is, keeping its id and timestamps.
	pub async fn insert_feed(&self, feed: Feed) -> Result<Feed, StoreError> {
		let mut tables = self.tables.write().await;
		if tables.feeds.values().any(|existing| existing.url == feed.url) {
			return Err(StoreError::DuplicateFeed(feed.url));
		}
		tables.feeds.insert(feed.id, feed.clone());
		Ok(feed)
	}

	pub async fn feed(&self, feed_id: FeedId) -> Option<Feed> {
		self.tables.read().await.feeds.get(&feed_id).cloned()
	}

	pub async fn feeds(&self) -> Vec<Feed> {
		self.tables.read().await.feeds.values().cloned().collect()
	}

	/// Every stored post in insertion order.
	pub async fn posts(&self) -> Vec<Post> {
		self.tables.read().await.posts.clone()
	}

	/// Newest first by `published_at`; posts without a date sort last.
	pub async fn posts_for_feeds(&self, feed_ids: &[FeedId], limit: usize) -> Vec<Post> {
		let tables = self.tables.read().await;
		let mut posts: Vec<Post> = tables
			.posts
			.iter()
			.filter(|post| feed_ids.contains(&post.feed_id))
			.cloned()
			.collect();
		posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
		posts.truncate(limit);
		posts
	}
}

#[async_trait]
impl Store for MemoryStore {
	async fn feeds_due_for_fetch(&self, limit: usize) -> Result<Vec<Feed>, StoreError> {
		let tables = self.tables.read().await;
		let mut feeds: Vec<Feed> = tables.feeds.values().cloned().collect();
		// None < Some, so never-fetched feeds lead
		feeds.sort_by(|a, b| {
			a.last_fetched_at
				.cmp(&b.last_fetched_at)
				.then_with(|| a.created_at.cmp(&b.created_at))
		});
		feeds.truncate(limit);
		Ok(feeds)
	}

	async fn mark_feed_fetched(&self, feed_id: FeedId) -> Result<Feed, StoreError> {
		let mut tables = self.tables.write().await;
		let feed = tables
			.feeds
			.get_mut(&feed_id)
			.ok_or(StoreError::FeedNotFound(feed_id))?;
		let now = Utc::now();
		let fetched_at = feed.last_fetched_at.map_or(now, |previous| previous.max(now));
		feed.last_fetched_at = Some(fetched_at);
		feed.updated_at = now;
		Ok(feed.clone())
	}

	async fn post_exists(&self, feed_id: FeedId, url: &str) -> Result<bool, StoreError> {
		Ok(self
			.tables
			.read()
			.await
			.post_keys
			.contains(&(feed_id, url.to_string())))
	}

	async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
		let mut tables = self.tables.write().await;
		if !tables.feeds.contains_key(&post.feed_id) {
			return Err(StoreError::FeedNotFound(post.feed_id));
		}
		let key = (post.feed_id, post.url.clone());
		if tables.post_keys.contains(&key) {
			return Err(StoreError::DuplicatePost {
				feed_id: post.feed_id,
				url: post.url,
			});
		}
		let post = Post::from(post);
		tables.post_keys.insert(key);
		tables.posts.push(post.clone());
		Ok(post)
	}
}
