use async_trait::async_trait;

use crate::feed::{Feed, FeedId, NewPost, Post};

pub use self::memory::MemoryStore;

mod memory;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
	#[error("feed {0} does not exist")]
	FeedNotFound(FeedId),
	#[error("a feed with url {0} already exists")]
	DuplicateFeed(String),
	#[error("feed {feed_id} already has a post for {url}")]
	DuplicatePost { feed_id: FeedId, url: String },
	#[error("store unavailable: {0}")]
	Unavailable(String),
}

/// Persistence shared between request handling and the background sync.
/// Implementations serialize their own writes.
#[async_trait]
pub trait Store: Send + Sync {
	/// Up to `limit` feeds, least recently fetched first; never-fetched feeds
	/// come before everything else.
	async fn feeds_due_for_fetch(&self, limit: usize) -> Result<Vec<Feed>, StoreError>;

	/// Sets `last_fetched_at` to now. The timestamp never moves backwards.
	async fn mark_feed_fetched(&self, feed_id: FeedId) -> Result<Feed, StoreError>;

	async fn post_exists(&self, feed_id: FeedId, url: &str) -> Result<bool, StoreError>;

	/// Fails with [`StoreError::DuplicatePost`] when `(feed_id, url)` is taken.
	async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError>;
}
