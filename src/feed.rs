use chrono::{DateTime, Utc};
use uuid::Uuid;

pub type FeedId = Uuid;
pub type UserId = Uuid;
pub type PostId = Uuid;

/// A subscribed source. `url` identifies the feed for scheduling purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
	pub id: FeedId,
	pub user_id: UserId,
	pub name: String,
	pub url: String,
	pub last_fetched_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Feed {
	#[must_use]
	pub fn new(user_id: UserId, name: impl Into<String>, url: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			id: Uuid::new_v4(),
			user_id,
			name: name.into(),
			url: url.into(),
			last_fetched_at: None,
			created_at: now,
			updated_at: now,
		}
	}
}

/// A normalized item ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
	pub feed_id: FeedId,
	pub title: String,
	pub url: String,
	pub description: String,
	pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
	pub id: PostId,
	pub feed_id: FeedId,
	pub title: String,
	pub url: String,
	pub description: String,
	pub published_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<NewPost> for Post {
	fn from(new: NewPost) -> Self {
		let now = Utc::now();
		Self {
			id: Uuid::new_v4(),
			feed_id: new.feed_id,
			title: new.title,
			url: new.url,
			description: new.description,
			published_at: new.published_at,
			created_at: now,
			updated_at: now,
		}
	}
}
