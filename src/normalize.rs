use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::{
	feed::{FeedId, NewPost},
	syndication::RawFeedItem,
};

/// Layouts seen in the wild that RFC 2822 / RFC 3339 parsing does not cover.
const OFFSET_LAYOUTS: &[&str] = &[
	"%a, %d %b %Y %H:%M:%S %z",
	"%a, %d %b %Y %H:%M %z",
	"%d %b %Y %H:%M:%S %z",
	"%d %b %Y %H:%M %z",
	"%a, %e %b %Y %H:%M:%S %z",
	"%Y-%m-%dT%H:%M:%S%z",
	"%Y-%m-%d %H:%M:%S %z",
];

const NAIVE_LAYOUTS: &[&str] = &[
	"%Y-%m-%dT%H:%M:%S",
	"%Y-%m-%d %H:%M:%S",
	"%a, %d %b %Y %H:%M:%S",
	"%a, %d %b %Y %H:%M",
];

/// Turns a raw item into a post candidate. Items without a link have no
/// identity and are dropped; everything else is kept, even with an
/// unparseable date.
#[must_use]
pub fn normalize(item: &RawFeedItem, feed_id: FeedId) -> Option<NewPost> {
	let url = item.link.trim();
	if url.is_empty() {
		return None;
	}
	Some(NewPost {
		feed_id,
		title: item.title.trim().to_string(),
		url: url.to_string(),
		description: item.description.trim().to_string(),
		published_at: parse_pub_date(&item.pub_date),
	})
}

#[must_use]
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
	let raw = raw.trim();
	if raw.is_empty() {
		return None;
	}
	if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
		return Some(date.with_timezone(&Utc));
	}
	if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
		return Some(date.with_timezone(&Utc));
	}

	// %z does not know zone names
	let raw = match raw.strip_suffix(" UTC").or_else(|| raw.strip_suffix(" GMT")) {
		Some(stripped) => format!("{stripped} +0000"),
		None => raw.to_string(),
	};
	OFFSET_LAYOUTS
		.iter()
		.find_map(|layout| DateTime::parse_from_str(&raw, layout).ok())
		.map(|date| date.with_timezone(&Utc))
		.or_else(|| {
			NAIVE_LAYOUTS
				.iter()
				.find_map(|layout| NaiveDateTime::parse_from_str(&raw, layout).ok())
				.map(|naive| Utc.from_utc_datetime(&naive))
		})
}
