//! Schema mapping from feed XML to the transient document shape the sync
//! cycle works with. RSS is tried first; a document whose root is not
//! `<rss>`/`<rdf:RDF>` gets a second chance as Atom.

use std::str::FromStr;

use atom_syndication::Feed as AtomFeed;
use rss::Channel;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeedDocument {
	pub title: String,
	pub link: String,
	pub description: String,
	pub language: String,
	pub items: Vec<RawFeedItem>,
}

/// One entry as it appeared in the document. Missing fields are empty strings
/// and `pub_date` is not validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeedItem {
	pub title: String,
	pub link: String,
	pub description: String,
	pub pub_date: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
	#[error("malformed RSS document: {0}")]
	Rss(#[from] rss::Error),
	#[error("malformed Atom document: {0}")]
	Atom(#[from] atom_syndication::Error),
}

pub fn parse(body: &[u8]) -> Result<RawFeedDocument, ParseError> {
	match Channel::read_from(body) {
		Ok(channel) => Ok(channel.into()),
		Err(rss::Error::InvalidStartTag) => Ok(AtomFeed::read_from(body)?.into()),
		Err(e) => Err(e.into()),
	}
}

impl FromStr for RawFeedDocument {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse(s.as_bytes())
	}
}

impl From<Channel> for RawFeedDocument {
	fn from(channel: Channel) -> Self {
		let items = channel
			.items()
			.iter()
			.map(|item| RawFeedItem {
				title: item.title().unwrap_or_default().to_string(),
				link: item.link().unwrap_or_default().to_string(),
				description: item.description().unwrap_or_default().to_string(),
				pub_date: item
					.pub_date()
					.or_else(|| {
						item.dublin_core_ext()
							.and_then(|dc| dc.dates().first())
							.map(String::as_str)
					})
					.unwrap_or_default()
					.to_string(),
			})
			.collect();

		RawFeedDocument {
			title: channel.title().to_string(),
			link: channel.link().to_string(),
			description: channel.description().to_string(),
			language: channel.language().unwrap_or_default().to_string(),
			items,
		}
	}
}

fn alternate_link(links: &[atom_syndication::Link]) -> String {
	links
		.iter()
		.find(|link| link.rel() == "alternate")
		.or_else(|| links.first())
		.map(|link| link.href().to_string())
		.unwrap_or_default()
}

impl From<AtomFeed> for RawFeedDocument {
	fn from(feed: AtomFeed) -> Self {
		let items = feed
			.entries()
			.iter()
			.map(|entry| {
				let description = entry
					.summary()
					.map(|text| text.value.clone())
					.or_else(|| {
						entry
							.content()
							.and_then(|content| content.value())
							.map(str::to_string)
					})
					.unwrap_or_default();
				// a missing <updated> comes back as the epoch
				let pub_date = entry
					.published()
					.or(Some(entry.updated()))
					.filter(|date| date.timestamp() != 0)
					.map(|date| date.to_rfc3339())
					.unwrap_or_default();
				RawFeedItem {
					title: entry.title().value.clone(),
					link: alternate_link(entry.links()),
					description,
					pub_date,
				}
			})
			.collect();

		RawFeedDocument {
			title: feed.title().value.clone(),
			link: alternate_link(feed.links()),
			description: feed
				.subtitle()
				.map(|text| text.value.clone())
				.unwrap_or_default(),
			language: feed.lang().unwrap_or_default().to_string(),
			items,
		}
	}
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use super::{parse, ParseError, RawFeedDocument, RawFeedItem};
	use crate::normalize::normalize;

	#[test]
	fn parses_rss_channel_and_items_in_order() {
		let doc = parse(include_str!("./test-data/rss.xml").as_bytes()).unwrap();

		assert_eq!(doc.title, "Lane's Blog");
		assert_eq!(doc.link, "https://wagslane.dev/");
		assert_eq!(doc.language, "en-us");
		assert_eq!(doc.items.len(), 2);
		assert_eq!(
			doc.items[0],
			RawFeedItem {
				title: "The Zen of Proverbs".to_string(),
				link: "https://wagslane.dev/posts/zen-of-proverbs/".to_string(),
				description: "20 rules of thumb for writing better software.".to_string(),
				pub_date: "Sun, 14 Aug 2022 00:00:00 +0000".to_string(),
			}
		);
		assert_eq!(doc.items[1].title, "College: A Solution in Search of a Problem");
	}

	#[test]
	fn missing_optional_fields_become_empty_strings() {
		let doc: RawFeedDocument = include_str!("./test-data/partial.xml").parse().unwrap();

		assert_eq!(doc.description, "");
		assert_eq!(doc.items.len(), 2);
		assert_eq!(doc.items[0].pub_date, "");
		assert_eq!(doc.items[0].description, "");
		assert_eq!(doc.items[1].link, "");
		assert_eq!(doc.items[1].pub_date, "not-a-date");
	}

	#[test]
	fn falls_back_to_atom() {
		let doc = parse(include_str!("./test-data/atom.xml").as_bytes()).unwrap();

		assert_eq!(doc.title, "Example Feed");
		assert_eq!(doc.link, "http://example.org/");
		assert_eq!(doc.items.len(), 1);
		assert_eq!(doc.items[0].title, "Atom-Powered Robots Run Amok");
		assert_eq!(doc.items[0].link, "http://example.org/2003/12/13/atom03");
		assert_eq!(doc.items[0].description, "Some text.");
		assert_eq!(doc.items[0].pub_date, "2003-12-13T18:30:02+00:00");
	}

	#[test]
	fn atom_entry_without_dates_has_no_pub_date() {
		let body = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Undated</title>
  <id>urn:uuid:2b1f3a1e-0e52-4c3c-9d7e-4d5f0f0a5e11</id>
  <entry>
    <title>No timestamps</title>
    <link href="http://example.org/undated"/>
    <id>urn:uuid:7d0c1a53-5b7a-4b8e-8f0e-1f6c2b9e4a22</id>
  </entry>
</feed>"#;
		let doc = parse(body.as_bytes()).unwrap();

		assert_eq!(doc.items.len(), 1);
		assert_eq!(doc.items[0].pub_date, "");
		let post = normalize(&doc.items[0], Uuid::new_v4()).unwrap();
		assert_eq!(post.url, "http://example.org/undated");
		assert_eq!(post.published_at, None);
	}

	#[test]
	fn parses_rss1_with_dublin_core_dates() {
		let doc = parse(include_str!("./test-data/rss1.xml").as_bytes()).unwrap();

		assert_eq!(doc.title, "Example RDF Feed");
		assert_eq!(doc.link, "http://example.org/");
		assert_eq!(doc.items.len(), 2);
		assert_eq!(doc.items[0].title, "First Item");
		assert_eq!(doc.items[0].link, "http://example.org/first");
		assert_eq!(doc.items[0].pub_date, "2003-12-13T18:30:02Z");
		assert_eq!(doc.items[1].link, "http://example.org/second");
		assert_eq!(doc.items[1].pub_date, "");
	}

	#[test]
	fn rejects_mismatched_tags() {
		let result = parse(include_str!("./test-data/malformed.xml").as_bytes());
		assert!(matches!(result, Err(ParseError::Rss(_))));
	}

	#[test]
	fn rejects_html() {
		let result = parse(b"<html><body><p>not a feed</p></body></html>");
		assert!(matches!(result, Err(ParseError::Atom(_))));
	}

	#[test]
	fn rejects_plain_text() {
		assert!(parse(b"this is not xml at all").is_err());
	}
}
