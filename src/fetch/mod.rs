use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use http_cache_reqwest::{CACacheManager, Cache, HttpCache, HttpCacheOptions};
use reqwest::{Client, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};

use crate::syndication::{self, ParseError, RawFeedDocument};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
	#[error("request to {url} timed out")]
	Timeout { url: String },
	#[error("request failed: {0}")]
	Request(#[from] reqwest_middleware::Error),
	#[error("unexpected status {status} from {url}")]
	Status { url: String, status: StatusCode },
	#[error("failed to read body: {0}")]
	Body(#[source] reqwest::Error),
	#[error(transparent)]
	Parse(#[from] ParseError),
}

impl FetchError {
	fn from_request(url: &str, err: reqwest_middleware::Error) -> Self {
		match &err {
			reqwest_middleware::Error::Reqwest(inner) if inner.is_timeout() => Self::Timeout {
				url: url.to_string(),
			},
			_ => Self::Request(err),
		}
	}
}

/// Retrieves and parses one feed document.
#[async_trait]
pub trait FetchFeed: Send + Sync {
	async fn fetch(&self, url: &str) -> Result<RawFeedDocument, FetchError>;
}

/// Single-attempt HTTP fetcher. Redirects follow reqwest's defaults; there is
/// no retry, a failed feed is picked up again on a later tick.
#[derive(Clone)]
pub struct Fetcher {
	client: Arc<ClientWithMiddleware>,
	timeout: Duration,
}

impl Fetcher {
	#[must_use]
	pub fn new(timeout: Duration) -> Self {
		let client = ClientBuilder::new(Client::new()).build();
		Self {
			client: Arc::new(client),
			timeout,
		}
	}

	/// Same as [`Fetcher::new`], but responses go through an on-disk HTTP cache
	/// that honours the server's cache headers.
	#[must_use]
	pub fn with_cache(timeout: Duration) -> Self {
		let client = ClientBuilder::new(Client::new())
			.with(Cache(HttpCache {
				mode: http_cache_reqwest::CacheMode::Default,
				manager: CACacheManager::default(),
				options: HttpCacheOptions::default(),
			}))
			.build();
		Self {
			client: Arc::new(client),
			timeout,
		}
	}

	pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
		let response = self
			.client
			.get(url)
			.timeout(self.timeout)
			.send()
			.await
			.map_err(|e| FetchError::from_request(url, e))?;

		let status = response.status();
		if !status.is_success() {
			return Err(FetchError::Status {
				url: url.to_string(),
				status,
			});
		}

		let body = response.bytes().await.map_err(|e| {
			if e.is_timeout() {
				FetchError::Timeout {
					url: url.to_string(),
				}
			} else {
				FetchError::Body(e)
			}
		})?;
		Ok(body.to_vec())
	}
}

#[async_trait]
impl FetchFeed for Fetcher {
	async fn fetch(&self, url: &str) -> Result<RawFeedDocument, FetchError> {
		let body = self.fetch_bytes(url).await?;
		tracing::debug!(url, bytes = body.len(), "fetched feed body");
		Ok(syndication::parse(&body)?)
	}
}

impl Default for Fetcher {
	fn default() -> Self {
		Self::new(DEFAULT_TIMEOUT)
	}
}
