use std::{path::PathBuf, time::Duration};

use figment::{
	providers::{Env, Format, Serialized, Toml},
	Figment, Profile,
};
use serde::{Deserialize, Serialize};

/// A feed registered at startup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeedSeed {
	pub name: String,
	pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
	pub fetch_interval_secs: u64,
	pub batch_size: usize,
	pub fetch_timeout_secs: u64,
	pub http_cache: bool,
	pub log_filter: String,
	pub feeds: Vec<FeedSeed>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			fetch_interval_secs: 60,
			batch_size: 10,
			fetch_timeout_secs: 10,
			http_cache: false,
			log_filter: "info".to_string(),
			feeds: Vec::new(),
		}
	}
}

impl Config {
	/// Defaults, then `rssagg.toml` from the XDG config dirs, then each file in
	/// `paths` in order, then `RSSAGG_*` environment variables.
	#[must_use]
	pub fn figment(paths: &[PathBuf]) -> Figment {
		let mut figment = Figment::new().merge(Serialized::from(Config::default(), Profile::Default));
		if let Ok(xdg) = xdg::BaseDirectories::new() {
			if let Some(location) = xdg.find_config_file("rssagg.toml") {
				figment = figment.merge(Toml::file(location));
			}
		}
		for location in paths {
			figment = figment.merge(Toml::file(location));
		}
		figment.merge(Env::prefixed("RSSAGG_"))
	}

	pub fn load(paths: &[PathBuf]) -> Result<Self, figment::Error> {
		Self::figment(paths).extract()
	}

	#[must_use]
	pub fn fetch_interval(&self) -> Duration {
		Duration::from_secs(self.fetch_interval_secs.max(1))
	}

	#[must_use]
	pub fn fetch_timeout(&self) -> Duration {
		Duration::from_secs(self.fetch_timeout_secs.max(1))
	}
}
