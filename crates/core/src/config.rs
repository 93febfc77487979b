//! Client configuration.
//!
//! Precedence, highest to lowest: explicitly passed config, environment
//! variables (`CLOUDBOX_REGION_ID`, `CLOUDBOX_ENDPOINT`,
//! `CLOUDBOX_TIMEOUT_MS`), built-in defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

pub const DEFAULT_REGION_ID: &str = "us-west-1";
pub const DEFAULT_ENDPOINT: &str = "api.cloudbox.dev";
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Service endpoint and request settings for a [`crate::Cloudbox`] client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
	pub region_id: String,
	pub endpoint: String,
	pub timeout_ms: u64,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			region_id: DEFAULT_REGION_ID.to_string(),
			endpoint: DEFAULT_ENDPOINT.to_string(),
			timeout_ms: DEFAULT_TIMEOUT_MS,
		}
	}
}

impl Config {
	/// Resolves the effective config from an optional explicit value.
	pub fn load(explicit: Option<Config>) -> Config {
		if let Some(config) = explicit {
			return config;
		}

		let mut config = Config::default();
		if let Some(region) = non_empty_env("CLOUDBOX_REGION_ID") {
			config.region_id = region;
		}
		if let Some(endpoint) = non_empty_env("CLOUDBOX_ENDPOINT") {
			config.endpoint = endpoint;
		}
		if let Some(timeout) = non_empty_env("CLOUDBOX_TIMEOUT_MS") {
			match timeout.parse() {
				Ok(ms) => config.timeout_ms = ms,
				Err(_) => {
					warn!(target = "cloudbox.config", value = %timeout, "ignoring unparseable CLOUDBOX_TIMEOUT_MS")
				}
			}
		}
		config
	}

	/// Endpoint as a full base URL, defaulting the scheme to https.
	pub fn base_url(&self) -> String {
		if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
			self.endpoint.trim_end_matches('/').to_string()
		} else {
			format!("https://{}", self.endpoint.trim_end_matches('/'))
		}
	}
}

fn non_empty_env(key: &str) -> Option<String> {
	std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Resolves the API key from the explicit argument or `CLOUDBOX_API_KEY`.
pub(crate) fn resolve_api_key(explicit: &str) -> Result<String> {
	if !explicit.is_empty() {
		return Ok(explicit.to_string());
	}
	non_empty_env("CLOUDBOX_API_KEY")
		.ok_or_else(|| Error::Init("no API key provided and CLOUDBOX_API_KEY is not set".into()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn explicit_config_wins() {
		let explicit = Config {
			region_id: "eu-central-1".into(),
			endpoint: "sandbox.example.com".into(),
			timeout_ms: 5_000,
		};
		let loaded = Config::load(Some(explicit.clone()));
		assert_eq!(loaded, explicit);
	}

	#[test]
	fn base_url_defaults_to_https() {
		let config = Config::default();
		assert_eq!(config.base_url(), "https://api.cloudbox.dev");
	}

	#[test]
	fn base_url_keeps_explicit_scheme() {
		let config = Config {
			endpoint: "http://localhost:8080/".into(),
			..Default::default()
		};
		assert_eq!(config.base_url(), "http://localhost:8080");
	}

	#[test]
	fn explicit_api_key_wins() {
		assert_eq!(resolve_api_key("key-1").unwrap(), "key-1");
	}

	// Process env is shared across test threads, so every env-driven case
	// runs inside this single test.
	#[test]
	fn environment_overrides_defaults() {
		unsafe {
			std::env::set_var("CLOUDBOX_REGION_ID", "eu-west-9");
			std::env::set_var("CLOUDBOX_ENDPOINT", "env.example.com");
			std::env::set_var("CLOUDBOX_TIMEOUT_MS", "1500");
			std::env::set_var("CLOUDBOX_API_KEY", "key-env");
		}
		let loaded = Config::load(None);
		assert_eq!(loaded.region_id, "eu-west-9");
		assert_eq!(loaded.endpoint, "env.example.com");
		assert_eq!(loaded.timeout_ms, 1500);
		assert_eq!(resolve_api_key("").unwrap(), "key-env");

		// Explicit config still beats a fully populated environment.
		let explicit = Config {
			region_id: "ap-south-2".into(),
			endpoint: "explicit.example.com".into(),
			timeout_ms: 9_000,
		};
		assert_eq!(Config::load(Some(explicit.clone())), explicit);

		// An unparseable timeout is ignored, keeping the default.
		unsafe {
			std::env::set_var("CLOUDBOX_TIMEOUT_MS", "soon");
		}
		assert_eq!(Config::load(None).timeout_ms, DEFAULT_TIMEOUT_MS);

		// Empty values count as unset.
		unsafe {
			std::env::set_var("CLOUDBOX_REGION_ID", "");
		}
		assert_eq!(Config::load(None).region_id, DEFAULT_REGION_ID);

		unsafe {
			std::env::remove_var("CLOUDBOX_REGION_ID");
			std::env::remove_var("CLOUDBOX_ENDPOINT");
			std::env::remove_var("CLOUDBOX_TIMEOUT_MS");
			std::env::remove_var("CLOUDBOX_API_KEY");
		}
		assert_eq!(Config::load(None), Config::default());
	}
}
