//! Layered settings: defaults, TOML file, environment overrides

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Error type for loading and validating settings
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("Invalid value: {0}")]
	InvalidValue(String),

	#[error("Environment variable {key} has an invalid value: {reason}")]
	Env { key: String, reason: String },
}

/// How the total of a paged grouped query is counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupCountStrategy {
	/// Number of output groups, `SELECT COUNT(*)` over the grouped query
	#[default]
	Groups,
	/// Number of distinct matching root rows, ignoring the grouping
	DistinctRoot,
}

impl FromStr for GroupCountStrategy {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"groups" => Ok(GroupCountStrategy::Groups),
			"distinct_root" => Ok(GroupCountStrategy::DistinctRoot),
			other => Err(SettingsError::InvalidValue(format!(
				"unknown group count strategy '{}' (expected 'groups' or 'distinct_root')",
				other
			))),
		}
	}
}

/// Database settings
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
	pub url: String,
	pub pool_min_size: u32,
	pub pool_max_size: u32,
	/// Pool acquire timeout in seconds
	pub pool_timeout: u64,
	/// Idle connection timeout in seconds
	pub pool_idle_timeout: Option<u64>,
	/// Maximum connection lifetime in seconds
	pub pool_max_lifetime: Option<u64>,
	/// Log every statement at info level
	pub echo: bool,
}

impl Default for DatabaseSettings {
	fn default() -> Self {
		Self {
			url: "sqlite::memory:".to_string(),
			pool_min_size: 1,
			pool_max_size: 10,
			pool_timeout: 30,
			pool_idle_timeout: Some(600),
			pool_max_lifetime: Some(1800),
			echo: false,
		}
	}
}

/// Query building settings
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
	pub group_count: GroupCountStrategy,
	/// Separator passed to `concat_ws` by `select_count_group_by`
	pub concat_separator: String,
	/// Upper bound for requested page sizes; larger requests are clamped
	pub max_page_size: Option<u64>,
}

impl Default for QuerySettings {
	fn default() -> Self {
		Self {
			group_count: GroupCountStrategy::default(),
			concat_separator: "|".to_string(),
			max_page_size: Some(1000),
		}
	}
}

/// Top-level settings
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub database: DatabaseSettings,
	pub query: QuerySettings,
}

impl Settings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse settings from TOML text; missing keys take their defaults
	pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(contents)?)
	}

	/// Load settings from a TOML file
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let contents = std::fs::read_to_string(path.as_ref())?;
		Self::from_toml_str(&contents)
	}

	/// Override values from `<PREFIX>_*` environment variables
	///
	/// Recognised variables (with prefix `TUPLEQUERY`):
	/// `TUPLEQUERY_DATABASE_URL`, `TUPLEQUERY_DATABASE_ECHO`,
	/// `TUPLEQUERY_DATABASE_POOL_MAX_SIZE`, `TUPLEQUERY_QUERY_GROUP_COUNT`
	/// and `TUPLEQUERY_QUERY_MAX_PAGE_SIZE`.
	pub fn apply_env_overrides(mut self, prefix: &str) -> Result<Self, SettingsError> {
		let var = |name: &str| {
			let key = format!("{}_{}", prefix, name);
			std::env::var(&key).ok().map(|value| (key, value))
		};

		if let Some((_, url)) = var("DATABASE_URL") {
			self.database.url = url;
		}
		if let Some((key, echo)) = var("DATABASE_ECHO") {
			self.database.echo = parse_bool(&echo).ok_or_else(|| SettingsError::Env {
				key,
				reason: format!("'{}' is not a boolean", echo),
			})?;
		}
		if let Some((key, size)) = var("DATABASE_POOL_MAX_SIZE") {
			self.database.pool_max_size = size.trim().parse().map_err(
				|e: std::num::ParseIntError| SettingsError::Env {
					key,
					reason: e.to_string(),
				},
			)?;
		}
		if let Some((key, strategy)) = var("QUERY_GROUP_COUNT") {
			self.query.group_count = strategy.parse().map_err(|e: SettingsError| {
				SettingsError::Env {
					key,
					reason: e.to_string(),
				}
			})?;
		}
		if let Some((key, size)) = var("QUERY_MAX_PAGE_SIZE") {
			self.query.max_page_size = Some(size.trim().parse().map_err(
				|e: std::num::ParseIntError| SettingsError::Env {
					key,
					reason: e.to_string(),
				},
			)?);
		}

		Ok(self)
	}

	/// Validate settings
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.database.url.trim().is_empty() {
			return Err(SettingsError::InvalidValue(
				"database.url must not be empty".to_string(),
			));
		}

		if self.database.pool_max_size == 0 {
			return Err(SettingsError::InvalidValue(
				"database.pool_max_size must be at least 1".to_string(),
			));
		}

		if self.database.pool_min_size > self.database.pool_max_size {
			return Err(SettingsError::InvalidValue(format!(
				"database.pool_min_size ({}) exceeds database.pool_max_size ({})",
				self.database.pool_min_size, self.database.pool_max_size
			)));
		}

		if self.query.concat_separator.is_empty() {
			return Err(SettingsError::InvalidValue(
				"query.concat_separator must not be empty".to_string(),
			));
		}

		if self.query.max_page_size == Some(0) {
			return Err(SettingsError::InvalidValue(
				"query.max_page_size must be at least 1".to_string(),
			));
		}

		Ok(())
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Some(true),
		"false" | "0" | "no" | "off" => Some(false),
		_ => None,
	}
}
