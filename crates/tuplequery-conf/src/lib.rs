//! # tuplequery conf
//!
//! Settings for the tuplequery repository and its connection pool.
//!
//! Settings are layered: defaults, then a TOML file, then environment
//! variables, then validation.
//!
//! ## Example
//!
//! ```
//! use tuplequery_conf::{GroupCountStrategy, Settings};
//!
//! let settings = Settings::from_toml_str(r#"
//! [database]
//! url = "sqlite::memory:"
//! pool_max_size = 1
//!
//! [query]
//! group_count = "distinct_root"
//! "#).unwrap();
//!
//! assert_eq!(settings.database.pool_max_size, 1);
//! assert_eq!(settings.query.group_count, GroupCountStrategy::DistinctRoot);
//! assert_eq!(settings.query.concat_separator, "|");
//! settings.validate().unwrap();
//! ```

pub mod settings;

pub use settings::{
	DatabaseSettings, GroupCountStrategy, QuerySettings, Settings, SettingsError,
};
