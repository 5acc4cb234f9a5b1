//! # tuplequery
//!
//! Dynamic, column-selectable, filterable, groupable and pageable queries
//! over relational entities, returning loosely-typed row tuples instead of
//! full entities.
//!
//! Callers describe a request as "columns + predicate + aggregate + page";
//! [`TupleRepository`] builds the statement with `sea-query`, executes it
//! through `sqlx` and, for paged requests, computes the total with a
//! separate count query.
//!
//! ## Feature Flags
//!
//! - `db` - Query building and execution (`tuplequery-db`)
//! - `conf` - Settings from TOML files and environment variables
//! - `db-sqlite` - SQLite support
//! - `db-postgres` - PostgreSQL support
//! - `db-mysql` - MySQL support
//! - `full` (default) - All of the above
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use tuplequery::prelude::*;
//!
//! struct Order;
//! impl Entity for Order {
//! 	fn schema() -> EntitySchema {
//! 		EntitySchema::builder("orders")
//! 			.field("id")
//! 			.field_as("customerId", "customer_id")
//! 			.field("status")
//! 			.field("amount")
//! 			.primary_key(["id"])
//! 			.build()
//! 	}
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let settings = Settings::from_file("tuplequery.toml")
//! 	.and_then(|s| s.apply_env_overrides("TUPLEQUERY"))
//! 	.unwrap();
//! let repository = TupleRepository::connect(&settings).await.unwrap();
//!
//! // [{customerId: 1, sum: 150}, {customerId: 2, sum: 30}]
//! let sums = repository
//! 	.select_sum_group_by::<Order, _>(&["customerId"], "amount", &Spec::<Order>::eq("status", "PAID"))
//! 	.await
//! 	.unwrap();
//! # });
//! ```

pub use tuplequery_core as core;

#[cfg(feature = "conf")]
pub use tuplequery_conf as conf;

#[cfg(feature = "db")]
pub use tuplequery_db as db;

pub use tuplequery_core::{
	Direction, Error, NullHandling, Page, PageRequest, Pageable, QueryValue, Sort, SortOrder, Tuple,
};

#[cfg(feature = "conf")]
pub use tuplequery_conf::{
	DatabaseSettings, GroupCountStrategy, QuerySettings, Settings, SettingsError,
};

#[cfg(feature = "db")]
pub use tuplequery_db::{
	AggregateFunction, AggregateSpec, CountQuery, DatabaseType, EngineConfig, Entity,
	EntitySchema, QueryContext, QueryError, QueryKind, RepositoryOptions, Root, Spec,
	Specification, SqlxExecutor, TupleExecutor, TupleRepository,
};

/// Common imports
pub mod prelude {
	pub use tuplequery_core::{
		Direction, Page, PageRequest, Pageable, QueryValue, Sort, SortOrder, Tuple,
	};

	#[cfg(feature = "conf")]
	pub use tuplequery_conf::{GroupCountStrategy, Settings};

	#[cfg(feature = "db")]
	pub use tuplequery_db::prelude::*;
}
