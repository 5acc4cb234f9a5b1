//! # tuplequery db
//!
//! Dynamic, column-selectable, filterable, groupable and pageable queries
//! over a single root entity, returning loosely-typed [`Tuple`] rows.
//!
//! ## Modules
//!
//! - **schema**: [`Entity`] and its attribute graph
//! - **resolver**: dotted attribute paths to column expressions
//! - **specification**: composable filter predicates
//! - **aggregate**: aggregate functions and `<function>_<column>` aliases
//! - **count**: count queries computing page totals
//! - **executor**: the [`TupleExecutor`] seam and its `sqlx` implementation
//! - **repository**: [`TupleRepository`], the query operations
//!
//! ## Example
//!
//! ```rust,no_run
//! use tuplequery_db::prelude::*;
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
//! let executor = SqlxExecutor::connect(&EngineConfig::new("sqlite::memory:")).await.unwrap();
//! let repository = TupleRepository::new(executor);
//!
//! let customers = repository
//! 	.select_tuple::<Order, _>(&["customerId"], &Spec::<Order>::eq("status", "PAID"))
//! 	.await
//! 	.unwrap();
//! # });
//! ```
//!
//! [`Tuple`]: tuplequery_core::Tuple

pub mod aggregate;
pub(crate) mod compiler;
pub mod count;
pub mod error;
pub mod executor;
pub mod repository;
pub mod resolver;
pub mod schema;
pub mod specification;

pub use aggregate::{AggregateFunction, AggregateSpec};
pub use count::{CountQuery, CountTarget};
pub use error::{QueryError, Result};
pub use executor::{DatabaseType, EngineConfig, SqlxExecutor, TupleExecutor};
pub use repository::{RepositoryOptions, TupleRepository};
pub use resolver::Root;
pub use schema::{Attribute, AttributeGroup, Entity, EntitySchema, EntitySchemaBuilder};
pub use specification::{QueryContext, QueryKind, Spec, Specification};

pub mod prelude {
	pub use crate::aggregate::{AggregateFunction, AggregateSpec};
	pub use crate::error::QueryError;
	pub use crate::executor::{DatabaseType, EngineConfig, SqlxExecutor, TupleExecutor};
	pub use crate::repository::{RepositoryOptions, TupleRepository};
	pub use crate::resolver::Root;
	pub use crate::schema::{Entity, EntitySchema};
	pub use crate::specification::{QueryContext, QueryKind, Spec, Specification};
	pub use tuplequery_core::{Page, PageRequest, Pageable, Sort, SortOrder, Tuple};
}
