//! Error type for query building and execution

use std::convert::Infallible;

/// Errors raised while building or executing tuple queries
///
/// Resolution and aggregate errors are raised before any statement reaches
/// the database. Driver errors surface unchanged through [`QueryError::Database`].
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
	/// A path segment does not name an attribute of the entity
	#[error("Cannot resolve attribute '{path}' on entity '{entity}'")]
	UnresolvedAttribute { entity: String, path: String },

	/// The path ends on an embedded group instead of a column
	#[error("Attribute '{path}' on entity '{entity}' is not a scalar column")]
	NotScalarAttribute { entity: String, path: String },

	/// Empty path or empty path segment
	#[error("Invalid attribute path: '{0}'")]
	InvalidAttributePath(String),

	/// Two output columns of one query share an alias
	#[error("Duplicate output column alias: '{0}'")]
	DuplicateAlias(String),

	#[error("Unsupported aggregate function: '{0}'")]
	UnsupportedAggregate(String),

	/// The entity schema is unusable (no primary key, duplicate attribute, ...)
	#[error("Invalid entity schema: {0}")]
	Schema(String),

	/// The database URL names a backend this crate cannot talk to
	#[error("Unsupported database URL: '{0}'")]
	UnsupportedDatabase(String),

	#[error(transparent)]
	Settings(#[from] tuplequery_conf::SettingsError),

	#[error(transparent)]
	Core(#[from] tuplequery_core::Error),

	#[error(transparent)]
	Database(#[from] sqlx::Error),
}

impl From<Infallible> for QueryError {
	fn from(never: Infallible) -> Self {
		match never {}
	}
}

/// Result alias using [`QueryError`]
pub type Result<T> = std::result::Result<T, QueryError>;
