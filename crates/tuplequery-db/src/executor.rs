//! # Statement execution
//!
//! [`TupleExecutor`] is the seam between statement construction and the
//! database. [`SqlxExecutor`] implements it over a pooled `sqlx::AnyPool`.
//!
//! ## Connection Pooling
//!
//! [`EngineConfig`] carries the pool parameters:
//! - `pool_min_size`: Minimum number of connections in the pool
//! - `pool_max_size`: Maximum number of connections in the pool
//! - `pool_timeout`: Timeout for acquiring a connection from the pool
//! - `pool_idle_timeout`: Maximum idle time before a connection is closed
//! - `pool_max_lifetime`: Maximum lifetime of a connection before it's closed
//!
//! ```rust,no_run
//! use tuplequery_db::executor::{EngineConfig, SqlxExecutor};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let config = EngineConfig::new("postgres://localhost/shop")
//!     .with_pool_size(1, 8)
//!     .with_timeout(10)
//!     .with_echo(true);
//!
//! let executor = SqlxExecutor::connect(&config).await.unwrap();
//! # });
//! ```

use crate::error::{QueryError, Result};
use async_trait::async_trait;
use sea_query::{MysqlQueryBuilder, PostgresQueryBuilder, QueryStatementWriter, SqliteQueryBuilder};
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::pool::PoolOptions;
use sqlx::query::Query;
use sqlx::{Any, AnyPool, Column, Row, ValueRef};
use std::sync::{Arc, Once};
use std::time::Duration;
use tuplequery_conf::DatabaseSettings;
use tuplequery_core::{QueryValue, Tuple};

/// Database backend a statement is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseType {
	Postgres,
	Sqlite,
	Mysql,
}

impl DatabaseType {
	/// Infer the backend from a connection URL scheme
	///
	/// # Examples
	///
	/// ```
	/// use tuplequery_db::DatabaseType;
	///
	/// assert_eq!(DatabaseType::from_url("sqlite::memory:").unwrap(), DatabaseType::Sqlite);
	/// assert_eq!(DatabaseType::from_url("postgresql://db/shop").unwrap(), DatabaseType::Postgres);
	/// assert_eq!(DatabaseType::from_url("mariadb://db/shop").unwrap(), DatabaseType::Mysql);
	/// assert!(DatabaseType::from_url("oracle://db").is_err());
	/// ```
	pub fn from_url(url: &str) -> Result<Self> {
		let scheme = url.split(':').next().unwrap_or_default();
		match scheme.to_ascii_lowercase().as_str() {
			"postgres" | "postgresql" => Ok(DatabaseType::Postgres),
			"mysql" | "mariadb" => Ok(DatabaseType::Mysql),
			"sqlite" => Ok(DatabaseType::Sqlite),
			_ => Err(QueryError::UnsupportedDatabase(url.to_string())),
		}
	}

	/// Render a statement with this backend's placeholders and quoting
	pub fn build<S: QueryStatementWriter>(self, statement: &S) -> (String, Vec<QueryValue>) {
		let (sql, values) = match self {
			DatabaseType::Postgres => statement.build(PostgresQueryBuilder),
			DatabaseType::Mysql => statement.build(MysqlQueryBuilder),
			DatabaseType::Sqlite => statement.build(SqliteQueryBuilder),
		};
		(sql, convert_values(values))
	}
}

/// Convert sea-query bind values to [`QueryValue`]s
pub fn convert_values(values: sea_query::Values) -> Vec<QueryValue> {
	values.0.into_iter().map(convert_value).collect()
}

fn convert_value(value: sea_query::Value) -> QueryValue {
	use sea_query::Value as SV;

	match value {
		SV::Bool(v) => v.map_or(QueryValue::Null, QueryValue::Bool),
		SV::TinyInt(v) => v.map_or(QueryValue::Null, |v| QueryValue::Int(v as i64)),
		SV::SmallInt(v) => v.map_or(QueryValue::Null, |v| QueryValue::Int(v as i64)),
		SV::Int(v) => v.map_or(QueryValue::Null, |v| QueryValue::Int(v as i64)),
		SV::BigInt(v) => v.map_or(QueryValue::Null, QueryValue::Int),
		SV::TinyUnsigned(v) => v.map_or(QueryValue::Null, |v| QueryValue::Int(v as i64)),
		SV::SmallUnsigned(v) => v.map_or(QueryValue::Null, |v| QueryValue::Int(v as i64)),
		SV::Unsigned(v) => v.map_or(QueryValue::Null, |v| QueryValue::Int(v as i64)),
		SV::BigUnsigned(v) => v.map_or(QueryValue::Null, |v| {
			QueryValue::Int(i64::try_from(v).unwrap_or_else(|_| {
				tracing::warn!(value = v, "BigUnsigned value exceeds i64::MAX, clamping");
				i64::MAX
			}))
		}),
		SV::Float(v) => v.map_or(QueryValue::Null, |v| QueryValue::Float(v as f64)),
		SV::Double(v) => v.map_or(QueryValue::Null, QueryValue::Float),
		SV::String(v) => v.map_or(QueryValue::Null, |s| QueryValue::String(s.to_string())),
		SV::Char(v) => v.map_or(QueryValue::Null, |c| QueryValue::String(c.to_string())),
		SV::Bytes(v) => v.map_or(QueryValue::Null, |b| QueryValue::Bytes(b.to_vec())),
		#[allow(unreachable_patterns)]
		other => QueryValue::String(format!("{:?}", other)),
	}
}

/// Executes rendered statements and decodes their rows
#[async_trait]
pub trait TupleExecutor: Send + Sync {
	fn database_type(&self) -> DatabaseType;

	/// Run a query and decode every row into a [`Tuple`]
	async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Tuple>>;

	/// Run a query returning one integer in its first column
	async fn fetch_scalar(&self, sql: &str, params: Vec<QueryValue>) -> Result<i64>;
}

#[async_trait]
impl<X: TupleExecutor + ?Sized> TupleExecutor for Arc<X> {
	fn database_type(&self) -> DatabaseType {
		(**self).database_type()
	}

	async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Tuple>> {
		(**self).fetch_all(sql, params).await
	}

	async fn fetch_scalar(&self, sql: &str, params: Vec<QueryValue>) -> Result<i64> {
		(**self).fetch_scalar(sql, params).await
	}
}

/// Connection pool configuration
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
	/// Database URL (e.g., "sqlite::memory:", "postgres://...")
	pub url: String,

	/// Connection pool size (min)
	pub pool_min_size: u32,

	/// Connection pool size (max)
	pub pool_max_size: u32,

	/// Acquire timeout in seconds
	pub pool_timeout: u64,

	/// Maximum idle time for a connection in seconds (None = no limit)
	pub pool_idle_timeout: Option<u64>,

	/// Maximum lifetime for a connection in seconds (None = no limit)
	pub pool_max_lifetime: Option<u64>,

	/// Log every statement at info level
	pub echo: bool,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self::from(&DatabaseSettings::default())
	}
}

impl From<&DatabaseSettings> for EngineConfig {
	fn from(settings: &DatabaseSettings) -> Self {
		Self {
			url: settings.url.clone(),
			pool_min_size: settings.pool_min_size,
			pool_max_size: settings.pool_max_size,
			pool_timeout: settings.pool_timeout,
			pool_idle_timeout: settings.pool_idle_timeout,
			pool_max_lifetime: settings.pool_max_lifetime,
			echo: settings.echo,
		}
	}
}

impl EngineConfig {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			..Default::default()
		}
	}

	pub fn with_pool_size(mut self, min: u32, max: u32) -> Self {
		self.pool_min_size = min;
		self.pool_max_size = max;
		self
	}

	/// Set acquire timeout in seconds
	pub fn with_timeout(mut self, timeout: u64) -> Self {
		self.pool_timeout = timeout;
		self
	}

	/// Set idle timeout in seconds (None = no limit)
	pub fn with_idle_timeout(mut self, timeout: Option<u64>) -> Self {
		self.pool_idle_timeout = timeout;
		self
	}

	/// Set max lifetime in seconds (None = no limit)
	pub fn with_max_lifetime(mut self, lifetime: Option<u64>) -> Self {
		self.pool_max_lifetime = lifetime;
		self
	}

	pub fn with_echo(mut self, echo: bool) -> Self {
		self.echo = echo;
		self
	}
}

static INSTALL_DRIVERS: Once = Once::new();

/// [`TupleExecutor`] over a `sqlx` `Any` pool
#[derive(Debug, Clone)]
pub struct SqlxExecutor {
	pool: AnyPool,
	database_type: DatabaseType,
	echo: bool,
}

impl SqlxExecutor {
	/// Open a pool for `config.url`
	pub async fn connect(config: &EngineConfig) -> Result<Self> {
		let database_type = DatabaseType::from_url(&config.url)?;
		INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

		let mut pool_options = PoolOptions::<Any>::new()
			.min_connections(config.pool_min_size)
			.max_connections(config.pool_max_size)
			.acquire_timeout(Duration::from_secs(config.pool_timeout));

		if let Some(idle_timeout) = config.pool_idle_timeout {
			pool_options = pool_options.idle_timeout(Duration::from_secs(idle_timeout));
		}

		if let Some(max_lifetime) = config.pool_max_lifetime {
			pool_options = pool_options.max_lifetime(Duration::from_secs(max_lifetime));
		}

		let pool = pool_options.connect(&config.url).await?;
		tracing::debug!(
			?database_type,
			max_connections = config.pool_max_size,
			"connected tuple query pool"
		);

		Ok(Self {
			pool,
			database_type,
			echo: config.echo,
		})
	}

	/// Wrap an existing pool
	pub fn from_pool(pool: AnyPool, database_type: DatabaseType) -> Self {
		Self {
			pool,
			database_type,
			echo: false,
		}
	}

	pub fn with_echo(mut self, echo: bool) -> Self {
		self.echo = echo;
		self
	}

	pub fn pool(&self) -> &AnyPool {
		&self.pool
	}

	fn prepare<'q>(
		&self,
		sql: &'q str,
		params: Vec<QueryValue>,
	) -> Query<'q, Any, AnyArguments<'q>> {
		if self.echo {
			tracing::info!(sql, params = params.len(), "executing statement");
		} else {
			tracing::debug!(sql, params = params.len(), "executing statement");
		}

		let mut query = sqlx::query(sql);
		for param in params {
			query = Self::bind_value(query, param);
		}
		query
	}

	fn bind_value<'q>(
		query: Query<'q, Any, AnyArguments<'q>>,
		value: QueryValue,
	) -> Query<'q, Any, AnyArguments<'q>> {
		match value {
			QueryValue::Null => query.bind(None::<i64>),
			QueryValue::Bool(b) => query.bind(b),
			QueryValue::Int(i) => query.bind(i),
			QueryValue::Float(f) => query.bind(f),
			QueryValue::String(s) => query.bind(s),
			QueryValue::Bytes(b) => query.bind(b),
		}
	}

	fn convert_row(row: &AnyRow) -> Result<Tuple> {
		let mut tuple = Tuple::new();
		for column in row.columns() {
			tuple.push(column.name(), Self::decode(row, column.ordinal())?);
		}
		Ok(tuple)
	}

	fn decode(row: &AnyRow, index: usize) -> Result<QueryValue> {
		if row.try_get_raw(index)?.is_null() {
			return Ok(QueryValue::Null);
		}
		if let Ok(value) = row.try_get::<bool, _>(index) {
			Ok(QueryValue::Bool(value))
		} else if let Ok(value) = row.try_get::<i64, _>(index) {
			Ok(QueryValue::Int(value))
		} else if let Ok(value) = row.try_get::<f64, _>(index) {
			Ok(QueryValue::Float(value))
		} else if let Ok(value) = row.try_get::<String, _>(index) {
			Ok(QueryValue::String(value))
		} else {
			// last attempt surfaces the driver's decode error
			Ok(QueryValue::Bytes(row.try_get::<Vec<u8>, _>(index)?))
		}
	}
}

#[async_trait]
impl TupleExecutor for SqlxExecutor {
	fn database_type(&self) -> DatabaseType {
		self.database_type
	}

	async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Tuple>> {
		let rows = self.prepare(sql, params).fetch_all(&self.pool).await?;
		rows.iter().map(Self::convert_row).collect()
	}

	async fn fetch_scalar(&self, sql: &str, params: Vec<QueryValue>) -> Result<i64> {
		let row = self.prepare(sql, params).fetch_one(&self.pool).await?;
		Ok(i64::try_from(Self::decode(&row, 0)?)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use sea_query::{Alias, Expr, ExprTrait, Query};

	#[rstest]
	#[case(DatabaseType::Postgres, r#"SELECT "id" FROM "orders" WHERE "status" = $1 LIMIT $2"#)]
	#[case(DatabaseType::Mysql, "SELECT `id` FROM `orders` WHERE `status` = ? LIMIT ?")]
	#[case(DatabaseType::Sqlite, r#"SELECT "id" FROM "orders" WHERE "status" = ? LIMIT ?"#)]
	fn test_build_per_backend(#[case] database_type: DatabaseType, #[case] expected: &str) {
		// Arrange
		let stmt = Query::select()
			.column(Alias::new("id"))
			.from(Alias::new("orders"))
			.and_where(Expr::col(Alias::new("status")).eq("PAID"))
			.limit(10)
			.to_owned();

		// Act
		let (sql, params) = database_type.build(&stmt);

		// Assert
		assert_eq!(sql, expected);
		assert_eq!(
			params,
			vec![QueryValue::String("PAID".to_string()), QueryValue::Int(10)]
		);
	}

	#[rstest]
	fn test_convert_null_values() {
		// Arrange
		let values = sea_query::Values(vec![
			sea_query::Value::BigInt(None),
			sea_query::Value::Bool(Some(true)),
			sea_query::Value::Double(Some(1.5)),
		]);

		// Act
		let converted = convert_values(values);

		// Assert
		assert_eq!(
			converted,
			vec![
				QueryValue::Null,
				QueryValue::Bool(true),
				QueryValue::Float(1.5)
			]
		);
	}

	#[rstest]
	fn test_engine_config_from_settings() {
		// Arrange
		let mut settings = DatabaseSettings::default();
		settings.url = "mysql://localhost/shop".to_string();
		settings.pool_max_size = 4;
		settings.echo = true;

		// Act
		let config = EngineConfig::from(&settings);

		// Assert
		assert_eq!(config.url, "mysql://localhost/shop");
		assert_eq!(config.pool_max_size, 4);
		assert!(config.echo);
		assert_eq!(EngineConfig::new("sqlite::memory:").pool_timeout, 30);
	}

	#[rstest]
	#[tokio::test]
	async fn test_connect_rejects_unknown_scheme() {
		let result = SqlxExecutor::connect(&EngineConfig::new("oracle://db/shop")).await;
		assert!(matches!(result, Err(QueryError::UnsupportedDatabase(_))));
	}
}
