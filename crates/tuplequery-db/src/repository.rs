//! # Tuple repository
//!
//! [`TupleRepository`] turns "columns + predicate + aggregate + page"
//! requests into statements, runs them through a [`TupleExecutor`] and
//! returns loosely typed [`Tuple`] rows.
//!
//! Every call builds its own [`Root`] and discards it afterwards. Paged
//! calls issue the content query first and the count query second, and
//! skip the count when the slice already determines the total.
//!
//! ```rust,no_run
//! use tuplequery_conf::Settings;
//! use tuplequery_core::{PageRequest, Sort};
//! use tuplequery_db::repository::TupleRepository;
//! use tuplequery_db::schema::{Entity, EntitySchema};
//! use tuplequery_db::specification::Spec;
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
//! let repository = TupleRepository::connect(&Settings::new()).await.unwrap();
//! let paid = Spec::<Order>::eq("status", "PAID");
//!
//! let sums = repository
//! 	.select_sum_group_by::<Order, _>(&["customerId"], "amount", &paid)
//! 	.await
//! 	.unwrap();
//!
//! let request = PageRequest::of(0, 20).unwrap().with_sort(Sort::by_desc("sum_amount"));
//! let page = repository
//! 	.select_aggregate_group_by::<Order, _, _, _, _>(
//! 		&["customerId"],
//! 		[("sum", "amount"), ("max", "amount")],
//! 		&paid,
//! 		&request.into(),
//! 	)
//! 	.await
//! 	.unwrap();
//! # });
//! ```

use crate::aggregate::{AggregateFunction, AggregateSpec};
use crate::compiler::{AggregateColumn, Projection, StatementCompiler};
use crate::count::CountQuery;
use crate::error::{QueryError, Result};
use crate::executor::{EngineConfig, SqlxExecutor, TupleExecutor};
use crate::resolver::Root;
use crate::schema::Entity;
use crate::specification::{QueryContext, QueryKind, Specification};
use sea_query::SelectStatement;
use std::collections::HashSet;
use tuplequery_conf::{GroupCountStrategy, QuerySettings, Settings};
use tuplequery_core::pagination::derive_total;
use tuplequery_core::{Page, PageRequest, Pageable, Sort, Tuple};

/// Query behaviour shared by every call of a repository
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOptions {
	/// How the total of a paged grouped query is computed
	pub group_count: GroupCountStrategy,

	/// Separator of the `concat_ws` key counted by `select_count_group_by`
	pub concat_separator: String,

	/// Larger page requests are clamped to this size
	pub max_page_size: Option<u64>,
}

impl Default for RepositoryOptions {
	fn default() -> Self {
		Self::from(&QuerySettings::default())
	}
}

impl From<&QuerySettings> for RepositoryOptions {
	fn from(settings: &QuerySettings) -> Self {
		Self {
			group_count: settings.group_count,
			concat_separator: settings.concat_separator.clone(),
			max_page_size: settings.max_page_size,
		}
	}
}

impl RepositoryOptions {
	pub fn with_group_count(mut self, strategy: GroupCountStrategy) -> Self {
		self.group_count = strategy;
		self
	}

	pub fn with_concat_separator(mut self, separator: impl Into<String>) -> Self {
		self.concat_separator = separator.into();
		self
	}

	pub fn with_max_page_size(mut self, max: Option<u64>) -> Self {
		self.max_page_size = max;
		self
	}
}

/// Dynamic tuple query builder over one executor
#[derive(Debug, Clone)]
pub struct TupleRepository<X = SqlxExecutor> {
	executor: X,
	options: RepositoryOptions,
}

impl TupleRepository<SqlxExecutor> {
	/// Validate `settings`, open a pool and apply the query options
	pub async fn connect(settings: &Settings) -> Result<Self> {
		settings.validate()?;
		let executor = SqlxExecutor::connect(&EngineConfig::from(&settings.database)).await?;
		Ok(Self::new(executor).with_options(RepositoryOptions::from(&settings.query)))
	}
}

impl<X: TupleExecutor> TupleRepository<X> {
	pub fn new(executor: X) -> Self {
		Self {
			executor,
			options: RepositoryOptions::default(),
		}
	}

	pub fn with_options(mut self, options: RepositoryOptions) -> Self {
		self.options = options;
		self
	}

	pub fn executor(&self) -> &X {
		&self.executor
	}

	pub fn options(&self) -> &RepositoryOptions {
		&self.options
	}

	/// Distinct combinations of `columns` among the rows matching `spec`
	pub async fn select_tuple<E, S>(&self, columns: &[&str], spec: &S) -> Result<Vec<Tuple>>
	where
		E: Entity,
		S: Specification<E> + ?Sized,
	{
		let page = self
			.tuple_page::<E, S>(columns, spec, &Pageable::Unpaged)
			.await?;
		Ok(page.into_content())
	}

	/// One page of distinct combinations of `columns`
	///
	/// The total counts the distinct rows of the columns under the same
	/// filter. Unpaged requests return every row and issue no count.
	pub async fn select_tuple_page<E, S>(
		&self,
		columns: &[&str],
		spec: &S,
		pageable: &Pageable,
	) -> Result<Page<Tuple>>
	where
		E: Entity,
		S: Specification<E> + ?Sized,
	{
		self.tuple_page::<E, S>(columns, spec, pageable).await
	}

	/// Rows of `group_columns` with `count` of the `count_columns` key per group
	///
	/// An empty `count_columns` counts rows.
	pub async fn select_count_group_by<E, S>(
		&self,
		group_columns: &[&str],
		count_columns: &[&str],
		spec: &S,
	) -> Result<Vec<Tuple>>
	where
		E: Entity,
		S: Specification<E> + ?Sized,
	{
		let count = AggregateColumn::ConcatCount(
			count_columns.iter().map(|c| (*c).to_string()).collect(),
		);
		let page = self
			.grouped_page::<E, S>(group_columns, vec![count], spec, &Pageable::Unpaged)
			.await?;
		Ok(page.into_content())
	}

	/// Rows of `group_columns` with the `avg` of `avg_column` per group
	pub async fn select_avg_group_by<E, S>(
		&self,
		group_columns: &[&str],
		avg_column: &str,
		spec: &S,
	) -> Result<Vec<Tuple>>
	where
		E: Entity,
		S: Specification<E> + ?Sized,
	{
		let page = self
			.select_avg_group_by_page::<E, S>(group_columns, avg_column, spec, &Pageable::Unpaged)
			.await?;
		Ok(page.into_content())
	}

	pub async fn select_avg_group_by_page<E, S>(
		&self,
		group_columns: &[&str],
		avg_column: &str,
		spec: &S,
		pageable: &Pageable,
	) -> Result<Page<Tuple>>
	where
		E: Entity,
		S: Specification<E> + ?Sized,
	{
		let avg = Self::fixed(AggregateFunction::Avg, avg_column);
		self.grouped_page::<E, S>(group_columns, vec![avg], spec, pageable)
			.await
	}

	/// Rows of `group_columns` with the `sum` of `sum_column` per group
	pub async fn select_sum_group_by<E, S>(
		&self,
		group_columns: &[&str],
		sum_column: &str,
		spec: &S,
	) -> Result<Vec<Tuple>>
	where
		E: Entity,
		S: Specification<E> + ?Sized,
	{
		let sum = Self::fixed(AggregateFunction::Sum, sum_column);
		let page = self
			.grouped_page::<E, S>(group_columns, vec![sum], spec, &Pageable::Unpaged)
			.await?;
		Ok(page.into_content())
	}

	/// Grouped query with one `<function>_<column>` output per aggregate
	///
	/// Function identifiers are parsed before anything is executed; an
	/// unknown one fails with [`QueryError::UnsupportedAggregate`]. A sort
	/// property naming an output alias orders by that aggregate.
	pub async fn select_aggregate_group_by<E, S, I, F, C>(
		&self,
		group_columns: &[&str],
		aggregates: I,
		spec: &S,
		pageable: &Pageable,
	) -> Result<Page<Tuple>>
	where
		E: Entity,
		S: Specification<E> + ?Sized,
		I: IntoIterator<Item = (F, C)>,
		F: TryInto<AggregateFunction>,
		QueryError: From<F::Error>,
		C: Into<String>,
	{
		let columns = AggregateSpec::collect(aggregates)?
			.into_iter()
			.map(|aggregate| AggregateColumn::Function {
				alias: aggregate.alias(),
				function: aggregate.function,
				column: aggregate.column,
			})
			.collect();
		self.grouped_page::<E, S>(group_columns, columns, spec, pageable)
			.await
	}

	fn fixed(function: AggregateFunction, column: &str) -> AggregateColumn {
		AggregateColumn::Function {
			function,
			column: column.to_string(),
			alias: function.name().to_string(),
		}
	}

	async fn tuple_page<E, S>(
		&self,
		columns: &[&str],
		spec: &S,
		pageable: &Pageable,
	) -> Result<Page<Tuple>>
	where
		E: Entity,
		S: Specification<E> + ?Sized,
	{
		let request = self.page_request(pageable)?;
		let database_type = self.executor.database_type();
		let root = Root::<E>::new();
		tracing::debug!(table = root.table(), ?columns, paged = request.is_some(), "select tuple");

		let compiler = StatementCompiler::new(&root, database_type, &self.options.concat_separator);
		let projections = compiler.project(columns)?;
		let predicate =
			spec.to_predicate(&root, &QueryContext::new(QueryKind::Select, database_type))?;
		let mut stmt = compiler.tuple_select(&projections, predicate, &Self::sort_of(request.as_ref()))?;

		let Some(request) = request else {
			return Ok(Page::unpaged(self.fetch(&stmt).await?));
		};
		compiler.paginate(&mut stmt, &request)?;
		let rows = self.fetch(&stmt).await?;

		let total = match derive_total(&request, rows.len()) {
			Some(total) => total,
			None => {
				let count_root = Root::<E>::new();
				let predicate = spec
					.to_predicate(&count_root, &QueryContext::new(QueryKind::Count, database_type))?;
				let count = CountQuery::columns(columns).build(&count_root, predicate)?;
				self.count(&count).await?
			}
		};
		Ok(Page::new(rows, &request, total))
	}

	async fn grouped_page<E, S>(
		&self,
		group_columns: &[&str],
		aggregates: Vec<AggregateColumn>,
		spec: &S,
		pageable: &Pageable,
	) -> Result<Page<Tuple>>
	where
		E: Entity,
		S: Specification<E> + ?Sized,
	{
		let request = self.page_request(pageable)?;
		let database_type = self.executor.database_type();
		let root = Root::<E>::new();
		tracing::debug!(
			table = root.table(),
			groups = ?group_columns,
			aggregates = aggregates.len(),
			paged = request.is_some(),
			"select grouped aggregate"
		);

		let compiler = StatementCompiler::new(&root, database_type, &self.options.concat_separator);
		let groups = compiler.project(group_columns)?;
		let projections = aggregates
			.iter()
			.map(|aggregate| compiler.aggregate(aggregate))
			.collect::<Result<Vec<_>>>()?;
		Self::check_aliases(&groups, &projections)?;
		let strategy = self.options.group_count;
		if request.is_some() && strategy == GroupCountStrategy::DistinctRoot {
			root.primary_key()?;
		}

		let predicate =
			spec.to_predicate(&root, &QueryContext::new(QueryKind::Select, database_type))?;
		let mut stmt =
			compiler.grouped_select(&groups, &projections, predicate, &Self::sort_of(request.as_ref()))?;

		let Some(request) = request else {
			return Ok(Page::unpaged(self.fetch(&stmt).await?));
		};
		compiler.paginate(&mut stmt, &request)?;
		let rows = self.fetch(&stmt).await?;

		let derived = match strategy {
			GroupCountStrategy::Groups => derive_total(&request, rows.len()),
			// root count differs from the group count, so it always runs
			GroupCountStrategy::DistinctRoot => None,
		};
		let total = match derived {
			Some(total) => total,
			None => {
				let count_root = Root::<E>::new();
				let predicate = spec
					.to_predicate(&count_root, &QueryContext::new(QueryKind::Count, database_type))?;
				let count = match strategy {
					GroupCountStrategy::Groups => CountQuery::groups(group_columns),
					GroupCountStrategy::DistinctRoot => CountQuery::root(),
				};
				let count = count.build(&count_root, predicate)?;
				self.count(&count).await?
			}
		};
		Ok(Page::new(rows, &request, total))
	}

	/// Output aliases must be unique, or one column would shadow another in the tuple
	fn check_aliases(groups: &[Projection], aggregates: &[Projection]) -> Result<()> {
		let mut seen = HashSet::new();
		match groups
			.iter()
			.chain(aggregates)
			.find(|column| !seen.insert(column.alias.as_str()))
		{
			Some(column) => Err(QueryError::DuplicateAlias(column.alias.clone())),
			None => Ok(()),
		}
	}

	/// Page request of `pageable`, clamped to the configured maximum size
	fn page_request(&self, pageable: &Pageable) -> Result<Option<PageRequest>> {
		let Some(request) = pageable.request() else {
			return Ok(None);
		};
		match self.options.max_page_size {
			Some(max) if request.size() > max => {
				tracing::warn!(
					requested = request.size(),
					max_page_size = max,
					"page size exceeds the maximum, clamping"
				);
				Ok(Some(request.clone().with_size(max)?))
			}
			_ => Ok(Some(request.clone())),
		}
	}

	fn sort_of(request: Option<&PageRequest>) -> Sort {
		request
			.map(|r| r.sort().clone())
			.unwrap_or_default()
	}

	async fn fetch(&self, stmt: &SelectStatement) -> Result<Vec<Tuple>> {
		let (sql, params) = self.executor.database_type().build(stmt);
		self.executor.fetch_all(&sql, params).await
	}

	async fn count(&self, stmt: &SelectStatement) -> Result<u64> {
		let (sql, params) = self.executor.database_type().build(stmt);
		let total = self.executor.fetch_scalar(&sql, params).await?;
		u64::try_from(total).map_err(|_| {
			QueryError::from(tuplequery_core::Error::TypeError(format!(
				"count query returned {}",
				total
			)))
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::executor::DatabaseType;
	use crate::schema::EntitySchema;
	use crate::specification::Spec;
	use async_trait::async_trait;
	use mockall::mock;
	use rstest::{fixture, rstest};
	use std::fmt;
	use std::sync::{Arc, Mutex};
	use tracing::field::{Field, Visit};
	use tracing::{Event, Level, Subscriber};
	use tracing_subscriber::layer::{Context, Layer, SubscriberExt as _};
	use tracing_subscriber::util::SubscriberInitExt as _;
	use tuplequery_core::QueryValue;

	mock! {
		pub Executor {}

		#[async_trait]
		impl TupleExecutor for Executor {
			fn database_type(&self) -> DatabaseType;
			async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Tuple>>;
			async fn fetch_scalar(&self, sql: &str, params: Vec<QueryValue>) -> Result<i64>;
		}
	}

	struct Order;

	impl Entity for Order {
		fn schema() -> EntitySchema {
			EntitySchema::builder("orders")
				.field("id")
				.field_as("customerId", "customer_id")
				.field("status")
				.field("amount")
				.primary_key(["id"])
				.build()
		}
	}

	struct AuditEntry;

	impl Entity for AuditEntry {
		fn schema() -> EntitySchema {
			EntitySchema::builder("audit_entries")
				.field("actor")
				.field("action")
				.build()
		}
	}

	struct Ledger;

	impl Entity for Ledger {
		fn schema() -> EntitySchema {
			EntitySchema::builder("ledger")
				.field("id")
				.field("sum")
				.field("amount")
				.primary_key(["id"])
				.build()
		}
	}

	#[fixture]
	fn executor() -> MockExecutor {
		let mut mock = MockExecutor::new();
		mock.expect_database_type()
			.return_const(DatabaseType::Sqlite);
		mock
	}

	fn rows(n: i64) -> Vec<Tuple> {
		(0..n)
			.map(|i| {
				let mut tuple = Tuple::new();
				tuple.push("customerId", QueryValue::Int(i));
				tuple
			})
			.collect()
	}

	fn paid() -> Spec<Order> {
		Spec::eq("status", "PAID")
	}

	#[derive(Clone, Default)]
	struct CapturedEvents(Arc<Mutex<Vec<(Level, String)>>>);

	impl CapturedEvents {
		fn messages(&self, level: Level) -> Vec<String> {
			self.0
				.lock()
				.unwrap()
				.iter()
				.filter(|(l, _)| *l == level)
				.map(|(_, m)| m.clone())
				.collect()
		}
	}

	struct MessageVisitor(String);

	impl Visit for MessageVisitor {
		fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
			if field.name() == "message" {
				self.0 = format!("{:?}", value);
			}
		}
	}

	impl<S: Subscriber> Layer<S> for CapturedEvents {
		fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
			let mut visitor = MessageVisitor(String::new());
			event.record(&mut visitor);
			self.0
				.lock()
				.unwrap()
				.push((*event.metadata().level(), visitor.0));
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_unsupported_aggregate_fails_before_execution(mut executor: MockExecutor) {
		// Arrange
		executor.expect_fetch_all().never();
		executor.expect_fetch_scalar().never();
		let repository = TupleRepository::new(executor);

		// Act
		let result = repository
			.select_aggregate_group_by::<Order, _, _, _, _>(
				&["customerId"],
				[("sum", "amount"), ("median", "amount")],
				&paid(),
				&Pageable::of(0, 10).unwrap(),
			)
			.await;

		// Assert
		match result {
			Err(QueryError::UnsupportedAggregate(name)) => assert_eq!(name, "median"),
			other => panic!("expected unsupported aggregate, got {:?}", other),
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_unresolved_column_fails_before_execution(mut executor: MockExecutor) {
		// Arrange
		executor.expect_fetch_all().never();
		let repository = TupleRepository::new(executor);

		// Act
		let result = repository
			.select_tuple::<Order, _>(&["customerId", "shipping.city"], &paid())
			.await;

		// Assert
		assert!(matches!(
			result,
			Err(QueryError::UnresolvedAttribute { ref path, .. }) if path == "shipping.city"
		));
	}

	#[rstest]
	#[tokio::test]
	async fn test_unpaged_select_issues_no_count(mut executor: MockExecutor) {
		// Arrange
		executor
			.expect_fetch_all()
			.withf(|sql, params| {
				sql.starts_with("SELECT DISTINCT")
					&& !sql.contains("LIMIT")
					&& params == &vec![QueryValue::String("PAID".to_string())]
			})
			.times(1)
			.returning(|_, _| Ok(rows(3)));
		executor.expect_fetch_scalar().never();
		let repository = TupleRepository::new(executor);

		// Act
		let page = repository
			.select_tuple_page::<Order, _>(&["customerId"], &paid(), &Pageable::Unpaged)
			.await
			.unwrap();

		// Assert
		assert_eq!(page.total_elements(), 3);
		assert_eq!(page.total_pages(), 1);
		assert!(page.is_last());
	}

	#[rstest]
	#[tokio::test]
	async fn test_short_first_page_skips_count(mut executor: MockExecutor) {
		// Arrange
		executor
			.expect_fetch_all()
			.times(1)
			.returning(|_, _| Ok(rows(2)));
		executor.expect_fetch_scalar().never();
		let repository = TupleRepository::new(executor);

		// Act
		let page = repository
			.select_tuple_page::<Order, _>(&["customerId"], &paid(), &Pageable::of(0, 10).unwrap())
			.await
			.unwrap();

		// Assert
		assert_eq!(page.total_elements(), 2);
		assert_eq!(page.number_of_elements(), 2);
		assert!(!page.has_next());
	}

	#[rstest]
	#[tokio::test]
	async fn test_full_page_runs_distinct_count(mut executor: MockExecutor) {
		// Arrange
		executor
			.expect_fetch_all()
			.withf(|sql, _| sql.ends_with("LIMIT ? OFFSET ?"))
			.times(1)
			.returning(|_, _| Ok(rows(2)));
		executor
			.expect_fetch_scalar()
			.withf(|sql, _| {
				sql.contains("FROM (SELECT DISTINCT")
					&& sql.ends_with(r#"AS "distinct_rows""#)
					&& !sql.contains("LIMIT")
					&& !sql.contains("ORDER BY")
			})
			.times(1)
			.returning(|_, _| Ok(5));
		let repository = TupleRepository::new(executor);
		let request = PageRequest::of(0, 2)
			.unwrap()
			.with_sort(Sort::by(["customerId"]));

		// Act
		let page = repository
			.select_tuple_page::<Order, _>(&["customerId", "status"], &paid(), &request.into())
			.await
			.unwrap();

		// Assert
		assert_eq!(page.total_elements(), 5);
		assert_eq!(page.total_pages(), 3);
		assert!(page.has_next());
	}

	#[rstest]
	#[tokio::test]
	async fn test_negative_count_is_a_type_error(mut executor: MockExecutor) {
		// Arrange
		executor
			.expect_fetch_all()
			.times(1)
			.returning(|_, _| Ok(rows(2)));
		executor
			.expect_fetch_scalar()
			.times(1)
			.returning(|_, _| Ok(-1));
		let repository = TupleRepository::new(executor);

		// Act
		let result = repository
			.select_tuple_page::<Order, _>(&["customerId"], &paid(), &Pageable::of(0, 2).unwrap())
			.await;

		// Assert
		assert!(matches!(
			result,
			Err(QueryError::Core(tuplequery_core::Error::TypeError(_)))
		));
	}

	#[rstest]
	#[tokio::test]
	async fn test_group_alias_clashing_with_aggregate_is_rejected(mut executor: MockExecutor) {
		// Arrange
		executor.expect_fetch_all().never();
		executor.expect_fetch_scalar().never();
		let repository = TupleRepository::new(executor);

		// Act
		let result = repository
			.select_sum_group_by::<Ledger, _>(&["sum"], "amount", &Spec::<Ledger>::unrestricted())
			.await;

		// Assert
		match result {
			Err(QueryError::DuplicateAlias(alias)) => assert_eq!(alias, "sum"),
			other => panic!("expected duplicate alias, got {:?}", other),
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_repeated_group_column_is_rejected(mut executor: MockExecutor) {
		executor.expect_fetch_all().never();
		let repository = TupleRepository::new(executor);

		let result = repository
			.select_avg_group_by::<Order, _>(&["status", "status"], "amount", &paid())
			.await;

		assert!(matches!(result, Err(QueryError::DuplicateAlias(ref alias)) if alias == "status"));
	}

	#[rstest]
	#[case(GroupCountStrategy::Groups, r#"FROM (SELECT "orders"."customer_id" FROM"#)]
	#[case(GroupCountStrategy::DistinctRoot, r#"COUNT(DISTINCT "orders"."id")"#)]
	#[tokio::test]
	async fn test_group_count_strategy(
		mut executor: MockExecutor,
		#[case] strategy: GroupCountStrategy,
		#[case] expected: &'static str,
	) {
		// Arrange
		executor
			.expect_fetch_all()
			.times(1)
			.returning(|_, _| Ok(rows(2)));
		executor
			.expect_fetch_scalar()
			.withf(move |sql, _| sql.contains(expected))
			.times(1)
			.returning(|_, _| Ok(4));
		let repository = TupleRepository::new(executor)
			.with_options(RepositoryOptions::default().with_group_count(strategy));

		// Act
		let page = repository
			.select_avg_group_by_page::<Order, _>(
				&["customerId"],
				"amount",
				&paid(),
				&Pageable::of(1, 2).unwrap(),
			)
			.await
			.unwrap();

		// Assert
		assert_eq!(page.total_elements(), 4);
		assert!(page.is_last());
	}

	#[rstest]
	#[tokio::test]
	async fn test_distinct_root_requires_primary_key(mut executor: MockExecutor) {
		// Arrange
		executor.expect_fetch_all().never();
		let repository = TupleRepository::new(executor).with_options(
			RepositoryOptions::default().with_group_count(GroupCountStrategy::DistinctRoot),
		);

		// Act
		let result = repository
			.select_aggregate_group_by::<AuditEntry, _, _, _, _>(
				&["actor"],
				[(AggregateFunction::Count, "action")],
				&Spec::<AuditEntry>::unrestricted(),
				&Pageable::of(0, 10).unwrap(),
			)
			.await;

		// Assert
		assert!(matches!(result, Err(QueryError::Schema(_))));
	}

	#[rstest]
	#[tokio::test]
	async fn test_sort_by_aggregate_alias(mut executor: MockExecutor) {
		// Arrange
		executor
			.expect_fetch_all()
			.withf(|sql, _| {
				sql.contains(r#"SUM("orders"."amount") AS "sum_amount""#)
					&& sql.contains(r#"MAX("orders"."amount") AS "max_amount""#)
					&& sql.contains(r#"ORDER BY SUM("orders"."amount") DESC"#)
			})
			.times(1)
			.returning(|_, _| Ok(rows(1)));
		let repository = TupleRepository::new(executor);
		let request = PageRequest::of(0, 10)
			.unwrap()
			.with_sort(Sort::by_desc("sum_amount"));

		// Act
		let page = repository
			.select_aggregate_group_by::<Order, _, _, _, _>(
				&["customerId"],
				[("sum", "amount"), ("max", "amount")],
				&paid(),
				&request.into(),
			)
			.await
			.unwrap();

		// Assert
		assert_eq!(page.total_elements(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_fixed_aggregate_aliases(mut executor: MockExecutor) {
		// Arrange
		let mut seq = mockall::Sequence::new();
		for expected in [
			r#"AS "count""#,
			r#"AVG("orders"."amount") AS "avg""#,
			r#"SUM("orders"."amount") AS "sum""#,
		] {
			executor
				.expect_fetch_all()
				.withf(move |sql, _| {
					sql.contains(expected) && sql.contains(r#"GROUP BY "orders"."customer_id""#)
				})
				.times(1)
				.in_sequence(&mut seq)
				.returning(|_, _| Ok(Vec::new()));
		}
		let repository = TupleRepository::new(executor);

		// Act
		let counts = repository
			.select_count_group_by::<Order, _>(&["customerId"], &["status", "amount"], &paid())
			.await
			.unwrap();
		let avgs = repository
			.select_avg_group_by::<Order, _>(&["customerId"], "amount", &paid())
			.await
			.unwrap();
		let sums = repository
			.select_sum_group_by::<Order, _>(&["customerId"], "amount", &paid())
			.await
			.unwrap();

		// Assert
		assert!(counts.is_empty() && avgs.is_empty() && sums.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_oversized_page_is_clamped(mut executor: MockExecutor) {
		// Arrange
		executor
			.expect_fetch_all()
			.withf(|_, params| {
				params.ends_with(&[QueryValue::Int(100), QueryValue::Int(0)])
			})
			.times(1)
			.returning(|_, _| Ok(rows(3)));
		let repository = TupleRepository::new(executor)
			.with_options(RepositoryOptions::default().with_max_page_size(Some(100)));
		let events = CapturedEvents::default();
		let _guard = tracing_subscriber::registry()
			.with(events.clone())
			.set_default();

		// Act
		let page = repository
			.select_tuple_page::<Order, _>(&["customerId"], &paid(), &Pageable::of(0, 500).unwrap())
			.await
			.unwrap();

		// Assert
		assert_eq!(page.size(), 100);
		let warnings = events.messages(Level::WARN);
		assert_eq!(warnings.len(), 1);
		assert!(warnings[0].contains("clamping"));
		assert!(
			events
				.messages(Level::DEBUG)
				.iter()
				.any(|m| m.contains("select tuple"))
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_count_context_is_passed_to_specification(mut executor: MockExecutor) {
		// Arrange
		executor
			.expect_fetch_all()
			.returning(|_, _| Ok(rows(2)));
		executor
			.expect_fetch_scalar()
			.withf(|_, params| {
				params.contains(&QueryValue::String("counted".to_string()))
			})
			.times(1)
			.returning(|_, _| Ok(9));
		let repository = TupleRepository::new(executor);
		let spec = Spec::<Order>::from_fn(|root, ctx| {
			let status = if ctx.is_count() { "counted" } else { "listed" };
			Spec::eq("status", status).to_predicate(root, ctx)
		});

		// Act
		let page = repository
			.select_tuple_page::<Order, _>(&["customerId"], &spec, &Pageable::of(0, 2).unwrap())
			.await
			.unwrap();

		// Assert
		assert_eq!(page.total_elements(), 9);
	}

	#[rstest]
	fn test_options_from_settings() {
		// Arrange
		let mut settings = QuerySettings::default();
		settings.group_count = GroupCountStrategy::DistinctRoot;
		settings.concat_separator = "#".to_string();
		settings.max_page_size = None;

		// Act
		let options = RepositoryOptions::from(&settings);

		// Assert
		assert_eq!(options.group_count, GroupCountStrategy::DistinctRoot);
		assert_eq!(options.concat_separator, "#");
		assert_eq!(options.max_page_size, None);
		assert_eq!(RepositoryOptions::default().max_page_size, Some(1000));
	}
}
