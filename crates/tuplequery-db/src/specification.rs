//! Composable filter predicates
//!
//! A [`Specification`] turns a query root into an optional condition. `None`
//! means "no restriction". Closures implement the trait directly; [`Spec`]
//! wraps any specification and adds combinators and leaf predicates.
//!
//! ```
//! use tuplequery_db::specification::Spec;
//! # use tuplequery_db::schema::{Entity, EntitySchema};
//! # struct Order;
//! # impl Entity for Order {
//! # 	fn schema() -> EntitySchema {
//! # 		EntitySchema::builder("orders").field("status").field("amount").build()
//! # 	}
//! # }
//!
//! let paid_and_large: Spec<Order> = Spec::eq("status", "PAID").and(Spec::gte("amount", 50));
//! let not_cancelled: Spec<Order> = Spec::eq("status", "CANCELLED").not();
//! let _either = Spec::any_of([paid_and_large, not_cancelled]);
//! ```

use crate::error::Result;
use crate::executor::DatabaseType;
use crate::resolver::Root;
use sea_query::{Condition, Expr, ExprTrait, Func, SimpleExpr, Value};
use std::fmt;
use std::sync::Arc;

/// Which statement a predicate is being built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
	/// Content query returning rows
	Select,
	/// Count query computing a page total
	Count,
}

/// Context handed to a specification alongside the root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryContext {
	kind: QueryKind,
	database_type: DatabaseType,
}

impl QueryContext {
	pub fn new(kind: QueryKind, database_type: DatabaseType) -> Self {
		Self {
			kind,
			database_type,
		}
	}

	pub fn kind(&self) -> QueryKind {
		self.kind
	}

	pub fn database_type(&self) -> DatabaseType {
		self.database_type
	}

	pub fn is_count(&self) -> bool {
		self.kind == QueryKind::Count
	}
}

/// Filter predicate over an entity
pub trait Specification<E>: Send + Sync {
	/// Build the condition; `Ok(None)` leaves the query unrestricted
	fn to_predicate(&self, root: &Root<E>, ctx: &QueryContext) -> Result<Option<Condition>>;
}

impl<E, F> Specification<E> for F
where
	F: Fn(&Root<E>, &QueryContext) -> Result<Option<Condition>> + Send + Sync,
{
	fn to_predicate(&self, root: &Root<E>, ctx: &QueryContext) -> Result<Option<Condition>> {
		self(root, ctx)
	}
}

/// Shareable, composable specification
pub struct Spec<E> {
	inner: Arc<dyn Specification<E>>,
}

impl<E> Clone for Spec<E> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<E> fmt::Debug for Spec<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Spec").finish_non_exhaustive()
	}
}

impl<E> Specification<E> for Spec<E> {
	fn to_predicate(&self, root: &Root<E>, ctx: &QueryContext) -> Result<Option<Condition>> {
		self.inner.to_predicate(root, ctx)
	}
}

impl<E: 'static> Spec<E> {
	pub fn new<S>(spec: S) -> Self
	where
		S: Specification<E> + 'static,
	{
		Self {
			inner: Arc::new(spec),
		}
	}

	/// Specification from a closure
	pub fn from_fn<F>(f: F) -> Self
	where
		F: Fn(&Root<E>, &QueryContext) -> Result<Option<Condition>> + Send + Sync + 'static,
	{
		Self::new(f)
	}

	/// Matches every row
	pub fn unrestricted() -> Self {
		Self::from_fn(|_, _| Ok(None))
	}

	pub fn and(self, other: Spec<E>) -> Self {
		Self::all_of([self, other])
	}

	pub fn or(self, other: Spec<E>) -> Self {
		Self::any_of([self, other])
	}

	pub fn not(self) -> Self {
		Self::new(Composite::Not(self))
	}

	/// Conjunction; unrestricted members are skipped
	pub fn all_of(specs: impl IntoIterator<Item = Spec<E>>) -> Self {
		Self::new(Composite::All(specs.into_iter().collect()))
	}

	/// Disjunction; an unrestricted member makes the whole disjunction unrestricted
	pub fn any_of(specs: impl IntoIterator<Item = Spec<E>>) -> Self {
		Self::new(Composite::Any(specs.into_iter().collect()))
	}

	pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::leaf(path, Op::Eq(value.into()))
	}

	pub fn ne(path: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::leaf(path, Op::Ne(value.into()))
	}

	pub fn gt(path: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::leaf(path, Op::Gt(value.into()))
	}

	pub fn gte(path: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::leaf(path, Op::Gte(value.into()))
	}

	pub fn lt(path: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::leaf(path, Op::Lt(value.into()))
	}

	pub fn lte(path: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::leaf(path, Op::Lte(value.into()))
	}

	/// SQL `LIKE` with a caller-supplied pattern (`%` and `_` are wildcards)
	pub fn like(path: impl Into<String>, pattern: impl Into<String>) -> Self {
		Self::leaf(path, Op::Like(pattern.into()))
	}

	/// Case-insensitive `LIKE`, comparing `LOWER(column)` to the lower-cased pattern
	pub fn like_ignore_case(path: impl Into<String>, pattern: impl Into<String>) -> Self {
		Self::leaf(path, Op::LikeIgnoreCase(pattern.into().to_lowercase()))
	}

	/// Membership test; an empty list matches nothing
	pub fn is_in<I, V>(path: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		Self::leaf(path, Op::In(values.into_iter().map(Into::into).collect()))
	}

	pub fn is_null(path: impl Into<String>) -> Self {
		Self::leaf(path, Op::IsNull)
	}

	pub fn is_not_null(path: impl Into<String>) -> Self {
		Self::leaf(path, Op::IsNotNull)
	}

	/// Inclusive range
	pub fn between(
		path: impl Into<String>,
		low: impl Into<Value>,
		high: impl Into<Value>,
	) -> Self {
		Self::leaf(path, Op::Between(low.into(), high.into()))
	}

	fn leaf(path: impl Into<String>, op: Op) -> Self {
		Self::new(Leaf {
			path: path.into(),
			op,
		})
	}
}

#[derive(Debug, Clone)]
enum Op {
	Eq(Value),
	Ne(Value),
	Gt(Value),
	Gte(Value),
	Lt(Value),
	Lte(Value),
	Like(String),
	LikeIgnoreCase(String),
	In(Vec<Value>),
	IsNull,
	IsNotNull,
	Between(Value, Value),
}

#[derive(Debug, Clone)]
struct Leaf {
	path: String,
	op: Op,
}

impl<E> Specification<E> for Leaf {
	fn to_predicate(&self, root: &Root<E>, _ctx: &QueryContext) -> Result<Option<Condition>> {
		let column = root.get(&self.path)?;
		let expr: SimpleExpr = match &self.op {
			Op::Eq(v) => column.eq(v.clone()),
			Op::Ne(v) => column.ne(v.clone()),
			Op::Gt(v) => column.gt(v.clone()),
			Op::Gte(v) => column.gte(v.clone()),
			Op::Lt(v) => column.lt(v.clone()),
			Op::Lte(v) => column.lte(v.clone()),
			Op::Like(pattern) => column.like(pattern.as_str()),
			Op::LikeIgnoreCase(pattern) => {
				SimpleExpr::from(Func::lower(column)).like(pattern.as_str())
			}
			Op::In(values) if values.is_empty() => never(),
			Op::In(values) => column.is_in(values.iter().cloned()),
			Op::IsNull => column.is_null(),
			Op::IsNotNull => column.is_not_null(),
			Op::Between(low, high) => column.between(low.clone(), high.clone()),
		};
		Ok(Some(Condition::all().add(expr)))
	}
}

enum Composite<E> {
	All(Vec<Spec<E>>),
	Any(Vec<Spec<E>>),
	Not(Spec<E>),
}

impl<E> Specification<E> for Composite<E> {
	fn to_predicate(&self, root: &Root<E>, ctx: &QueryContext) -> Result<Option<Condition>> {
		match self {
			Composite::All(specs) => {
				let mut condition = Condition::all();
				let mut restricted = false;
				for spec in specs {
					if let Some(c) = spec.to_predicate(root, ctx)? {
						condition = condition.add(c);
						restricted = true;
					}
				}
				Ok(restricted.then_some(condition))
			}
			Composite::Any(specs) => {
				if specs.is_empty() {
					return Ok(None);
				}
				let mut condition = Condition::any();
				for spec in specs {
					match spec.to_predicate(root, ctx)? {
						Some(c) => condition = condition.add(c),
						None => return Ok(None),
					}
				}
				Ok(Some(condition))
			}
			Composite::Not(spec) => Ok(Some(match spec.to_predicate(root, ctx)? {
				Some(c) => c.not(),
				None => Condition::all().add(never()),
			})),
		}
	}
}

/// Always-false expression
fn never() -> SimpleExpr {
	Expr::val(1).eq(0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::{Entity, EntitySchema};
	use rstest::rstest;
	use sea_query::{Alias, Query, QueryStatementWriter, SqliteQueryBuilder};

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

	fn render(spec: &Spec<Order>) -> Result<(String, usize)> {
		let root = Root::<Order>::new();
		let ctx = QueryContext::new(QueryKind::Select, DatabaseType::Sqlite);
		let mut stmt = Query::select();
		stmt.expr(Expr::col(Alias::new("id")))
			.from(Alias::new("orders"));
		if let Some(condition) = spec.to_predicate(&root, &ctx)? {
			stmt.cond_where(condition);
		}
		let (sql, values) = stmt.build(SqliteQueryBuilder);
		Ok((sql, values.0.len()))
	}

	#[rstest]
	fn test_unrestricted_has_no_where() {
		// Act
		let (sql, params) = render(&Spec::unrestricted()).unwrap();

		// Assert
		assert!(!sql.contains("WHERE"), "{}", sql);
		assert_eq!(params, 0);
	}

	#[rstest]
	fn test_and_binds_both_values() {
		// Arrange
		let spec = Spec::eq("status", "PAID").and(Spec::gte("amount", 50));

		// Act
		let (sql, params) = render(&spec).unwrap();

		// Assert
		assert!(sql.contains(r#""orders"."status" = ?"#), "{}", sql);
		assert!(sql.contains(r#""orders"."amount" >= ?"#), "{}", sql);
		assert!(sql.contains(" AND "), "{}", sql);
		assert_eq!(params, 2);
	}

	#[rstest]
	fn test_or_with_unrestricted_is_unrestricted() {
		// Arrange
		let spec = Spec::eq("status", "PAID").or(Spec::unrestricted());

		// Act
		let (sql, _) = render(&spec).unwrap();

		// Assert
		assert!(!sql.contains("WHERE"), "{}", sql);
	}

	#[rstest]
	fn test_all_of_skips_unrestricted() {
		// Arrange
		let spec = Spec::all_of([Spec::unrestricted(), Spec::is_null("amount")]);

		// Act
		let (sql, params) = render(&spec).unwrap();

		// Assert
		assert!(sql.contains(r#""orders"."amount" IS NULL"#), "{}", sql);
		assert_eq!(params, 0);
	}

	#[rstest]
	fn test_not_negates() {
		let (sql, _) = render(&Spec::eq("status", "CANCELLED").not()).unwrap();
		assert!(sql.contains("NOT"), "{}", sql);
	}

	#[rstest]
	fn test_empty_in_matches_nothing() {
		// Arrange
		let spec = Spec::is_in("customerId", Vec::<i64>::new());

		// Act
		let (sql, params) = render(&spec).unwrap();

		// Assert
		assert!(sql.contains("WHERE"), "{}", sql);
		assert!(!sql.contains(" IN "), "{}", sql);
		assert_eq!(params, 2);
	}

	#[rstest]
	fn test_like_ignore_case_lowers_column() {
		let (sql, _) = render(&Spec::like_ignore_case("status", "PA%")).unwrap();
		assert!(sql.contains(r#"LOWER("orders"."status") LIKE ?"#), "{}", sql);
	}

	#[rstest]
	fn test_closure_specification() {
		// Arrange
		let spec: Spec<Order> = Spec::from_fn(|root, ctx| {
			assert_eq!(ctx.kind(), QueryKind::Select);
			Ok(Some(Condition::all().add(root.get("customerId")?.eq(2))))
		});

		// Act
		let (sql, params) = render(&spec).unwrap();

		// Assert
		assert!(sql.contains(r#""orders"."customer_id" = ?"#), "{}", sql);
		assert_eq!(params, 1);
	}

	#[rstest]
	fn test_unknown_column_fails() {
		let result = render(&Spec::eq("customer", 1));
		assert!(result.is_err());
	}

	#[rstest]
	#[tokio::test]
	async fn test_specification_moves_across_tasks() {
		fn assert_send_sync<T: Send + Sync>(_: &T) {}

		// Arrange
		let spec = Spec::<Order>::eq("status", "PAID").and(Spec::is_in("customerId", [1, 2]));
		assert_send_sync(&spec);

		// Act
		let rendered = tokio::spawn(async move { render(&spec).map_err(|e| e.to_string()) })
			.await
			.unwrap();

		// Assert
		let (sql, params) = rendered.unwrap();
		assert!(sql.contains(r#""orders"."status" = ?"#), "{}", sql);
		assert_eq!(params, 3);
	}
}
